//! # Multivariate Models
//!
//! A multivariate model summarizes a numeric table as a covariance matrix
//! plus one fitted marginal per column. `MultivariateModel` is the capability
//! the modeler depends on; `GaussianCopula` is the implementation, with its
//! marginal family chosen through `FitOptions::distribution`.

pub mod copula;
pub mod flatten;
pub mod matrix;
pub mod univariate;

use serde::{Deserialize, Serialize};

use crate::data::NumericTable;
use crate::error::Result;

pub use copula::GaussianCopula;
pub use matrix::CovarianceMatrix;
pub use univariate::{DistributionKind, UnivariateParams};

/// Settings that control how a model is fit.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    /// Marginal family for every column.
    pub distribution: DistributionKind,
    /// Standard deviation used for columns with no spread.
    pub min_std: f64,
    /// Probabilities are clipped to `[clip_epsilon, 1 - clip_epsilon]`
    /// before the normal quantile is taken.
    pub clip_epsilon: f64,
    /// Fixed KDE bandwidth. `None` uses Scott's rule.
    pub kde_bandwidth: Option<f64>,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            distribution: DistributionKind::Gaussian,
            min_std: 0.001,
            clip_epsilon: 1e-6,
            kde_bandwidth: None,
        }
    }
}

/// A model fit over the columns of one numeric table.
pub trait MultivariateModel: Sized {
    /// Fit over a table without missing values.
    fn fit(data: &NumericTable, options: &FitOptions) -> Result<Self>;

    /// Modeled column names, in column order.
    fn columns(&self) -> &[String];

    /// D×D covariance, D = `columns().len()`.
    fn covariance(&self) -> &CovarianceMatrix;

    /// Marginal parameters, one per column, in column order.
    fn column_params(&self) -> Vec<UnivariateParams>;

    fn parameters(&self) -> ModelParameters {
        ModelParameters {
            covariance: self.covariance().clone(),
            distribs: self.column_params(),
        }
    }
}

/// Structured parameters of a fitted model, detached from the model itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    pub covariance: CovarianceMatrix,
    pub distribs: Vec<UnivariateParams>,
}
