use statrs::distribution::{ContinuousCDF, Normal};

use crate::data::NumericTable;
use crate::error::{Result, SeedModelError};
use crate::model::matrix::CovarianceMatrix;
use crate::model::univariate::{DistributionKind, Univariate, UnivariateParams};
use crate::model::{FitOptions, MultivariateModel};

/// Gaussian copula: one marginal per column plus the covariance of the
/// columns after mapping them to standard-normal space.
#[derive(Debug, Clone)]
pub struct GaussianCopula {
    columns: Vec<String>,
    distribution: DistributionKind,
    univariates: Vec<Univariate>,
    covariance: CovarianceMatrix,
    observations: usize,
}

impl GaussianCopula {
    pub fn distribution(&self) -> DistributionKind {
        self.distribution
    }

    /// Number of rows the model was fit on.
    pub fn observations(&self) -> usize {
        self.observations
    }

    pub fn univariates(&self) -> &[Univariate] {
        &self.univariates
    }
}

impl MultivariateModel for GaussianCopula {
    /// Each column goes through its marginal CDF, is clipped to
    /// `[clip_epsilon, 1 - clip_epsilon]` and then through the standard
    /// normal quantile. The covariance is taken over those normal scores.
    ///
    /// The table must not contain missing values. Fewer than two rows give
    /// a zero covariance matrix.
    fn fit(data: &NumericTable, options: &FitOptions) -> Result<Self> {
        let columns = data.dense_columns().ok_or_else(|| SeedModelError::Fit {
            message: format!(
                "table '{}' has {} missing values; impute before fitting",
                data.name(),
                data.missing_count()
            ),
        })?;

        let univariates = columns
            .iter()
            .map(|values| Univariate::fit(values, options))
            .collect::<Result<Vec<_>>>()?;

        let covariance = if data.row_count() < 2 {
            CovarianceMatrix::zeros(columns.len())
        } else {
            let standard = Normal::new(0.0, 1.0).map_err(|e| SeedModelError::Fit {
                message: format!("standard normal: {}", e),
            })?;
            let eps = options.clip_epsilon;
            let scores: Vec<Vec<f64>> = columns
                .iter()
                .zip(&univariates)
                .map(|(values, marginal)| {
                    values
                        .iter()
                        .map(|&x| standard.inverse_cdf(marginal.cdf(x).clamp(eps, 1.0 - eps)))
                        .collect()
                })
                .collect();
            CovarianceMatrix::sample(&scores)
        };

        Ok(Self {
            columns: data.columns().to_vec(),
            distribution: options.distribution,
            univariates,
            covariance,
            observations: data.row_count(),
        })
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn covariance(&self) -> &CovarianceMatrix {
        &self.covariance
    }

    fn column_params(&self) -> Vec<UnivariateParams> {
        self.univariates.iter().map(Univariate::params).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(cols: &[(&str, Vec<f64>)]) -> NumericTable {
        let rows = cols.first().map(|c| c.1.len()).unwrap_or(0);
        let mut t = NumericTable::with_rows("t", rows);
        for (name, values) in cols {
            t.push_column(*name, values.iter().copied().map(Some).collect())
                .unwrap();
        }
        t
    }

    #[test]
    fn test_fit_shapes() {
        let data = table(&[
            ("a", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            ("b", vec![2.0, 1.0, 4.0, 3.0, 6.0]),
            ("c", vec![9.0, 7.0, 5.0, 3.0, 1.0]),
        ]);
        let model = GaussianCopula::fit(&data, &FitOptions::default()).unwrap();

        assert_eq!(model.columns(), &["a", "b", "c"]);
        assert_eq!(model.covariance().dimension(), 3);
        assert_eq!(model.column_params().len(), 3);
        assert!(model.covariance().is_symmetric());
        assert!(model.covariance().get(0, 2) < 0.0, "a and c move in opposite directions");
        assert!(model.covariance().get(0, 1) > 0.0);
    }

    #[test]
    fn test_constant_column_has_zero_covariance() {
        let data = table(&[("a", vec![1.0, 2.0, 3.0]), ("k", vec![50.0, 50.0, 50.0])]);
        let model = GaussianCopula::fit(&data, &FitOptions::default()).unwrap();

        assert_eq!(model.covariance().get(1, 1), 0.0);
        assert_eq!(model.covariance().get(0, 1), 0.0);
        assert_eq!(model.column_params()[1].std, 0.001);
        assert_eq!(model.column_params()[1].mean, 50.0);
    }

    #[test]
    fn test_single_row_is_degenerate() {
        let data = table(&[("a", vec![3.0]), ("b", vec![4.0])]);
        let model = GaussianCopula::fit(&data, &FitOptions::default()).unwrap();

        assert_eq!(model.covariance(), &CovarianceMatrix::zeros(2));
        assert_eq!(model.column_params()[0].mean, 3.0);
        assert_eq!(model.observations(), 1);
    }

    #[test]
    fn test_missing_values_are_rejected() {
        let mut data = NumericTable::with_rows("t", 2);
        data.push_column("a", vec![Some(1.0), None]).unwrap();

        let err = GaussianCopula::fit(&data, &FitOptions::default()).unwrap_err();
        assert!(matches!(err, SeedModelError::Fit { .. }));
    }

    #[test]
    fn test_fit_is_deterministic() {
        let data = table(&[
            ("a", vec![0.3, 1.7, 2.2, 9.1]),
            ("b", vec![5.0, 1.0, 0.5, 2.5]),
        ]);
        let opts = FitOptions {
            distribution: DistributionKind::Kde,
            ..FitOptions::default()
        };
        let first = GaussianCopula::fit(&data, &opts).unwrap();
        let second = GaussianCopula::fit(&data, &opts).unwrap();
        assert_eq!(first.covariance(), second.covariance());
        assert_eq!(first.column_params(), second.column_params());
    }
}
