use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{Result, SeedModelError};
use crate::model::FitOptions;

/// Family used for the per-column marginal distributions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionKind {
    #[default]
    Gaussian,
    Kde,
}

impl std::fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DistributionKind::Gaussian => write!(f, "gaussian"),
            DistributionKind::Kde => write!(f, "kde"),
        }
    }
}

/// Parameters of one fitted marginal.
///
/// `mean` and `std` are present for every family and are what gets
/// flattened. `extra` holds family-specific values such as the KDE bandwidth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnivariateParams {
    pub mean: f64,
    pub std: f64,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub extra: IndexMap<String, f64>,
}

impl UnivariateParams {
    pub fn new(mean: f64, std: f64) -> Self {
        Self {
            mean,
            std,
            extra: IndexMap::new(),
        }
    }
}

/// A fitted marginal distribution.
#[derive(Debug, Clone)]
pub enum Univariate {
    Gaussian(GaussianUnivariate),
    Kde(KdeUnivariate),
}

impl Univariate {
    pub fn fit(values: &[f64], options: &FitOptions) -> Result<Self> {
        match options.distribution {
            DistributionKind::Gaussian => {
                GaussianUnivariate::fit(values, options).map(Univariate::Gaussian)
            }
            DistributionKind::Kde => KdeUnivariate::fit(values, options).map(Univariate::Kde),
        }
    }

    pub fn cdf(&self, x: f64) -> f64 {
        match self {
            Univariate::Gaussian(g) => g.cdf(x),
            Univariate::Kde(k) => k.cdf(x),
        }
    }

    pub fn params(&self) -> UnivariateParams {
        match self {
            Univariate::Gaussian(g) => UnivariateParams::new(g.mean, g.std),
            Univariate::Kde(k) => {
                let mut params = UnivariateParams::new(k.mean, k.std);
                params.extra.insert("bandwidth".to_string(), k.bandwidth);
                params
            }
        }
    }
}

/// Normal marginal with the sample mean and standard deviation.
#[derive(Debug, Clone)]
pub struct GaussianUnivariate {
    pub mean: f64,
    pub std: f64,
    normal: Normal,
}

impl GaussianUnivariate {
    /// An empty column fits mean 0. A zero or undefined spread is replaced
    /// by `options.min_std`.
    pub fn fit(values: &[f64], options: &FitOptions) -> Result<Self> {
        let (mean, std) = mean_and_std(values);
        let std = if std > 0.0 { std } else { options.min_std };
        let normal = Normal::new(mean, std).map_err(|e| SeedModelError::Fit {
            message: format!("normal({}, {}): {}", mean, std, e),
        })?;
        Ok(Self { mean, std, normal })
    }

    pub fn cdf(&self, x: f64) -> f64 {
        self.normal.cdf(x)
    }
}

/// Gaussian kernel density estimate over the observed values.
#[derive(Debug, Clone)]
pub struct KdeUnivariate {
    pub mean: f64,
    pub std: f64,
    pub bandwidth: f64,
    samples: Vec<f64>,
    kernel: Normal,
}

impl KdeUnivariate {
    /// Bandwidth is `options.kde_bandwidth` when set, otherwise Scott's rule
    /// `1.06 * std * n^(-1/5)`, floored at `options.min_std`.
    pub fn fit(values: &[f64], options: &FitOptions) -> Result<Self> {
        let (mean, std) = mean_and_std(values);
        let std = if std > 0.0 { std } else { options.min_std };
        let samples = if values.is_empty() {
            vec![mean]
        } else {
            values.to_vec()
        };
        let bandwidth = match options.kde_bandwidth {
            Some(h) => h,
            None => (1.06 * std * (samples.len() as f64).powf(-0.2)).max(options.min_std),
        };
        let kernel = Normal::new(0.0, 1.0).map_err(|e| SeedModelError::Fit {
            message: format!("standard normal kernel: {}", e),
        })?;
        if !(bandwidth > 0.0 && bandwidth.is_finite()) {
            return Err(SeedModelError::Fit {
                message: format!("invalid KDE bandwidth {}", bandwidth),
            });
        }
        Ok(Self {
            mean,
            std,
            bandwidth,
            samples,
            kernel,
        })
    }

    pub fn cdf(&self, x: f64) -> f64 {
        let total: f64 = self
            .samples
            .iter()
            .map(|s| self.kernel.cdf((x - s) / self.bandwidth))
            .sum();
        total / self.samples.len() as f64
    }
}

/// Mean and sample standard deviation. Empty input gives (0, 0); a single
/// value gives (value, 0).
pub(crate) fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    if n == 0 {
        return (0.0, 0.0);
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    if n < 2 {
        return (mean, 0.0);
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    (mean, var.sqrt())
}
