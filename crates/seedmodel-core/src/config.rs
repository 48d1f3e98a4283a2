//! # Configuration File Parser
//!
//! Reads and parses `seedmodel.toml`, the optional user configuration file that
//! customizes modeling without requiring CLI flags. Supports:
//!
//! - `[dataset]` — default dataset file
//! - `[model]` — marginal distribution family and KDE bandwidth
//! - `[modeler]` — degenerate-group threshold and numeric guards
//! - `[tables.<name>]` — per-table column exclusions
//!
//! Example `seedmodel.toml`:
//!
//! ```toml
//! [dataset]
//! path = "data/shop.json"
//!
//! [model]
//! distribution = "kde"
//!
//! [modeler]
//! min_group_rows = 3
//! clip_epsilon = 1e-6
//! min_std = 0.001
//!
//! [tables.orders]
//! skip_columns = ["order_id"]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SeedModelError};
use crate::model::{DistributionKind, FitOptions};
use crate::modeler::ModelerOptions;
use crate::schema::types::DatasetMeta;

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "seedmodel.toml";

/// Top-level seedmodel.toml structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeedModelConfig {
    /// Dataset location.
    pub dataset: DatasetConfig,
    /// Model family settings.
    pub model: ModelConfig,
    /// Modeling pass settings.
    pub modeler: ModelerConfig,
    /// Per-table overrides, keyed by table name.
    pub tables: BTreeMap<String, TableConfig>,

    /// Absolute path to the directory containing seedmodel.toml.
    ///
    /// Populated by `read_config()` so that a relative `dataset.path`
    /// resolves against the config file's location, not the CWD.
    #[serde(skip)]
    pub config_dir: Option<PathBuf>,
}

/// Dataset location.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Path to the JSON dataset file.
    pub path: Option<String>,
}

/// Model family settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Marginal family of the copula ("gaussian" or "kde").
    pub distribution: Option<DistributionKind>,
    /// Fixed KDE bandwidth.
    pub kde_bandwidth: Option<f64>,
}

/// Modeling pass settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModelerConfig {
    /// Child groups with fewer rows are degenerate.
    pub min_group_rows: Option<usize>,
    /// Probability clip applied before the normal quantile.
    pub clip_epsilon: Option<f64>,
    /// Standard deviation used for zero-spread columns.
    pub min_std: Option<f64>,
}

/// Per-table configuration override.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Numeric columns left out of this table's model.
    pub skip_columns: Vec<String>,
}

/// Read and parse a seedmodel.toml file from the given directory.
///
/// Returns `None` if the file doesn't exist (config is optional).
/// Returns an error if the file exists but can't be parsed.
pub fn read_config(dir: &Path) -> Result<Option<SeedModelConfig>> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path).map_err(|e| SeedModelError::Config {
        message: format!("Failed to read {}: {}", path.display(), e),
    })?;

    let mut config: SeedModelConfig =
        toml::from_str(&content).map_err(|e| SeedModelError::Config {
            message: format!("Failed to parse {}: {}", path.display(), e),
        })?;

    config.config_dir = Some(std::fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf()));

    config.validate()?;

    Ok(Some(config))
}

impl SeedModelConfig {
    /// Validate semantic constraints that serde cannot enforce.
    pub fn validate(&self) -> Result<()> {
        if let Some(rows) = self.modeler.min_group_rows {
            if rows == 0 {
                return Err(SeedModelError::Config {
                    message: "modeler.min_group_rows must be at least 1".to_string(),
                });
            }
        }
        if let Some(eps) = self.modeler.clip_epsilon {
            if !(eps > 0.0 && eps < 0.5) {
                return Err(SeedModelError::Config {
                    message: format!(
                        "modeler.clip_epsilon must be in (0, 0.5), got {}",
                        eps
                    ),
                });
            }
        }
        if let Some(min_std) = self.modeler.min_std {
            if !(min_std > 0.0 && min_std.is_finite()) {
                return Err(SeedModelError::Config {
                    message: format!("modeler.min_std must be positive, got {}", min_std),
                });
            }
        }
        if let Some(h) = self.model.kde_bandwidth {
            if !(h > 0.0 && h.is_finite()) {
                return Err(SeedModelError::Config {
                    message: format!("model.kde_bandwidth must be positive, got {}", h),
                });
            }
        }
        Ok(())
    }

    /// Fit options with config values layered over the defaults.
    pub fn fit_options(&self) -> FitOptions {
        let defaults = FitOptions::default();
        FitOptions {
            distribution: self.model.distribution.unwrap_or(defaults.distribution),
            min_std: self.modeler.min_std.unwrap_or(defaults.min_std),
            clip_epsilon: self.modeler.clip_epsilon.unwrap_or(defaults.clip_epsilon),
            kde_bandwidth: self.model.kde_bandwidth.or(defaults.kde_bandwidth),
        }
    }

    /// Modeler options with config values layered over the defaults.
    pub fn modeler_options(&self) -> ModelerOptions {
        let defaults = ModelerOptions::default();
        ModelerOptions {
            fit: self.fit_options(),
            min_group_rows: self.modeler.min_group_rows.unwrap_or(defaults.min_group_rows),
            skip_columns: self
                .tables
                .iter()
                .filter(|(_, tc)| !tc.skip_columns.is_empty())
                .map(|(name, tc)| (name.clone(), tc.skip_columns.clone()))
                .collect(),
        }
    }

    /// The configured dataset path, resolved against the config directory.
    pub fn dataset_path(&self) -> Option<PathBuf> {
        let path = PathBuf::from(self.dataset.path.as_ref()?);
        match (&self.config_dir, path.is_relative()) {
            (Some(dir), true) => Some(dir.join(path)),
            _ => Some(path),
        }
    }

    /// Check table overrides against the dataset metadata.
    ///
    /// Returns a warning per override naming a table or column that does not
    /// exist, so stale config entries surface before modeling runs.
    pub fn validate_against_meta(&self, meta: &DatasetMeta) -> Vec<String> {
        let mut warnings = Vec::new();
        for (table, tc) in &self.tables {
            match meta.tables.get(table) {
                Some(table_meta) => {
                    for column in &tc.skip_columns {
                        if !table_meta.fields.contains_key(column) {
                            warnings.push(format!(
                                "seedmodel.toml: [tables.{}] skips column '{}' \
                                 which does not exist in table '{}'",
                                table, column, table
                            ));
                        }
                    }
                }
                None => warnings.push(format!(
                    "seedmodel.toml: [tables.{}] references a table \
                     which does not exist in the dataset",
                    table
                )),
            }
        }
        warnings
    }
}
