pub mod graph;
pub mod inspect;
pub mod model;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use seedmodel_core::config::{SeedModelConfig, CONFIG_FILE_NAME};
use seedmodel_core::data::encode::NumericEncoder;
use seedmodel_core::data::loader::load_dataset;
use seedmodel_core::navigator::InMemoryNavigator;

/// Resolve the dataset path: explicit flag or env var first, then the
/// `[dataset] path` entry of seedmodel.toml.
pub fn resolve_dataset_path(
    dataset: Option<&Path>,
    config: Option<&SeedModelConfig>,
) -> Result<PathBuf> {
    if let Some(path) = dataset {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = config.and_then(|c| c.dataset_path()) {
        return Ok(path);
    }
    bail!(
        "No dataset given.\n  Pass --dataset, set SEEDMODEL_DATASET, or add a [dataset] path to {}",
        CONFIG_FILE_NAME
    )
}

/// Load and encode a dataset into a navigator.
pub fn load_navigator(path: &Path) -> Result<InMemoryNavigator> {
    let loaded = load_dataset(path)
        .with_context(|| format!("Failed to load dataset {}", path.display()))?;
    let navigator = InMemoryNavigator::from_loaded(loaded, &NumericEncoder::new())?;
    Ok(navigator)
}
