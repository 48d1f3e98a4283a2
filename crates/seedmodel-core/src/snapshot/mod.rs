//! # Model Snapshot
//!
//! The `seedmodel.snapshot.json` file stores the flat parameter vector of
//! every table's model together with a hash of the dataset metadata, so a
//! modeling pass can be inspected, diffed and reconstructed without
//! refitting.
//!
//! It is a machine-generated artifact. If it is stale or conflicted, delete
//! it and run `seedmodel model` again.

pub mod types;

use std::fs;
use std::path::Path;

use self::types::ModelSnapshot;
use crate::error::{Result, SeedModelError};
use crate::schema::types::DatasetMeta;

/// Default snapshot file name.
pub const SNAPSHOT_FILE_NAME: &str = "seedmodel.snapshot.json";

/// Write a snapshot to disk atomically.
///
/// Writes to a temporary file in the same directory, then renames it into
/// place, so an interrupted write leaves any previous snapshot intact.
pub fn write_snapshot(snapshot: &ModelSnapshot, path: &Path) -> Result<()> {
    use std::io::Write;

    let json = serde_json::to_string_pretty(snapshot).map_err(|e| SeedModelError::Snapshot {
        message: format!("Failed to serialize snapshot: {}", e),
    })?;

    let dir = path.parent().unwrap_or(Path::new("."));
    let tmp_path = dir.join(".seedmodel.snapshot.tmp");

    let mut file = fs::File::create(&tmp_path).map_err(|e| SeedModelError::Output {
        message: format!("Failed to create temp snapshot at {}", tmp_path.display()),
        source: e,
    })?;
    file.write_all(json.as_bytes())
        .map_err(|e| SeedModelError::Output {
            message: format!("Failed to write temp snapshot at {}", tmp_path.display()),
            source: e,
        })?;
    file.sync_all().map_err(|e| SeedModelError::Output {
        message: "Failed to sync snapshot to disk".to_string(),
        source: e,
    })?;

    fs::rename(&tmp_path, path).map_err(|e| SeedModelError::Output {
        message: format!(
            "Failed to rename {} → {}",
            tmp_path.display(),
            path.display()
        ),
        source: e,
    })?;

    Ok(())
}

/// Read a snapshot from disk.
pub fn read_snapshot(path: &Path) -> Result<ModelSnapshot> {
    let content = fs::read_to_string(path).map_err(|e| SeedModelError::Output {
        message: format!("Failed to read snapshot from {}", path.display()),
        source: e,
    })?;
    let snapshot: ModelSnapshot =
        serde_json::from_str(&content).map_err(|e| SeedModelError::Snapshot {
            message: format!("Failed to parse snapshot: {}", e),
        })?;
    Ok(snapshot)
}

/// SHA256 over the metadata JSON with tables sorted by name.
///
/// Field order is kept: it decides the column order of every model.
pub fn compute_dataset_hash(meta: &DatasetMeta) -> String {
    use sha2::{Digest, Sha256};
    let mut normalized = meta.clone();
    normalized.tables.sort_keys();
    let serialized = serde_json::to_string(&normalized).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    format!("{:x}", hasher.finalize())
}
