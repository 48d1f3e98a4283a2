use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::flatten::{flatten_model, reconstruct};
use crate::model::{DistributionKind, ModelParameters, MultivariateModel};
use crate::modeler::{ModelingReport, ModelingResult};
use crate::schema::types::DatasetMeta;

/// The `seedmodel.snapshot.json` file: every fitted model of a modeling
/// pass in flat form.
///
/// A snapshot is tied to the dataset metadata it was fit on through
/// `dataset_hash`. Running `seedmodel inspect --dataset` against changed
/// metadata reports the snapshot as stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSnapshot {
    /// SHA256 hash of the dataset metadata (serialized JSON).
    pub dataset_hash: String,
    /// SeedModel version that wrote this snapshot.
    pub seedmodel_version: String,
    /// Timestamp when the snapshot was created.
    pub created_at: String,
    /// Marginal family the models were fit with.
    pub distribution: DistributionKind,
    /// Tables in the order they were modeled.
    pub order: Vec<String>,
    pub report: ModelingReport,
    /// Flat model per table, in modeling order.
    pub models: IndexMap<String, FlatModel>,
}

/// One table's model as a flat parameter vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatModel {
    pub dimension: usize,
    /// Modeled columns, extension columns included.
    pub columns: Vec<String>,
    /// Row-major covariance, then `std, mean` per column.
    pub values: Vec<f64>,
}

impl FlatModel {
    pub fn from_model<M: MultivariateModel>(model: &M) -> Self {
        Self {
            dimension: model.columns().len(),
            columns: model.columns().to_vec(),
            values: flatten_model(model),
        }
    }

    /// Rebuild the structured parameters from the flat vector.
    pub fn reconstruct(&self) -> Result<ModelParameters> {
        reconstruct(&self.values, self.dimension)
    }
}

impl ModelSnapshot {
    pub fn from_result<M: MultivariateModel>(
        meta: &DatasetMeta,
        distribution: DistributionKind,
        result: &ModelingResult<M>,
    ) -> Self {
        let models = result
            .order
            .tables
            .iter()
            .filter_map(|table| {
                let model = result.models.get(table)?;
                Some((table.clone(), FlatModel::from_model(model)))
            })
            .collect();

        Self {
            dataset_hash: super::compute_dataset_hash(meta),
            seedmodel_version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            distribution,
            order: result.order.tables.clone(),
            report: result.report.clone(),
            models,
        }
    }

    /// Whether this snapshot was fit on metadata identical to `meta`.
    pub fn matches_dataset(&self, meta: &DatasetMeta) -> bool {
        self.dataset_hash == super::compute_dataset_hash(meta)
    }
}
