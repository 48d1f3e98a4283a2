//! # Data Navigator
//!
//! The modeler reads tables, metadata and relationships only through the
//! `DataNavigator` trait. `InMemoryNavigator` is the implementation backed
//! by loaded metadata, raw datasets and their numeric encodings.

use indexmap::IndexMap;

use crate::data::encode::NumericEncoder;
use crate::data::loader::LoadedDataset;
use crate::data::{Dataset, NumericTable};
use crate::error::{Result, SeedModelError};
use crate::graph::dag::RelationshipGraph;
use crate::schema::types::{DatasetMeta, TableMeta};

/// Read access to a relational dataset.
pub trait DataNavigator {
    /// All table names, in metadata order.
    fn table_names(&self) -> Vec<String>;

    fn get_children(&self, table: &str) -> Result<Vec<String>>;

    fn get_parent(&self, table: &str) -> Result<Option<String>>;

    fn get_data(&self, table: &str) -> Result<&Dataset>;

    fn get_meta_data(&self, table: &str) -> Result<&TableMeta>;

    /// Numeric encoding of `get_data(table)`, aligned row for row.
    fn transformed_data(&self, table: &str) -> Result<&NumericTable>;

    /// The relationship graph over all tables.
    fn graph(&self) -> &RelationshipGraph;
}

/// A navigator over fully materialized tables.
pub struct InMemoryNavigator {
    meta: DatasetMeta,
    data: IndexMap<String, Dataset>,
    transformed: IndexMap<String, NumericTable>,
    graph: RelationshipGraph,
}

impl InMemoryNavigator {
    /// Assemble a navigator, checking that every table has raw and
    /// transformed data and that both carry the same row index.
    pub fn new(
        meta: DatasetMeta,
        data: IndexMap<String, Dataset>,
        transformed: IndexMap<String, NumericTable>,
    ) -> Result<Self> {
        let graph = RelationshipGraph::from_meta(&meta)?;

        for table_name in meta.tables.keys() {
            let raw = data.get(table_name).ok_or_else(|| SeedModelError::Dataset {
                message: format!("no raw data for table '{}'", table_name),
            })?;
            let numeric = transformed
                .get(table_name)
                .ok_or_else(|| SeedModelError::Dataset {
                    message: format!("no transformed data for table '{}'", table_name),
                })?;
            if raw.index() != numeric.index() {
                return Err(SeedModelError::ShapeMismatch {
                    table: table_name.clone(),
                    expected_rows: raw.row_count(),
                    actual_rows: numeric.row_count(),
                    detail: "transformed data is not aligned with raw data".to_string(),
                });
            }
        }

        Ok(Self {
            meta,
            data,
            transformed,
            graph,
        })
    }

    /// Encode every table of a loaded dataset and build the navigator.
    pub fn from_loaded(loaded: LoadedDataset, encoder: &NumericEncoder) -> Result<Self> {
        let mut transformed = IndexMap::new();
        for (table_name, table_meta) in &loaded.meta.tables {
            let raw = loaded
                .tables
                .get(table_name)
                .ok_or_else(|| SeedModelError::Dataset {
                    message: format!("no raw data for table '{}'", table_name),
                })?;
            transformed.insert(table_name.clone(), encoder.encode(table_meta, raw)?);
        }
        Self::new(loaded.meta, loaded.tables, transformed)
    }

    pub fn meta(&self) -> &DatasetMeta {
        &self.meta
    }
}

impl DataNavigator for InMemoryNavigator {
    fn table_names(&self) -> Vec<String> {
        self.meta.tables.keys().cloned().collect()
    }

    fn get_children(&self, table: &str) -> Result<Vec<String>> {
        self.graph.children(table)
    }

    fn get_parent(&self, table: &str) -> Result<Option<String>> {
        self.graph.parent(table)
    }

    fn get_data(&self, table: &str) -> Result<&Dataset> {
        self.data.get(table).ok_or_else(|| unknown(table))
    }

    fn get_meta_data(&self, table: &str) -> Result<&TableMeta> {
        self.meta.tables.get(table).ok_or_else(|| unknown(table))
    }

    fn transformed_data(&self, table: &str) -> Result<&NumericTable> {
        self.transformed.get(table).ok_or_else(|| unknown(table))
    }

    fn graph(&self) -> &RelationshipGraph {
        &self.graph
    }
}

fn unknown(table: &str) -> SeedModelError {
    SeedModelError::UnknownTable {
        table: table.to_string(),
    }
}
