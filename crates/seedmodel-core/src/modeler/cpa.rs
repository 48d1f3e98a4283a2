//! Conditional Parameter Aggregation.
//!
//! Joins each child's extension onto the parent's raw and numeric data. The
//! result keeps every original row and column of the parent, in order, and
//! appends the extension columns after them.

use std::collections::BTreeMap;

use crate::data::{Dataset, NumericTable};
use crate::error::{Result, SeedModelError};
use crate::model::MultivariateModel;
use crate::modeler::extension::degenerate_counts;
use crate::modeler::{Modeler, ModelingResult};
use crate::navigator::DataNavigator;

/// A table with its children's extension columns appended.
#[derive(Debug, Clone)]
pub struct AugmentedTable {
    /// Raw data plus extension columns.
    pub data: Dataset,
    /// Modeled numeric columns plus extension columns.
    pub numeric: NumericTable,
    /// Number of child tables aggregated.
    pub extensions: usize,
    /// Number of columns the children contributed.
    pub extension_columns: usize,
    /// Degenerate child groups per `parent->child` relation.
    pub degenerate_groups: BTreeMap<String, usize>,
}

impl<N: DataNavigator, M: MultivariateModel> Modeler<'_, N, M> {
    /// Augment `table` with one extension per child.
    ///
    /// A table without children comes back unchanged. A table with children
    /// must declare a primary key, and every child must already be in
    /// `state`.
    pub fn cpa(&self, table: &str, state: &ModelingResult<M>) -> Result<AugmentedTable> {
        let navigator = self.navigator();
        let raw = navigator.get_data(table)?;
        let mut data = raw.clone();
        let mut numeric = self.own_numeric(table)?;

        let children = navigator.get_children(table)?;
        if children.is_empty() {
            return Ok(AugmentedTable {
                data,
                numeric,
                extensions: 0,
                extension_columns: 0,
                degenerate_groups: BTreeMap::new(),
            });
        }

        let primary_key = navigator
            .get_meta_data(table)?
            .primary_key
            .clone()
            .ok_or_else(|| SeedModelError::MissingPrimaryKey {
                table: table.to_string(),
            })?;

        tracing::debug!(
            "Aggregating {} child table(s) into {}: {}",
            children.len(),
            table,
            children.join(", ")
        );

        let extensions = self.build_extension(&primary_key, &children, table, state)?;
        let mut extension_columns = 0;
        for extension in &extensions {
            data.hstack_numeric(&extension.table)?;
            numeric.hstack(&extension.table)?;
            extension_columns += extension.table.column_count();
        }

        if data.row_count() != raw.row_count() || data.index() != raw.index() {
            return Err(SeedModelError::ShapeMismatch {
                table: table.to_string(),
                expected_rows: raw.row_count(),
                actual_rows: data.row_count(),
                detail: "augmented data lost or reordered rows".to_string(),
            });
        }
        debug_assert!(data.columns().starts_with(raw.columns()));

        Ok(AugmentedTable {
            data,
            numeric,
            extensions: extensions.len(),
            extension_columns,
            degenerate_groups: degenerate_counts(table, &extensions),
        })
    }
}
