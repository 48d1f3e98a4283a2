//! # Relational Modeler
//!
//! Fits one multivariate model per table, bottom-up over the relationship
//! graph. Before a table is fit, Conditional Parameter Aggregation (CPA)
//! appends to it, for every child table, the flattened parameters of a model
//! fit over that parent row's child rows. A parent's model therefore sees its
//! children (and, through their own extension columns, its grandchildren).
//!
//! All state of a pass lives in the returned [`ModelingResult`]; a failed
//! pass returns an error and no partial registries.

pub mod cpa;
pub mod extension;

#[cfg(test)]
pub(crate) mod test_fixtures;

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::data::impute::impute_table;
use crate::data::{Dataset, NumericTable};
use crate::error::Result;
use crate::graph::topo::{modeling_order, ModelingOrder};
use crate::model::{FitOptions, GaussianCopula, MultivariateModel};
use crate::navigator::DataNavigator;

pub use cpa::AugmentedTable;
pub use extension::get_foreign_key;

/// Settings for one modeling pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelerOptions {
    pub fit: FitOptions,
    /// Child groups with fewer rows than this are degenerate and get the
    /// zero-variance fallback extension.
    pub min_group_rows: usize,
    /// Numeric columns excluded from modeling, per table.
    pub skip_columns: BTreeMap<String, Vec<String>>,
}

impl Default for ModelerOptions {
    fn default() -> Self {
        Self {
            fit: FitOptions::default(),
            min_group_rows: 2,
            skip_columns: BTreeMap::new(),
        }
    }
}

/// Counters collected during a modeling pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelingReport {
    pub tables_modeled: usize,
    pub extensions_built: usize,
    /// Degenerate child groups per `parent->child` relation.
    pub degenerate_groups: BTreeMap<String, usize>,
}

impl ModelingReport {
    pub fn total_degenerate_groups(&self) -> usize {
        self.degenerate_groups.values().sum()
    }
}

/// Everything a modeling pass produces, keyed by table name.
#[derive(Debug, Clone)]
pub struct ModelingResult<M> {
    /// Raw data plus child extension columns.
    pub tables: IndexMap<String, Dataset>,
    /// Numeric data plus child extension columns; what each model was fit on.
    pub numeric: IndexMap<String, NumericTable>,
    pub models: IndexMap<String, M>,
    /// The order tables were processed in.
    pub order: ModelingOrder,
    pub report: ModelingReport,
}

impl<M> ModelingResult<M> {
    fn new(order: ModelingOrder) -> Self {
        Self {
            tables: IndexMap::new(),
            numeric: IndexMap::new(),
            models: IndexMap::new(),
            order,
            report: ModelingReport::default(),
        }
    }

    fn record(&mut self, table: &str, augmented: AugmentedTable, model: M) {
        self.report.tables_modeled += 1;
        self.report.extensions_built += augmented.extensions;
        for (relation, count) in augmented.degenerate_groups {
            *self.report.degenerate_groups.entry(relation).or_insert(0) += count;
        }
        self.tables.insert(table.to_string(), augmented.data);
        self.numeric.insert(table.to_string(), augmented.numeric);
        self.models.insert(table.to_string(), model);
    }
}

/// Drives a modeling pass over every table a navigator exposes.
///
/// `M` is the multivariate model family; its marginals are selected through
/// `ModelerOptions::fit`.
pub struct Modeler<'a, N: DataNavigator, M: MultivariateModel = GaussianCopula> {
    navigator: &'a N,
    options: ModelerOptions,
    _model: std::marker::PhantomData<M>,
}

impl<'a, N: DataNavigator, M: MultivariateModel> Modeler<'a, N, M> {
    pub fn new(navigator: &'a N, options: ModelerOptions) -> Self {
        Self {
            navigator,
            options,
            _model: std::marker::PhantomData,
        }
    }

    pub fn navigator(&self) -> &N {
        self.navigator
    }

    pub fn options(&self) -> &ModelerOptions {
        &self.options
    }

    /// Model every table, children strictly before parents.
    ///
    /// For each table: run CPA, impute, fit, record. Postcondition: the
    /// `tables` and `models` registries both hold exactly every table name.
    pub fn model_database(&self) -> Result<ModelingResult<M>> {
        let order = modeling_order(self.navigator.graph())?;
        let mut result = ModelingResult::new(order.clone());

        for table in &order.tables {
            let augmented = self.cpa(table, &result)?;
            let model = self.fit_model(&augmented.numeric)?;
            tracing::info!(
                "Modeled {} ({} rows, {} columns, {} from children)",
                table,
                augmented.data.row_count(),
                model.columns().len(),
                augmented.extension_columns
            );
            result.record(table, augmented, model);
        }

        debug_assert!(result.tables.keys().eq(result.models.keys()));
        Ok(result)
    }

    /// Impute missing values, then fit a model over every column of `data`.
    pub fn fit_model(&self, data: &NumericTable) -> Result<M> {
        let clean = impute_table(data);
        M::fit(&clean, &self.options.fit)
    }

    /// The numeric columns of `table` that take part in modeling.
    pub(crate) fn own_numeric(&self, table: &str) -> Result<NumericTable> {
        let transformed = self.navigator.transformed_data(table)?;
        Ok(match self.options.skip_columns.get(table) {
            Some(skip) => transformed.without_columns(skip),
            None => transformed.clone(),
        })
    }
}
