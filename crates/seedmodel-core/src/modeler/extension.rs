//! Extension building: one row of flattened child-model parameters per
//! parent row.
//!
//! Child rows are grouped by foreign key value. Each parent row takes the
//! group matching its primary key value, a model is fit over that group and
//! its flat parameter vector becomes the row's extension. Groups with fewer
//! than `min_group_rows` rows (including empty groups and parents whose key
//! is missing) are degenerate: their extension is the zero covariance matrix
//! with each column's imputed group mean (0 for an empty group) and the
//! configured `min_std`.

use std::collections::{BTreeMap, HashMap};

use crate::data::impute::impute_table;
use crate::data::NumericTable;
use crate::error::{Result, SeedModelError};
use crate::model::flatten::{flat_length, flatten_nested, KEY_SEPARATOR};
use crate::model::{CovarianceMatrix, ModelParameters, MultivariateModel, UnivariateParams};
use crate::modeler::{Modeler, ModelingResult};
use crate::navigator::DataNavigator;
use crate::schema::types::TableMeta;

/// Extension columns contributed by one child table.
#[derive(Debug, Clone)]
pub struct Extension {
    pub child: String,
    /// Indexed like the parent's raw data.
    pub table: NumericTable,
    pub degenerate_groups: usize,
}

/// Name of the child field that references `parent.primary_key`.
///
/// The first matching field in declaration order wins.
pub fn get_foreign_key(child: &TableMeta, parent: &str, primary_key: &str) -> Result<String> {
    child
        .references()
        .find(|(_, r)| r.table == parent && r.field == primary_key)
        .map(|(field, _)| field.name.clone())
        .ok_or_else(|| SeedModelError::MissingForeignKey {
            child: child.name.clone(),
            parent: parent.to_string(),
            primary_key: primary_key.to_string(),
        })
}

impl<N: DataNavigator, M: MultivariateModel> Modeler<'_, N, M> {
    /// Build one extension per child of `parent`. No children, no extensions.
    ///
    /// Every child must already be recorded in `state`, since its augmented
    /// numeric data is what gets summarized.
    pub fn build_extension(
        &self,
        primary_key: &str,
        children: &[String],
        parent: &str,
        state: &ModelingResult<M>,
    ) -> Result<Vec<Extension>> {
        children
            .iter()
            .map(|child| self.child_extension(primary_key, child, parent, state))
            .collect()
    }

    fn child_extension(
        &self,
        primary_key: &str,
        child: &str,
        parent: &str,
        state: &ModelingResult<M>,
    ) -> Result<Extension> {
        let navigator = self.navigator();
        let parent_data = navigator.get_data(parent)?;
        let child_data = navigator.get_data(child)?;
        let foreign_key = get_foreign_key(navigator.get_meta_data(child)?, parent, primary_key)?;

        let child_numeric = state
            .numeric
            .get(child)
            .ok_or_else(|| SeedModelError::NotYetModeled {
                table: parent.to_string(),
                child: child.to_string(),
            })?;
        if child_numeric.row_count() != child_data.row_count() {
            return Err(SeedModelError::ShapeMismatch {
                table: child.to_string(),
                expected_rows: child_data.row_count(),
                actual_rows: child_numeric.row_count(),
                detail: "augmented numeric data is not aligned with raw data".to_string(),
            });
        }

        let pk_values = parent_data
            .column_values(primary_key)
            .ok_or_else(|| missing_column(parent, primary_key))?;
        let fk_values = child_data
            .column_values(&foreign_key)
            .ok_or_else(|| missing_column(child, &foreign_key))?;

        let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
        for (pos, value) in fk_values.iter().enumerate() {
            if let Some(key) = value.group_key() {
                groups.entry(key).or_default().push(pos);
            }
        }

        let columns = child_numeric.columns();
        let labels = extension_labels(child, columns)?;
        let min_std = self.options().fit.min_std;

        let mut rows: Vec<Vec<f64>> = Vec::with_capacity(parent_data.row_count());
        let mut degenerate = 0usize;
        for pk in &pk_values {
            let positions = pk
                .group_key()
                .and_then(|key| groups.get(&key))
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let group = child_numeric.select_rows(positions);

            let params = if group.row_count() < self.options().min_group_rows {
                degenerate += 1;
                tracing::warn!(
                    "Degenerate group: {} rows of '{}' for {}.{} = {}, using zero-variance fallback",
                    group.row_count(),
                    child,
                    parent,
                    primary_key,
                    pk
                );
                degenerate_parameters(&group, min_std)
            } else {
                self.fit_model(&group)?.parameters()
            };

            let flat = params.flatten();
            if flat.len() != labels.len() {
                return Err(SeedModelError::ShapeMismatch {
                    table: parent.to_string(),
                    expected_rows: labels.len(),
                    actual_rows: flat.len(),
                    detail: format!("extension vector length for child '{}'", child),
                });
            }
            rows.push(flat);
        }

        let mut table = NumericTable::new(
            format!("{}{}{}", parent, KEY_SEPARATOR, child),
            parent_data.index().to_vec(),
        );
        for (col, label) in labels.into_iter().enumerate() {
            table.push_column(label, rows.iter().map(|r| Some(r[col])).collect())?;
        }

        tracing::debug!(
            "Built extension {} -> {}: {} rows x {} columns ({} degenerate groups)",
            parent,
            child,
            table.row_count(),
            table.column_count(),
            degenerate
        );

        Ok(Extension {
            child: child.to_string(),
            table,
            degenerate_groups: degenerate,
        })
    }
}

/// Column names of the extension built from a child with these numeric
/// columns, e.g. `orders__covariance__0__1`, `orders__distribs__amount__mean`.
pub fn extension_labels(child: &str, columns: &[String]) -> Result<Vec<String>> {
    let template = ModelParameters {
        covariance: CovarianceMatrix::zeros(columns.len()),
        distribs: vec![UnivariateParams::new(0.0, 0.0); columns.len()],
    };
    let labels: Vec<String> = flatten_nested(&template.to_nested(columns))?
        .into_keys()
        .map(|key| format!("{}{}{}", child, KEY_SEPARATOR, key))
        .collect();
    debug_assert_eq!(labels.len(), flat_length(columns.len()));
    Ok(labels)
}

/// Zero covariance, imputed group means and `min_std` for every column.
/// An empty group has mean 0 everywhere.
pub(crate) fn degenerate_parameters(group: &NumericTable, min_std: f64) -> ModelParameters {
    let clean = impute_table(group);
    let distribs = clean
        .values()
        .iter()
        .map(|col| {
            let mean = if col.is_empty() {
                0.0
            } else {
                col.iter().flatten().sum::<f64>() / col.len() as f64
            };
            UnivariateParams::new(mean, min_std)
        })
        .collect();

    ModelParameters {
        covariance: CovarianceMatrix::zeros(clean.column_count()),
        distribs,
    }
}

fn missing_column(table: &str, column: &str) -> SeedModelError {
    SeedModelError::Dataset {
        message: format!("table '{}' has no column '{}'", table, column),
    }
}

/// Degenerate-group counts keyed by `parent->child`.
pub(crate) fn degenerate_counts(parent: &str, extensions: &[Extension]) -> BTreeMap<String, usize> {
    extensions
        .iter()
        .filter(|e| e.degenerate_groups > 0)
        .map(|e| (format!("{}->{}", parent, e.child), e.degenerate_groups))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SeedModelError;
    use crate::graph::topo::ModelingOrder;
    use crate::modeler::test_fixtures::{navigator_from_json, shop_navigator};
    use crate::modeler::ModelerOptions;
    use crate::navigator::InMemoryNavigator;
    use crate::schema::types::{FieldMeta, FieldType};
    use serde_json::json;

    /// customers ← orders, where orders has 5 numeric columns and customer 1
    /// owns 10 orders. Customer 2 owns one order and customer 3 none.
    fn customers_orders() -> InMemoryNavigator {
        let mut orders = Vec::new();
        for n in 0..10 {
            let status = ["paid", "shipped"][n as usize % 2];
            orders.push(json!({
                "order_id": 100 + n,
                "customer_id": 1,
                "amount": 5.0 + n as f64 * 2.0,
                "quantity": 1 + n % 3,
                "status": status,
            }));
        }
        orders.push(json!({
            "order_id": 200, "customer_id": 2, "amount": 42.0, "quantity": 7, "status": "paid"
        }));

        navigator_from_json(json!({
            "meta": {
                "name": "shop",
                "tables": {
                    "customers": {
                        "primary_key": "customer_id",
                        "fields": {
                            "customer_id": { "type": "id" },
                            "age": { "type": "integer" }
                        }
                    },
                    "orders": {
                        "primary_key": "order_id",
                        "fields": {
                            "order_id": { "type": "id" },
                            "customer_id": { "type": "id", "ref": { "table": "customers", "field": "customer_id" } },
                            "amount": { "type": "number" },
                            "quantity": { "type": "integer" },
                            "status": { "type": "categorical" }
                        }
                    }
                }
            },
            "tables": {
                "customers": [
                    { "customer_id": 1, "age": 30 },
                    { "customer_id": 2, "age": 41 },
                    { "customer_id": 3, "age": 52 }
                ],
                "orders": orders
            }
        }))
    }

    fn children(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_extension_has_flat_length_of_child_columns() {
        let nav = customers_orders();
        let modeler: Modeler<_> = Modeler::new(&nav, ModelerOptions::default());
        let result = modeler.model_database().unwrap();

        let extensions = modeler
            .build_extension("customer_id", &children(&["orders"]), "customers", &result)
            .unwrap();

        assert_eq!(extensions.len(), 1);
        let table = &extensions[0].table;
        assert_eq!(table.column_count(), 35);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.index(), nav.get_data("customers").unwrap().index());
        assert_eq!(table.columns()[0], "orders__covariance__0__0");
        assert_eq!(table.columns()[24], "orders__covariance__4__4");
        assert_eq!(table.columns()[25], "orders__distribs__order_id__std");
        assert_eq!(table.columns()[28], "orders__distribs__customer_id__mean");
        assert!(table
            .columns()
            .contains(&"orders__distribs__amount__mean".to_string()));
    }

    #[test]
    fn test_child_columns_keep_declared_field_order() {
        let nav = customers_orders();
        let declared = ["order_id", "customer_id", "amount", "quantity", "status"];

        let fields: Vec<&str> = nav
            .get_meta_data("orders")
            .unwrap()
            .fields
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(fields, declared);

        let labels = extension_labels(
            "orders",
            nav.transformed_data("orders").unwrap().columns(),
        )
        .unwrap();
        let stds: Vec<&str> = labels
            .iter()
            .filter(|l| l.ends_with("__std"))
            .map(String::as_str)
            .collect();
        assert_eq!(
            stds,
            vec![
                "orders__distribs__order_id__std",
                "orders__distribs__customer_id__std",
                "orders__distribs__amount__std",
                "orders__distribs__quantity__std",
                "orders__distribs__status__std",
            ]
        );
    }

    #[test]
    fn test_fitted_group_row_matches_group_model() {
        let nav = customers_orders();
        let modeler: Modeler<_> = Modeler::new(&nav, ModelerOptions::default());
        let result = modeler.model_database().unwrap();

        let extensions = modeler
            .build_extension("customer_id", &children(&["orders"]), "customers", &result)
            .unwrap();

        let group = result.numeric["orders"].select_rows(&(0..10).collect::<Vec<_>>());
        let expected = modeler.fit_model(&group).unwrap().parameters().flatten();
        let row: Vec<f64> = extensions[0]
            .table
            .values()
            .iter()
            .map(|col| col[0].unwrap())
            .collect();
        assert_eq!(row, expected);

        let amount_mean = extensions[0]
            .table
            .column("orders__distribs__amount__mean")
            .unwrap()[0]
            .unwrap();
        assert!((amount_mean - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_groups_use_fallback() {
        let nav = customers_orders();
        let modeler: Modeler<_> = Modeler::new(&nav, ModelerOptions::default());
        let result = modeler.model_database().unwrap();

        let extensions = modeler
            .build_extension("customer_id", &children(&["orders"]), "customers", &result)
            .unwrap();
        let table = &extensions[0].table;

        assert_eq!(extensions[0].degenerate_groups, 2);
        for row in [1, 2] {
            for i in 0..5 {
                for j in 0..5 {
                    let col = format!("orders__covariance__{}__{}", i, j);
                    assert_eq!(table.column(&col).unwrap()[row], Some(0.0));
                }
            }
            let std = table.column("orders__distribs__amount__std").unwrap()[row];
            assert_eq!(std, Some(0.001));
        }

        // single order: its own values
        let amount = table.column("orders__distribs__amount__mean").unwrap();
        assert_eq!(amount[1], Some(42.0));
        // no orders: zero means
        assert_eq!(amount[2], Some(0.0));
    }

    #[test]
    fn test_min_group_rows_is_configurable() {
        let nav = customers_orders();
        let options = ModelerOptions {
            min_group_rows: 1,
            ..ModelerOptions::default()
        };
        let modeler: Modeler<_> = Modeler::new(&nav, options);
        let result = modeler.model_database().unwrap();

        let extensions = modeler
            .build_extension("customer_id", &children(&["orders"]), "customers", &result)
            .unwrap();

        // only the customer without orders falls back
        assert_eq!(extensions[0].degenerate_groups, 1);
    }

    #[test]
    fn test_leaf_table_has_no_extensions() {
        let nav = shop_navigator();
        let modeler: Modeler<_> = Modeler::new(&nav, ModelerOptions::default());
        let result = modeler.model_database().unwrap();

        let extensions = modeler
            .build_extension("item_id", &[], "order_items", &result)
            .unwrap();

        assert!(extensions.is_empty());
    }

    #[test]
    fn test_unmodeled_child_is_an_error() {
        let nav = customers_orders();
        let modeler: Modeler<_> = Modeler::new(&nav, ModelerOptions::default());
        let state: ModelingResult<crate::model::GaussianCopula> =
            ModelingResult::new(ModelingOrder { tables: vec![] });

        let err = modeler
            .build_extension("customer_id", &children(&["orders"]), "customers", &state)
            .unwrap_err();

        assert!(matches!(err, SeedModelError::NotYetModeled { .. }));
    }

    #[test]
    fn test_get_foreign_key() {
        let nav = shop_navigator();
        let orders = nav.get_meta_data("orders").unwrap();

        assert_eq!(
            get_foreign_key(orders, "customers", "customer_id").unwrap(),
            "customer_id"
        );
    }

    #[test]
    fn test_get_foreign_key_first_match_wins() {
        let mut child = TableMeta::new("transfers".to_string());
        for name in ["from_account", "to_account"] {
            child.fields.insert(
                name.to_string(),
                FieldMeta::new(name.to_string(), FieldType::Id).referencing("accounts", "id"),
            );
        }

        assert_eq!(
            get_foreign_key(&child, "accounts", "id").unwrap(),
            "from_account"
        );
    }

    #[test]
    fn test_get_foreign_key_missing() {
        let nav = shop_navigator();
        let customers = nav.get_meta_data("customers").unwrap();

        let err = get_foreign_key(customers, "orders", "order_id").unwrap_err();

        assert!(matches!(err, SeedModelError::MissingForeignKey { .. }));
        assert!(err.to_string().contains("customers"));
    }

    #[test]
    fn test_extension_labels() {
        let labels = extension_labels("t", &["a".to_string(), "b".to_string()]).unwrap();

        assert_eq!(
            labels,
            vec![
                "t__covariance__0__0",
                "t__covariance__0__1",
                "t__covariance__1__0",
                "t__covariance__1__1",
                "t__distribs__a__std",
                "t__distribs__a__mean",
                "t__distribs__b__std",
                "t__distribs__b__mean",
            ]
        );
    }

    #[test]
    fn test_degenerate_counts_skip_clean_relations() {
        let ext = |child: &str, n| Extension {
            child: child.to_string(),
            table: NumericTable::with_rows("x", 0),
            degenerate_groups: n,
        };

        let counts = degenerate_counts("p", &[ext("a", 0), ext("b", 3)]);

        assert_eq!(counts.len(), 1);
        assert_eq!(counts["p->b"], 3);
    }
}
