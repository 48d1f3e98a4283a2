//! Conversion between fitted-model parameters and flat numeric vectors.
//!
//! The flat layout is fixed: the covariance matrix row-major (D² values),
//! then for each column in order its `std` followed by its `mean` (2·D
//! values), for a total of D² + 2·D.
//!
//! Nested parameter structures flatten to `key → value` maps whose keys join
//! the path with [`KEY_SEPARATOR`]; sequence positions become string keys.

use indexmap::IndexMap;

use crate::error::{Result, SeedModelError};
use crate::model::matrix::CovarianceMatrix;
use crate::model::univariate::UnivariateParams;
use crate::model::{ModelParameters, MultivariateModel};

/// Joins nested keys in flattened names.
pub const KEY_SEPARATOR: &str = "__";

/// Deepest nesting `flatten_nested` accepts.
pub const MAX_NESTING_DEPTH: usize = 16;

/// Length of the flat vector of a model over `dimension` columns.
pub fn flat_length(dimension: usize) -> usize {
    dimension * dimension + 2 * dimension
}

/// Flatten a fitted model into its fixed-order numeric vector.
pub fn flatten_model<M: MultivariateModel>(model: &M) -> Vec<f64> {
    model.parameters().flatten()
}

/// Rebuild covariance and per-column (std, mean) from a flat vector.
///
/// Family-specific extras are not part of the flat form and come back empty.
pub fn reconstruct(values: &[f64], dimension: usize) -> Result<ModelParameters> {
    let expected = flat_length(dimension);
    if values.len() != expected {
        return Err(SeedModelError::Reconstruct {
            expected,
            actual: values.len(),
        });
    }

    let (cov, distribs) = values.split_at(dimension * dimension);
    let covariance = CovarianceMatrix::from_row_major(dimension, cov.to_vec())?;
    let distribs = distribs
        .chunks_exact(2)
        .map(|pair| UnivariateParams::new(pair[1], pair[0]))
        .collect();

    Ok(ModelParameters {
        covariance,
        distribs,
    })
}

impl ModelParameters {
    pub fn dimension(&self) -> usize {
        self.covariance.dimension()
    }

    pub fn flatten(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(flat_length(self.dimension()));
        out.extend_from_slice(self.covariance.row_major());
        for params in &self.distribs {
            out.push(params.std);
            out.push(params.mean);
        }
        out
    }

    /// The parameters as a nested structure over the given column names:
    /// `covariance` (rows of values) then `distribs.<column>.{std, mean}`.
    ///
    /// Flattening it yields the same values in the same order as
    /// [`ModelParameters::flatten`], with descriptive keys.
    pub fn to_nested(&self, columns: &[String]) -> Nested {
        let covariance = Nested::Sequence(
            self.covariance
                .rows()
                .into_iter()
                .map(|row| Nested::Sequence(row.into_iter().map(Nested::Scalar).collect()))
                .collect(),
        );

        let mut distribs = IndexMap::new();
        for (column, params) in columns.iter().zip(&self.distribs) {
            let mut entry = IndexMap::new();
            entry.insert("std".to_string(), Nested::Scalar(params.std));
            entry.insert("mean".to_string(), Nested::Scalar(params.mean));
            distribs.insert(column.clone(), Nested::Mapping(entry));
        }

        let mut root = IndexMap::new();
        root.insert("covariance".to_string(), covariance);
        root.insert("distribs".to_string(), Nested::Mapping(distribs));
        Nested::Mapping(root)
    }
}

/// A nested parameter structure.
#[derive(Debug, Clone, PartialEq)]
pub enum Nested {
    Scalar(f64),
    Sequence(Vec<Nested>),
    Mapping(IndexMap<String, Nested>),
}

impl Nested {
    /// A two-level sequence from matrix rows.
    pub fn matrix(rows: &[Vec<f64>]) -> Self {
        Nested::Sequence(
            rows.iter()
                .map(|r| Nested::Sequence(r.iter().copied().map(Nested::Scalar).collect()))
                .collect(),
        )
    }
}

/// Flatten a nested structure into `joined key → value`, in traversal order.
///
/// A scalar at the root gets the empty key. Two paths that join to the same
/// key are rejected.
pub fn flatten_nested(value: &Nested) -> Result<IndexMap<String, f64>> {
    let mut out = IndexMap::new();
    flatten_into(value, String::new(), 0, &mut out)?;
    Ok(out)
}

fn flatten_into(
    value: &Nested,
    prefix: String,
    depth: usize,
    out: &mut IndexMap<String, f64>,
) -> Result<()> {
    if depth > MAX_NESTING_DEPTH {
        return Err(SeedModelError::NestingTooDeep {
            max_depth: MAX_NESTING_DEPTH,
        });
    }

    match value {
        Nested::Scalar(v) => {
            if out.insert(prefix.clone(), *v).is_some() {
                return Err(SeedModelError::DuplicateKey { key: prefix });
            }
        }
        Nested::Sequence(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten_into(item, join_key(&prefix, &i.to_string()), depth + 1, out)?;
            }
        }
        Nested::Mapping(entries) => {
            for (key, item) in entries {
                flatten_into(item, join_key(&prefix, key), depth + 1, out)?;
            }
        }
    }
    Ok(())
}

fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}{}{}", prefix, KEY_SEPARATOR, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(entries: Vec<(&str, Nested)>) -> Nested {
        Nested::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    fn params_2d() -> ModelParameters {
        ModelParameters {
            covariance: CovarianceMatrix::from_row_major(2, vec![1.0, 0.25, 0.25, 2.0]).unwrap(),
            distribs: vec![UnivariateParams::new(10.0, 1.5), UnivariateParams::new(-3.0, 0.5)],
        }
    }

    #[test]
    fn test_flat_dict_is_unchanged() {
        let nested = mapping(vec![("a", Nested::Scalar(1.0)), ("b", Nested::Scalar(2.0))]);
        let flat = flatten_nested(&nested).unwrap();

        assert_eq!(flat.len(), 2);
        assert_eq!(flat["a"], 1.0);
        assert_eq!(flat["b"], 2.0);
    }

    #[test]
    fn test_nested_dict_joins_keys() {
        let nested = mapping(vec![
            (
                "a",
                mapping(vec![("x", Nested::Scalar(1.0)), ("y", Nested::Scalar(2.0))]),
            ),
            ("b", Nested::Scalar(3.0)),
        ]);
        let flat = flatten_nested(&nested).unwrap();

        let keys: Vec<&str> = flat.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a__x", "a__y", "b"]);
        assert_eq!(flat["a__y"], 2.0);
        assert_eq!(flat["b"], 3.0);
    }

    #[test]
    fn test_matrix_uses_index_keys_row_major() {
        let flat = flatten_nested(&Nested::matrix(&[vec![1.0, 0.0], vec![0.0, 1.0]])).unwrap();

        let entries: Vec<(&str, f64)> = flat.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(
            entries,
            vec![("0__0", 1.0), ("0__1", 0.0), ("1__0", 0.0), ("1__1", 1.0)]
        );
    }

    #[test]
    fn test_root_scalar_has_empty_key() {
        let flat = flatten_nested(&Nested::Scalar(4.0)).unwrap();
        assert_eq!(flat[""], 4.0);
    }

    #[test]
    fn test_colliding_paths_are_rejected() {
        let nested = mapping(vec![
            ("a__b", Nested::Scalar(1.0)),
            ("a", mapping(vec![("b", Nested::Scalar(2.0))])),
        ]);
        assert!(matches!(
            flatten_nested(&nested),
            Err(SeedModelError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn test_depth_is_bounded() {
        let mut nested = Nested::Scalar(0.0);
        for _ in 0..=MAX_NESTING_DEPTH {
            nested = Nested::Sequence(vec![nested]);
        }
        assert!(matches!(
            flatten_nested(&nested),
            Err(SeedModelError::NestingTooDeep { .. })
        ));
    }

    #[test]
    fn test_flatten_layout() {
        let flat = params_2d().flatten();
        assert_eq!(flat, vec![1.0, 0.25, 0.25, 2.0, 1.5, 10.0, 0.5, -3.0]);
        assert_eq!(flat.len(), flat_length(2));
    }

    #[test]
    fn test_reconstruct_inverts_flatten() {
        let params = params_2d();
        let rebuilt = reconstruct(&params.flatten(), 2).unwrap();
        assert_eq!(rebuilt, params);
    }

    #[test]
    fn test_reconstruct_rejects_wrong_length() {
        match reconstruct(&[1.0, 2.0, 3.0], 2) {
            Err(SeedModelError::Reconstruct { expected, actual }) => {
                assert_eq!(expected, 8);
                assert_eq!(actual, 3);
            }
            other => panic!("expected a length error, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_form_matches_flat_order() {
        let params = params_2d();
        let columns = vec!["amount".to_string(), "qty".to_string()];
        let flat = flatten_nested(&params.to_nested(&columns)).unwrap();

        let values: Vec<f64> = flat.values().copied().collect();
        assert_eq!(values, params.flatten());
        let keys: Vec<&str> = flat.keys().map(String::as_str).collect();
        assert_eq!(keys[0], "covariance__0__0");
        assert_eq!(keys[3], "covariance__1__1");
        assert_eq!(keys[4], "distribs__amount__std");
        assert_eq!(keys[7], "distribs__qty__mean");
    }

    #[test]
    fn test_zero_dimension() {
        assert_eq!(flat_length(0), 0);
        let rebuilt = reconstruct(&[], 0).unwrap();
        assert_eq!(rebuilt.dimension(), 0);
    }
}
