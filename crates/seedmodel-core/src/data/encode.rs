//! Default column encoder: turns a raw table into its numeric representation.
//!
//! Numbers, booleans and datetimes are read directly. Categorical and UUID
//! fields become ordinal codes in first-appearance order. Identifier fields
//! are read as numbers when they are numeric and coded like categoricals
//! otherwise. Free text is not modeled and produces no column.

use std::collections::HashMap;

use crate::data::frame::Dataset;
use crate::data::numeric::NumericTable;
use crate::data::value::Value;
use crate::error::{Result, SeedModelError};
use crate::schema::types::{FieldType, TableMeta};

/// Encodes raw tables into numeric tables, one column per modeled field.
#[derive(Debug, Default, Clone)]
pub struct NumericEncoder;

impl NumericEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode `data` using the field types declared in `meta`.
    ///
    /// Fields declared in the metadata but absent from the data are an error;
    /// data columns without metadata are carried raw but not encoded.
    pub fn encode(&self, meta: &TableMeta, data: &Dataset) -> Result<NumericTable> {
        let mut out = NumericTable::new(meta.name.clone(), data.index().to_vec());

        for field in meta.fields.values() {
            if !field.field_type.is_modeled() {
                continue;
            }
            let values = data.column_values(&field.name).ok_or_else(|| {
                SeedModelError::Dataset {
                    message: format!(
                        "table '{}' declares field '{}' but the data has no such column",
                        meta.name, field.name
                    ),
                }
            })?;

            let encoded = match field.field_type {
                FieldType::Categorical | FieldType::Uuid => encode_ordinal(&values),
                FieldType::Id => {
                    if values.iter().all(|v| v.is_null() || v.as_f64().is_some()) {
                        encode_direct(&values)
                    } else {
                        encode_ordinal(&values)
                    }
                }
                _ => encode_direct(&values),
            };
            out.push_column(field.name.clone(), encoded)?;
        }

        Ok(out)
    }
}

fn encode_direct(values: &[&Value]) -> Vec<Option<f64>> {
    values
        .iter()
        .map(|v| match v {
            Value::String(s) => s.trim().parse::<f64>().ok(),
            other => other.as_f64(),
        })
        .collect()
}

fn encode_ordinal(values: &[&Value]) -> Vec<Option<f64>> {
    let mut codes: HashMap<String, usize> = HashMap::new();
    values
        .iter()
        .map(|v| {
            let key = v.group_key()?;
            let next = codes.len();
            Some(*codes.entry(key).or_insert(next) as f64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::FieldMeta;

    fn meta() -> TableMeta {
        let mut meta = TableMeta::new("orders".to_string());
        for (name, ty) in [
            ("id", FieldType::Id),
            ("status", FieldType::Categorical),
            ("paid", FieldType::Boolean),
            ("note", FieldType::Text),
        ] {
            meta.fields
                .insert(name.to_string(), FieldMeta::new(name.to_string(), ty));
        }
        meta
    }

    fn data() -> Dataset {
        let mut ds = Dataset::new(
            "orders",
            vec![
                "id".to_string(),
                "status".to_string(),
                "paid".to_string(),
                "note".to_string(),
            ],
        );
        let rows = [
            (1, "new", true, "a"),
            (2, "shipped", false, "b"),
            (3, "new", true, "c"),
        ];
        for (id, status, paid, note) in rows {
            ds.push_row(vec![
                Value::Int(id),
                Value::String(status.to_string()),
                Value::Bool(paid),
                Value::String(note.to_string()),
            ])
            .unwrap();
        }
        ds.push_row(vec![
            Value::Int(4),
            Value::Null,
            Value::Null,
            Value::String("d".to_string()),
        ])
        .unwrap();
        ds
    }

    #[test]
    fn test_encode_skips_text_and_codes_categoricals() {
        let table = NumericEncoder::new().encode(&meta(), &data()).unwrap();

        assert_eq!(table.columns(), &["id", "status", "paid"]);
        assert_eq!(
            table.column("status").unwrap(),
            &[Some(0.0), Some(1.0), Some(0.0), None]
        );
        assert_eq!(
            table.column("paid").unwrap(),
            &[Some(1.0), Some(0.0), Some(1.0), None]
        );
        assert_eq!(table.index(), data().index());
    }

    #[test]
    fn test_string_ids_are_coded() {
        let mut meta = TableMeta::new("users".to_string());
        meta.fields.insert(
            "id".to_string(),
            FieldMeta::new("id".to_string(), FieldType::Id),
        );
        let mut ds = Dataset::new("users", vec!["id".to_string()]);
        for id in ["u-1", "u-2", "u-1"] {
            ds.push_row(vec![Value::String(id.to_string())]).unwrap();
        }

        let table = NumericEncoder::new().encode(&meta, &ds).unwrap();

        assert_eq!(table.column("id").unwrap(), &[Some(0.0), Some(1.0), Some(0.0)]);
    }

    #[test]
    fn test_missing_declared_column_is_an_error() {
        let mut meta = meta();
        meta.fields.insert(
            "ghost".to_string(),
            FieldMeta::new("ghost".to_string(), FieldType::Number),
        );
        let err = NumericEncoder::new().encode(&meta, &data()).unwrap_err();
        assert!(matches!(err, SeedModelError::Dataset { .. }));
    }
}
