//! JSON dataset loader.
//!
//! A dataset file bundles the metadata with the raw rows of every table:
//!
//! ```json
//! {
//!   "meta": {
//!     "name": "shop",
//!     "tables": {
//!       "customers": {
//!         "primary_key": "id",
//!         "fields": { "id": { "type": "id" }, "age": { "type": "integer" } }
//!       },
//!       "orders": {
//!         "primary_key": "order_id",
//!         "fields": {
//!           "order_id": { "type": "id" },
//!           "customer_id": { "type": "id", "ref": { "table": "customers", "field": "id" } },
//!           "amount": { "type": "number" }
//!         }
//!       }
//!     }
//!   },
//!   "tables": {
//!     "customers": [ { "id": 1, "age": 31 } ],
//!     "orders": [ { "order_id": 10, "customer_id": 1, "amount": 12.5 } ]
//!   }
//! }
//! ```
//!
//! Table and field `name` entries may be omitted; they default to their map key.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::data::frame::Dataset;
use crate::data::value::Value;
use crate::error::{Result, SeedModelError};
use crate::schema::types::{DatasetMeta, FieldMeta, FieldType, TableMeta};

/// Metadata plus raw tables, as read from a dataset file.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub meta: DatasetMeta,
    pub tables: IndexMap<String, Dataset>,
}

#[derive(Deserialize)]
struct DatasetFile {
    meta: MetaFile,
    #[serde(default)]
    tables: IndexMap<String, Vec<serde_json::Map<String, serde_json::Value>>>,
}

#[derive(Deserialize)]
struct MetaFile {
    #[serde(default)]
    name: String,
    tables: IndexMap<String, TableFile>,
}

#[derive(Deserialize)]
struct TableFile {
    #[serde(default)]
    primary_key: Option<String>,
    fields: IndexMap<String, FieldFile>,
}

#[derive(Deserialize)]
struct FieldFile {
    #[serde(rename = "type")]
    field_type: FieldType,
    #[serde(default, rename = "ref")]
    reference: Option<crate::schema::types::FieldRef>,
}

/// Read a dataset file from disk.
pub fn load_dataset(path: &Path) -> Result<LoadedDataset> {
    let content = std::fs::read_to_string(path).map_err(|e| SeedModelError::Output {
        message: format!("Failed to read dataset from {}", path.display()),
        source: e,
    })?;
    parse_dataset(&content)
}

/// Parse a dataset from its JSON text.
pub fn parse_dataset(content: &str) -> Result<LoadedDataset> {
    let file: DatasetFile = serde_json::from_str(content).map_err(|e| SeedModelError::Dataset {
        message: format!("Failed to parse dataset: {}", e),
    })?;

    let mut meta = DatasetMeta::new(file.meta.name);
    for (table_name, table_file) in file.meta.tables {
        let mut table = TableMeta::new(table_name.clone());
        table.primary_key = table_file.primary_key;
        for (field_name, field_file) in table_file.fields {
            let mut field = FieldMeta::new(field_name.clone(), field_file.field_type);
            field.reference = field_file.reference;
            table.fields.insert(field_name, field);
        }
        meta.tables.insert(table_name, table);
    }

    let mut tables = IndexMap::new();
    for (table_name, table_meta) in &meta.tables {
        let rows = file.tables.get(table_name).map(Vec::as_slice).unwrap_or(&[]);
        if !file.tables.contains_key(table_name) {
            tracing::warn!("Dataset has no rows for table '{}'", table_name);
        }
        tables.insert(table_name.clone(), rows_to_dataset(table_meta, rows)?);
    }
    for table_name in file.tables.keys() {
        if !meta.tables.contains_key(table_name) {
            tracing::warn!(
                "Dataset rows for '{}' have no metadata entry. Ignoring.",
                table_name
            );
        }
    }

    Ok(LoadedDataset { meta, tables })
}

fn rows_to_dataset(
    meta: &TableMeta,
    rows: &[serde_json::Map<String, serde_json::Value>],
) -> Result<Dataset> {
    let columns: Vec<String> = meta.fields.keys().cloned().collect();
    let mut dataset = Dataset::new(meta.name.clone(), columns);

    for (row_idx, row) in rows.iter().enumerate() {
        let mut cells = Vec::with_capacity(meta.fields.len());
        for field in meta.fields.values() {
            let raw = row.get(&field.name).unwrap_or(&serde_json::Value::Null);
            let value = json_to_value(raw, field.field_type).map_err(|message| {
                SeedModelError::Dataset {
                    message: format!(
                        "{}.{} at row {}: {}",
                        meta.name, field.name, row_idx, message
                    ),
                }
            })?;
            cells.push(value);
        }
        dataset.push_row(cells)?;
    }

    Ok(dataset)
}

fn json_to_value(raw: &serde_json::Value, field_type: FieldType) -> std::result::Result<Value, String> {
    use serde_json::Value as Json;

    if raw.is_null() {
        return Ok(Value::Null);
    }

    match field_type {
        FieldType::Number | FieldType::Integer => match raw {
            Json::Number(n) => Ok(number_value(n)),
            Json::String(s) if s.trim().is_empty() => Ok(Value::Null),
            Json::String(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| format!("'{}' is not a number", s)),
            Json::Bool(b) => Ok(Value::Int(*b as i64)),
            other => Err(format!("unexpected value {}", other)),
        },
        FieldType::Boolean => match raw {
            Json::Bool(b) => Ok(Value::Bool(*b)),
            Json::Number(n) => Ok(Value::Bool(n.as_f64().unwrap_or(0.0) != 0.0)),
            Json::String(s) => match s.to_ascii_lowercase().as_str() {
                "true" | "t" | "yes" | "1" => Ok(Value::Bool(true)),
                "false" | "f" | "no" | "0" => Ok(Value::Bool(false)),
                "" => Ok(Value::Null),
                _ => Err(format!("'{}' is not a boolean", s)),
            },
            other => Err(format!("unexpected value {}", other)),
        },
        FieldType::Datetime => match raw {
            Json::String(s) => parse_datetime(s),
            Json::Number(n) => n
                .as_i64()
                .and_then(|secs| DateTime::from_timestamp(secs, 0))
                .map(|dt| Value::Timestamp(dt.naive_utc()))
                .ok_or_else(|| format!("{} is not a valid epoch timestamp", n)),
            other => Err(format!("unexpected value {}", other)),
        },
        FieldType::Uuid => match raw {
            Json::String(s) => uuid::Uuid::parse_str(s)
                .map(Value::Uuid)
                .map_err(|e| format!("'{}' is not a UUID: {}", s, e)),
            other => Err(format!("unexpected value {}", other)),
        },
        FieldType::Id | FieldType::Categorical | FieldType::Text => match raw {
            Json::Number(n) => Ok(number_value(n)),
            Json::String(s) => Ok(Value::String(s.clone())),
            Json::Bool(b) => Ok(Value::Bool(*b)),
            other => Ok(Value::String(other.to_string())),
        },
    }
}

fn number_value(n: &serde_json::Number) -> Value {
    match n.as_i64() {
        Some(i) => Value::Int(i),
        None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
    }
}

fn parse_datetime(s: &str) -> std::result::Result<Value, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(Value::Null);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Value::Timestamp(ts));
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Value::Timestamp(dt.naive_utc()));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(Value::Date)
        .map_err(|_| format!("'{}' is not a recognized datetime", s))
}
