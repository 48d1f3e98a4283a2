use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level metadata of a relational dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetMeta {
    pub name: String,
    pub tables: IndexMap<String, TableMeta>,
}

impl DatasetMeta {
    pub fn new(name: String) -> Self {
        Self {
            name,
            tables: IndexMap::new(),
        }
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn reference_count(&self) -> usize {
        self.tables
            .values()
            .map(|t| t.fields.values().filter(|f| f.reference.is_some()).count())
            .sum()
    }
}

/// Field metadata of one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
    pub fields: IndexMap<String, FieldMeta>,
}

impl TableMeta {
    pub fn new(name: String) -> Self {
        Self {
            name,
            primary_key: None,
            fields: IndexMap::new(),
        }
    }

    /// Fields that reference another table, in declaration order.
    pub fn references(&self) -> impl Iterator<Item = (&FieldMeta, &FieldRef)> {
        self.fields
            .values()
            .filter_map(|f| f.reference.as_ref().map(|r| (f, r)))
    }
}

/// A single field of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMeta {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<FieldRef>,
}

impl FieldMeta {
    pub fn new(name: String, field_type: FieldType) -> Self {
        Self {
            name,
            field_type,
            reference: None,
        }
    }

    /// Builder-style helper for foreign key fields.
    pub fn referencing(mut self, table: &str, field: &str) -> Self {
        self.reference = Some(FieldRef {
            table: table.to_string(),
            field: field.to_string(),
        });
        self
    }
}

/// Foreign-key annotation: this field holds values of `table.field`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRef {
    pub table: String,
    pub field: String,
}

/// Logical field type, used to parse raw values and to pick a numeric encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Key column (primary or foreign). Integer or string identifiers.
    Id,
    Number,
    Integer,
    Boolean,
    Categorical,
    Datetime,
    /// Free text. Carried in raw data, never modeled.
    Text,
    Uuid,
}

impl FieldType {
    /// Whether the encoder produces a numeric column for this field.
    pub fn is_modeled(&self) -> bool {
        !matches!(self, FieldType::Text)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Id => "id",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Categorical => "categorical",
            FieldType::Datetime => "datetime",
            FieldType::Text => "text",
            FieldType::Uuid => "uuid",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_meta_deserializes_ref() {
        let json = r#"{"name": "customer_id", "type": "id", "ref": {"table": "customers", "field": "id"}}"#;
        let field: FieldMeta = serde_json::from_str(json).unwrap();
        assert_eq!(field.field_type, FieldType::Id);
        let reference = field.reference.unwrap();
        assert_eq!(reference.table, "customers");
        assert_eq!(reference.field, "id");
    }

    #[test]
    fn test_reference_count() {
        let mut meta = DatasetMeta::new("shop".to_string());
        let mut orders = TableMeta::new("orders".to_string());
        orders.fields.insert(
            "customer_id".to_string(),
            FieldMeta::new("customer_id".to_string(), FieldType::Id).referencing("customers", "id"),
        );
        orders.fields.insert(
            "amount".to_string(),
            FieldMeta::new("amount".to_string(), FieldType::Number),
        );
        meta.tables.insert("orders".to_string(), orders);

        assert_eq!(meta.table_count(), 1);
        assert_eq!(meta.reference_count(), 1);
    }

    #[test]
    fn test_text_is_not_modeled() {
        assert!(!FieldType::Text.is_modeled());
        assert!(FieldType::Categorical.is_modeled());
    }
}
