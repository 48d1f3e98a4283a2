use crate::data::numeric::NumericTable;
use crate::data::value::Value;
use crate::error::{Result, SeedModelError};

/// A row-oriented raw table: ordered columns, a row index and heterogeneous values.
///
/// The row index labels rows independently of their position so an augmented
/// table can be checked for alignment against the raw table it extends.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    name: String,
    columns: Vec<String>,
    index: Vec<usize>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            index: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Append a row labeled with the next positional index.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        let label = self.index.last().map(|l| l + 1).unwrap_or(0);
        self.push_indexed_row(label, row)
    }

    pub fn push_indexed_row(&mut self, label: usize, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(SeedModelError::ShapeMismatch {
                table: self.name.clone(),
                expected_rows: self.columns.len(),
                actual_rows: row.len(),
                detail: format!("row {} has the wrong number of cells", label),
            });
        }
        self.index.push(label);
        self.rows.push(row);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn index(&self) -> &[usize] {
        &self.index
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Values of one column, top to bottom.
    pub fn column_values(&self, column: &str) -> Option<Vec<&Value>> {
        let pos = self.column_position(column)?;
        Some(self.rows.iter().map(|r| &r[pos]).collect())
    }

    /// Append numeric columns to the right of this table.
    ///
    /// `other` must carry exactly this table's row index, and none of its
    /// column names may already exist here.
    pub fn hstack_numeric(&mut self, other: &NumericTable) -> Result<()> {
        if other.index() != self.index.as_slice() {
            return Err(SeedModelError::ShapeMismatch {
                table: self.name.clone(),
                expected_rows: self.row_count(),
                actual_rows: other.row_count(),
                detail: "extension index does not match the table index".to_string(),
            });
        }
        for column in other.columns() {
            if self.columns.contains(column) {
                return Err(SeedModelError::ColumnCollision {
                    table: self.name.clone(),
                    column: column.clone(),
                });
            }
        }

        self.columns.extend(other.columns().iter().cloned());
        for (row_pos, row) in self.rows.iter_mut().enumerate() {
            for values in other.values() {
                row.push(values[row_pos].map(Value::Float).unwrap_or(Value::Null));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customers() -> Dataset {
        let mut ds = Dataset::new("customers", vec!["id".to_string(), "name".to_string()]);
        ds.push_row(vec![Value::Int(1), Value::String("ada".to_string())])
            .unwrap();
        ds.push_row(vec![Value::Int(2), Value::String("bob".to_string())])
            .unwrap();
        ds
    }

    #[test]
    fn test_push_row_rejects_wrong_width() {
        let mut ds = customers();
        let err = ds.push_row(vec![Value::Int(3)]).unwrap_err();
        assert!(matches!(err, SeedModelError::ShapeMismatch { .. }));
        assert_eq!(ds.row_count(), 2);
    }

    #[test]
    fn test_hstack_numeric_appends_columns() {
        let mut ds = customers();
        let mut ext = NumericTable::new("ext", ds.index().to_vec());
        ext.push_column("orders__x", vec![Some(1.5), None]).unwrap();

        ds.hstack_numeric(&ext).unwrap();

        assert_eq!(ds.columns().len(), 3);
        assert_eq!(ds.rows()[0][2], Value::Float(1.5));
        assert_eq!(ds.rows()[1][2], Value::Null);
    }

    #[test]
    fn test_hstack_numeric_rejects_collisions() {
        let mut ds = customers();
        let mut ext = NumericTable::new("ext", ds.index().to_vec());
        ext.push_column("name", vec![Some(1.0), Some(2.0)]).unwrap();

        let err = ds.hstack_numeric(&ext).unwrap_err();
        assert!(matches!(err, SeedModelError::ColumnCollision { .. }));
    }

    #[test]
    fn test_hstack_numeric_rejects_misaligned_index() {
        let mut ds = customers();
        let mut ext = NumericTable::new("ext", vec![1, 0]);
        ext.push_column("orders__x", vec![Some(1.0), Some(2.0)])
            .unwrap();

        let err = ds.hstack_numeric(&ext).unwrap_err();
        assert!(matches!(err, SeedModelError::ShapeMismatch { .. }));
    }
}
