use crate::error::{Result, SeedModelError};

/// A column-major numeric table. `None` marks a missing value.
///
/// Every column has exactly one entry per index label.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericTable {
    name: String,
    columns: Vec<String>,
    index: Vec<usize>,
    values: Vec<Vec<Option<f64>>>,
}

impl NumericTable {
    pub fn new(name: impl Into<String>, index: Vec<usize>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            index,
            values: Vec::new(),
        }
    }

    /// Build a table with a positional index `0..rows`.
    pub fn with_rows(name: impl Into<String>, rows: usize) -> Self {
        Self::new(name, (0..rows).collect())
    }

    pub fn push_column(&mut self, column: impl Into<String>, values: Vec<Option<f64>>) -> Result<()> {
        let column = column.into();
        if values.len() != self.index.len() {
            return Err(SeedModelError::ShapeMismatch {
                table: self.name.clone(),
                expected_rows: self.index.len(),
                actual_rows: values.len(),
                detail: format!("column '{}'", column),
            });
        }
        if self.columns.contains(&column) {
            return Err(SeedModelError::ColumnCollision {
                table: self.name.clone(),
                column,
            });
        }
        self.columns.push(column);
        self.values.push(values);
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

    /// Column vectors in column order.
    pub fn values(&self) -> &[Vec<Option<f64>>] {
        &self.values
    }

    pub fn column(&self, column: &str) -> Option<&[Option<f64>]> {
        let pos = self.columns.iter().position(|c| c == column)?;
        Some(&self.values[pos])
    }

    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn missing_count(&self) -> usize {
        self.values
            .iter()
            .map(|col| col.iter().filter(|v| v.is_none()).count())
            .sum()
    }

    /// The rows at the given positions, keeping their index labels.
    pub fn select_rows(&self, positions: &[usize]) -> NumericTable {
        NumericTable {
            name: self.name.clone(),
            columns: self.columns.clone(),
            index: positions.iter().map(|&p| self.index[p]).collect(),
            values: self
                .values
                .iter()
                .map(|col| positions.iter().map(|&p| col[p]).collect())
                .collect(),
        }
    }

    /// A copy without the named columns. Unknown names are ignored.
    pub fn without_columns(&self, drop: &[String]) -> NumericTable {
        let mut out = NumericTable::new(self.name.clone(), self.index.clone());
        for (column, values) in self.columns.iter().zip(&self.values) {
            if !drop.contains(column) {
                out.columns.push(column.clone());
                out.values.push(values.clone());
            }
        }
        out
    }

    /// A table with the same name, index and columns, each column's values
    /// replaced by `f` applied to them.
    pub fn map_columns<F>(&self, mut f: F) -> NumericTable
    where
        F: FnMut(&[Option<f64>]) -> Vec<Option<f64>>,
    {
        let mut out = NumericTable::new(self.name.clone(), self.index.clone());
        for (column, values) in self.columns.iter().zip(&self.values) {
            let mapped = f(values);
            debug_assert_eq!(mapped.len(), values.len());
            out.columns.push(column.clone());
            out.values.push(mapped);
        }
        out
    }

    /// Append all columns of `other`, which must share this table's index.
    pub fn hstack(&mut self, other: &NumericTable) -> Result<()> {
        if other.index != self.index {
            return Err(SeedModelError::ShapeMismatch {
                table: self.name.clone(),
                expected_rows: self.row_count(),
                actual_rows: other.row_count(),
                detail: format!("index of '{}' does not match", other.name),
            });
        }
        for (column, values) in other.columns.iter().zip(&other.values) {
            self.push_column(column.clone(), values.clone())?;
        }
        Ok(())
    }

    /// Dense column vectors, or `None` if any value is missing.
    pub fn dense_columns(&self) -> Option<Vec<Vec<f64>>> {
        self.values
            .iter()
            .map(|col| col.iter().copied().collect::<Option<Vec<f64>>>())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NumericTable {
        let mut t = NumericTable::with_rows("orders", 3);
        t.push_column("amount", vec![Some(1.0), None, Some(3.0)])
            .unwrap();
        t.push_column("qty", vec![Some(2.0), Some(4.0), Some(6.0)])
            .unwrap();
        t
    }

    #[test]
    fn test_push_column_checks_length() {
        let mut t = sample();
        assert!(t.push_column("bad", vec![Some(1.0)]).is_err());
        assert!(t.push_column("qty", vec![None, None, None]).is_err());
    }

    #[test]
    fn test_select_rows_keeps_labels() {
        let t = sample();
        let sub = t.select_rows(&[2, 0]);
        assert_eq!(sub.index(), &[2, 0]);
        assert_eq!(sub.column("qty").unwrap(), &[Some(6.0), Some(2.0)]);
    }

    #[test]
    fn test_dense_columns_requires_no_missing() {
        let t = sample();
        assert_eq!(t.missing_count(), 1);
        assert!(t.dense_columns().is_none());
        let dense = t.without_columns(&["amount".to_string()]).dense_columns();
        assert_eq!(dense, Some(vec![vec![2.0, 4.0, 6.0]]));
    }
}
