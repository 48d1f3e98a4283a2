use crate::data::numeric::NumericTable;

/// Fill missing values with the mean of the present values of the same column.
///
/// A column with no present values is filled with `0.0`. Returns a new table
/// of identical shape; the input is left untouched.
pub fn impute_table(table: &NumericTable) -> NumericTable {
    table.map_columns(|values| {
        let fill = column_mean(values).unwrap_or(0.0);
        values.iter().map(|v| Some(v.unwrap_or(fill))).collect()
    })
}

fn column_mean(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}
