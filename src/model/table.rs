//! Table and Cell data structures

use std::borrow::Cow;

use chrono::{NaiveDate, NaiveDateTime};

use super::schema::Column;
use crate::error::SchemaError;

/// The logical value of one cell, independent of storage width
#[derive(Debug, Clone)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i128),
    Float(f64),
    String(Cow<'static, str>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => {
                // Handle NaN comparison
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (CellValue::String(a), CellValue::String(b)) => a == b,
            (CellValue::Date(a), CellValue::Date(b)) => a == b,
            (CellValue::DateTime(a), CellValue::DateTime(b)) => a == b,
            // Cross-type numeric comparison
            (CellValue::Int(a), CellValue::Float(b)) => (*a as f64) == *b,
            (CellValue::Float(a), CellValue::Int(b)) => *a == (*b as f64),
            _ => false,
        }
    }
}

impl CellValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Convert to a display string
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            CellValue::Null => Cow::Borrowed("NaN"),
            CellValue::Bool(b) => Cow::Owned(b.to_string()),
            CellValue::Int(i) => Cow::Owned(i.to_string()),
            CellValue::Float(f) => Cow::Owned(f.to_string()),
            CellValue::String(s) => Cow::Borrowed(s.as_ref()),
            CellValue::Date(d) => Cow::Owned(d.to_string()),
            CellValue::DateTime(dt) => Cow::Owned(dt.to_string()),
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(Cow::Owned(s.to_string()))
    }
}

/// An ordered set of equally long columns
#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Create a table, checking that every column has the same length
    pub fn new(columns: Vec<Column>) -> Result<Self, SchemaError> {
        let row_count = columns.first().map_or(0, Column::len);

        if let Some(bad) = columns.iter().find(|c| c.len() != row_count) {
            return Err(SchemaError::RowCountMismatch {
                column: bad.name.clone(),
                expected: row_count,
                actual: bad.len(),
            });
        }

        Ok(Self { columns, row_count })
    }

    /// Column definitions in order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column labels in order
    pub fn labels(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Cell values of one row in column order
    pub fn row(&self, index: usize) -> Option<Vec<CellValue>> {
        if index >= self.row_count {
            return None;
        }
        self.columns.iter().map(|c| c.get(index)).collect()
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> Vec<Vec<CellValue>> {
        (0..n.min(self.row_count))
            .filter_map(|i| self.row(i))
            .collect()
    }

    /// Keep the rows whose value in `column` displays as `value`
    pub fn filter_eq(&self, column: &str, value: &str) -> Result<Table, SchemaError> {
        let col = self
            .column(column)
            .ok_or_else(|| SchemaError::UnknownColumn(column.to_string()))?;

        let keep: Vec<usize> = (0..self.row_count)
            .filter(|&row| {
                col.get(row)
                    .is_some_and(|cell| !cell.is_null() && cell.display() == value)
            })
            .collect();

        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), c.data.take(&keep)))
            .collect();

        Ok(Self {
            columns,
            row_count: keep.len(),
        })
    }

    /// Copy of the table with every label passed through `f`
    pub fn relabel<F>(&self, mut f: F) -> Table
    where
        F: FnMut(&str) -> String,
    {
        let columns = self
            .columns
            .iter()
            .map(|c| c.clone().with_name(f(&c.name)))
            .collect();

        Self {
            columns,
            row_count: self.row_count,
        }
    }

    /// Deep memory usage of all columns in bytes
    pub fn memory_usage(&self) -> usize {
        self.columns.iter().map(Column::memory_usage).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColumnData;

    fn listings() -> Table {
        Table::new(vec![
            Column::new("id", ColumnData::Int64(vec![1, 2, 3, 4])),
            Column::new(
                "city",
                ColumnData::text(vec![Some("Paris"), Some("Rome"), None, Some("Paris")]),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_rejects_ragged_columns() {
        let err = Table::new(vec![
            Column::new("a", ColumnData::Int64(vec![1, 2])),
            Column::new("b", ColumnData::Int64(vec![1])),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            SchemaError::RowCountMismatch {
                column: "b".into(),
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_filter_eq() {
        let table = listings();
        let paris = table.filter_eq("city", "Paris").unwrap();

        assert_eq!(paris.row_count(), 2);
        assert_eq!(paris.column_count(), 2);
        assert_eq!(paris.row(1).unwrap()[0], CellValue::Int(4));
        // Source table is untouched
        assert_eq!(table.row_count(), 4);
    }

    #[test]
    fn test_filter_missing_never_matches() {
        let table = listings();
        assert_eq!(table.filter_eq("city", "NaN").unwrap().row_count(), 0);
    }

    #[test]
    fn test_filter_unknown_column() {
        let err = listings().filter_eq("country", "France").unwrap_err();
        assert_eq!(err, SchemaError::UnknownColumn("country".into()));
    }

    #[test]
    fn test_head() {
        let table = listings();
        assert_eq!(table.head(2).len(), 2);
        assert_eq!(table.head(10).len(), 4);
        assert_eq!(table.head(1)[0][1], CellValue::from("Paris"));
    }
}
