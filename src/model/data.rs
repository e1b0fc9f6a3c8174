//! Typed column storage

use std::borrow::Cow;
use std::mem::size_of;

use chrono::{NaiveDate, NaiveDateTime};
use half::f16;
use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;

use super::schema::{FloatWidth, IntWidth, StorageKind};
use super::table::CellValue;

/// Dictionary-encoded strings: distinct values plus one code per row
#[derive(Debug, Clone, Default)]
pub struct Categorical {
    categories: IndexSet<String, FxBuildHasher>,
    codes: Vec<Option<u32>>,
}

impl Categorical {
    /// Encode values, assigning codes in first-seen order
    pub fn encode<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut categories: IndexSet<String, FxBuildHasher> = IndexSet::default();
        let codes = values
            .into_iter()
            .map(|value| {
                value.map(|s| match categories.get_index_of(s) {
                    Some(idx) => idx as u32,
                    None => categories.insert_full(s.to_string()).0 as u32,
                })
            })
            .collect();

        Self { categories, codes }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Distinct non-missing values in code order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }

    pub fn codes(&self) -> &[Option<u32>] {
        &self.codes
    }

    /// Decoded value at `row`; `None` when missing or out of bounds
    pub fn get(&self, row: usize) -> Option<&str> {
        let code = (*self.codes.get(row)?)?;
        self.categories.get_index(code as usize).map(String::as_str)
    }

    fn take(&self, rows: &[usize]) -> Self {
        Self {
            categories: self.categories.clone(),
            codes: rows.iter().map(|&r| self.codes[r]).collect(),
        }
    }

    fn memory_usage(&self) -> usize {
        let dictionary: usize = self
            .categories
            .iter()
            .map(|s| size_of::<String>() + s.len())
            .sum();
        dictionary + self.codes.len() * size_of::<Option<u32>>()
    }
}

/// Column values in their storage representation
///
/// Missing values are `None` for optional storage and NaN for floats.
/// Integer storage has no missing marker.
#[derive(Debug, Clone)]
pub enum ColumnData {
    Text(Vec<Option<String>>),
    Categorical(Categorical),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Int128(Vec<i128>),
    Float16(Vec<f16>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Bool(Vec<Option<bool>>),
    Date(Vec<Option<NaiveDate>>),
    DateTime(Vec<Option<NaiveDateTime>>),
}

impl ColumnData {
    /// Build a text column from optional strings
    pub fn text<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        ColumnData::Text(values.into_iter().map(|v| v.map(Into::into)).collect())
    }

    pub fn kind(&self) -> StorageKind {
        match self {
            ColumnData::Text(_) => StorageKind::Text,
            ColumnData::Categorical(_) => StorageKind::Categorical,
            ColumnData::Int8(_) => StorageKind::Int(IntWidth::W8),
            ColumnData::Int16(_) => StorageKind::Int(IntWidth::W16),
            ColumnData::Int32(_) => StorageKind::Int(IntWidth::W32),
            ColumnData::Int64(_) => StorageKind::Int(IntWidth::W64),
            ColumnData::Int128(_) => StorageKind::Int(IntWidth::W128),
            ColumnData::Float16(_) => StorageKind::Float(FloatWidth::W16),
            ColumnData::Float32(_) => StorageKind::Float(FloatWidth::W32),
            ColumnData::Float64(_) => StorageKind::Float(FloatWidth::W64),
            ColumnData::Bool(_) => StorageKind::Bool,
            ColumnData::Date(_) => StorageKind::Date,
            ColumnData::DateTime(_) => StorageKind::DateTime,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Text(v) => v.len(),
            ColumnData::Categorical(c) => c.len(),
            ColumnData::Int8(v) => v.len(),
            ColumnData::Int16(v) => v.len(),
            ColumnData::Int32(v) => v.len(),
            ColumnData::Int64(v) => v.len(),
            ColumnData::Int128(v) => v.len(),
            ColumnData::Float16(v) => v.len(),
            ColumnData::Float32(v) => v.len(),
            ColumnData::Float64(v) => v.len(),
            ColumnData::Bool(v) => v.len(),
            ColumnData::Date(v) => v.len(),
            ColumnData::DateTime(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Logical value at `row`, `None` when out of bounds
    pub fn get(&self, row: usize) -> Option<CellValue> {
        if row >= self.len() {
            return None;
        }

        let value = match self {
            ColumnData::Text(v) => v[row]
                .as_ref()
                .map(|s| CellValue::String(Cow::Owned(s.clone())))
                .unwrap_or(CellValue::Null),
            ColumnData::Categorical(c) => c
                .get(row)
                .map(|s| CellValue::String(Cow::Owned(s.to_string())))
                .unwrap_or(CellValue::Null),
            ColumnData::Int8(v) => CellValue::Int(v[row].into()),
            ColumnData::Int16(v) => CellValue::Int(v[row].into()),
            ColumnData::Int32(v) => CellValue::Int(v[row].into()),
            ColumnData::Int64(v) => CellValue::Int(v[row].into()),
            ColumnData::Int128(v) => CellValue::Int(v[row]),
            ColumnData::Float16(v) => float_cell(v[row].to_f64()),
            ColumnData::Float32(v) => float_cell(v[row].into()),
            ColumnData::Float64(v) => float_cell(v[row]),
            ColumnData::Bool(v) => v[row].map(CellValue::Bool).unwrap_or(CellValue::Null),
            ColumnData::Date(v) => v[row].map(CellValue::Date).unwrap_or(CellValue::Null),
            ColumnData::DateTime(v) => v[row].map(CellValue::DateTime).unwrap_or(CellValue::Null),
        };

        Some(value)
    }

    /// Number of rows holding a non-missing value
    pub fn non_null_count(&self) -> usize {
        match self {
            ColumnData::Text(v) => v.iter().filter(|x| x.is_some()).count(),
            ColumnData::Categorical(c) => c.codes().iter().filter(|x| x.is_some()).count(),
            ColumnData::Int8(_)
            | ColumnData::Int16(_)
            | ColumnData::Int32(_)
            | ColumnData::Int64(_)
            | ColumnData::Int128(_) => self.len(),
            ColumnData::Float16(v) => v.iter().filter(|x| !x.is_nan()).count(),
            ColumnData::Float32(v) => v.iter().filter(|x| !x.is_nan()).count(),
            ColumnData::Float64(v) => v.iter().filter(|x| !x.is_nan()).count(),
            ColumnData::Bool(v) => v.iter().filter(|x| x.is_some()).count(),
            ColumnData::Date(v) => v.iter().filter(|x| x.is_some()).count(),
            ColumnData::DateTime(v) => v.iter().filter(|x| x.is_some()).count(),
        }
    }

    /// Deep memory usage in bytes, string heap included
    pub fn memory_usage(&self) -> usize {
        match self {
            ColumnData::Text(v) => v
                .iter()
                .map(|s| size_of::<Option<String>>() + s.as_ref().map_or(0, String::len))
                .sum(),
            ColumnData::Categorical(c) => c.memory_usage(),
            ColumnData::Int8(v) => v.len() * size_of::<i8>(),
            ColumnData::Int16(v) => v.len() * size_of::<i16>(),
            ColumnData::Int32(v) => v.len() * size_of::<i32>(),
            ColumnData::Int64(v) => v.len() * size_of::<i64>(),
            ColumnData::Int128(v) => v.len() * size_of::<i128>(),
            ColumnData::Float16(v) => v.len() * size_of::<f16>(),
            ColumnData::Float32(v) => v.len() * size_of::<f32>(),
            ColumnData::Float64(v) => v.len() * size_of::<f64>(),
            ColumnData::Bool(v) => v.len() * size_of::<Option<bool>>(),
            ColumnData::Date(v) => v.len() * size_of::<Option<NaiveDate>>(),
            ColumnData::DateTime(v) => v.len() * size_of::<Option<NaiveDateTime>>(),
        }
    }

    /// Gather the given rows, in the given order
    pub fn take(&self, rows: &[usize]) -> ColumnData {
        fn pick<T: Clone>(values: &[T], rows: &[usize]) -> Vec<T> {
            rows.iter().map(|&r| values[r].clone()).collect()
        }

        match self {
            ColumnData::Text(v) => ColumnData::Text(pick(v, rows)),
            ColumnData::Categorical(c) => ColumnData::Categorical(c.take(rows)),
            ColumnData::Int8(v) => ColumnData::Int8(pick(v, rows)),
            ColumnData::Int16(v) => ColumnData::Int16(pick(v, rows)),
            ColumnData::Int32(v) => ColumnData::Int32(pick(v, rows)),
            ColumnData::Int64(v) => ColumnData::Int64(pick(v, rows)),
            ColumnData::Int128(v) => ColumnData::Int128(pick(v, rows)),
            ColumnData::Float16(v) => ColumnData::Float16(pick(v, rows)),
            ColumnData::Float32(v) => ColumnData::Float32(pick(v, rows)),
            ColumnData::Float64(v) => ColumnData::Float64(pick(v, rows)),
            ColumnData::Bool(v) => ColumnData::Bool(pick(v, rows)),
            ColumnData::Date(v) => ColumnData::Date(pick(v, rows)),
            ColumnData::DateTime(v) => ColumnData::DateTime(pick(v, rows)),
        }
    }
}

fn float_cell(f: f64) -> CellValue {
    if f.is_nan() {
        CellValue::Null
    } else {
        CellValue::Float(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorical_encode() {
        let cat = Categorical::encode(vec![Some("a"), Some("b"), None, Some("a")]);

        assert_eq!(cat.len(), 4);
        assert_eq!(cat.categories().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(cat.codes(), &[Some(0), Some(1), None, Some(0)]);
        assert_eq!(cat.get(2), None);
        assert_eq!(cat.get(3), Some("a"));
    }

    #[test]
    fn test_missing_values() {
        let data = ColumnData::Float64(vec![1.5, f64::NAN]);
        assert_eq!(data.get(0), Some(CellValue::Float(1.5)));
        assert_eq!(data.get(1), Some(CellValue::Null));
        assert_eq!(data.get(2), None);
        assert_eq!(data.non_null_count(), 1);

        let text = ColumnData::text(vec![Some("x"), None]);
        assert_eq!(text.non_null_count(), 1);
        assert_eq!(text.get(1), Some(CellValue::Null));
    }

    #[test]
    fn test_take() {
        let data = ColumnData::Int64(vec![10, 20, 30]);
        let taken = data.take(&[2, 0]);
        assert_eq!(taken.get(0), Some(CellValue::Int(30)));
        assert_eq!(taken.get(1), Some(CellValue::Int(10)));
        assert_eq!(taken.len(), 2);
    }

    #[test]
    fn test_memory_usage_narrows_with_width() {
        let wide = ColumnData::Int64(vec![1; 100]);
        let narrow = ColumnData::Int8(vec![1; 100]);
        assert_eq!(wide.memory_usage(), 800);
        assert_eq!(narrow.memory_usage(), 100);
    }
}
