//! Storage narrowing: categorical text, downcast integers and floats

use half::f16;
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::error::SchemaError;
use crate::model::{Categorical, Column, ColumnData, IntWidth, Table};

/// Rewrites every column into the smallest storage that keeps its values exact
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeOptimizer;

impl TypeOptimizer {
    pub fn new() -> Self {
        Self
    }

    /// Build an optimized copy of `table`
    ///
    /// Fails as a whole if any integer column cannot fit in 64 bits.
    pub fn optimize(&self, table: &Table) -> Result<Table, SchemaError> {
        let rows = table.row_count();

        let columns = table
            .columns()
            .iter()
            .map(|col| {
                let data = self.optimize_column(col, rows)?;
                if data.kind() != col.kind() {
                    debug!(column = %col.name, from = %col.kind(), to = %data.kind(), "narrowed column");
                }
                Ok(Column::new(col.name.clone(), data))
            })
            .collect::<Result<Vec<_>, SchemaError>>()?;

        Table::new(columns)
    }

    fn optimize_column(&self, col: &Column, rows: usize) -> Result<ColumnData, SchemaError> {
        let narrowed = match &col.data {
            ColumnData::Text(values) => categorize(values, rows).map(ColumnData::Categorical),
            ColumnData::Int8(v) => narrow_ints(&col.name, v)?,
            ColumnData::Int16(v) => narrow_ints(&col.name, v)?,
            ColumnData::Int32(v) => narrow_ints(&col.name, v)?,
            ColumnData::Int64(v) => narrow_ints(&col.name, v)?,
            ColumnData::Int128(v) => narrow_ints(&col.name, v)?,
            ColumnData::Float16(_) => None,
            ColumnData::Float32(v) => narrow_floats(v.iter().map(|&f| f64::from(f))),
            ColumnData::Float64(v) => narrow_floats(v.iter().copied()),
            ColumnData::Categorical(_)
            | ColumnData::Bool(_)
            | ColumnData::Date(_)
            | ColumnData::DateTime(_) => None,
        };

        Ok(narrowed.unwrap_or_else(|| col.data.clone()))
    }
}

/// Convenience function to optimize a table
pub fn optimize(table: &Table) -> Result<Table, SchemaError> {
    TypeOptimizer::new().optimize(table)
}

/// Dictionary-encode text when distinct values (missing included) are
/// fewer than half the rows
fn categorize(values: &[Option<String>], rows: usize) -> Option<Categorical> {
    let distinct: FxHashSet<Option<&str>> = values.iter().map(|v| v.as_deref()).collect();

    if (distinct.len() as f64) < (rows as f64) / 2.0 {
        Some(Categorical::encode(values.iter().map(|v| v.as_deref())))
    } else {
        None
    }
}

fn narrow_ints<T>(column: &str, values: &[T]) -> Result<Option<ColumnData>, SchemaError>
where
    T: Copy + Into<i128>,
{
    let mut wide = values.iter().map(|&v| Into::<i128>::into(v));

    let Some(first) = wide.next() else {
        return Ok(None);
    };
    let (min, max) = wide.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));

    let width = IntWidth::smallest_for(min, max).ok_or_else(|| SchemaError::IntegerOverflow {
        column: column.to_string(),
        min,
        max,
    })?;

    // Range checked above, so every cast below is lossless
    let wide = values.iter().map(|&v| Into::<i128>::into(v));
    let data = match width {
        IntWidth::W8 => ColumnData::Int8(wide.map(|v| v as i8).collect()),
        IntWidth::W16 => ColumnData::Int16(wide.map(|v| v as i16).collect()),
        IntWidth::W32 => ColumnData::Int32(wide.map(|v| v as i32).collect()),
        IntWidth::W64 => ColumnData::Int64(wide.map(|v| v as i64).collect()),
        IntWidth::W128 => ColumnData::Int128(wide.collect()),
    };

    Ok(Some(data))
}

fn fits_f16(v: f64) -> bool {
    v.is_nan() || f16::from_f64(v).to_f64() == v
}

fn fits_f32(v: f64) -> bool {
    v.is_nan() || f64::from(v as f32) == v
}

/// Pick 16 or 32 bits when every value round-trips exactly; `None` keeps
/// the current storage
fn narrow_floats<I>(values: I) -> Option<ColumnData>
where
    I: Iterator<Item = f64> + Clone,
{
    if values.clone().next().is_none() {
        return None;
    }

    if values.clone().all(fits_f16) {
        Some(ColumnData::Float16(values.map(f16::from_f64).collect()))
    } else if values.clone().all(fits_f32) {
        Some(ColumnData::Float32(values.map(|v| v as f32).collect()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellValue, FloatWidth, StorageKind};

    fn single(name: &str, data: ColumnData) -> Table {
        Table::new(vec![Column::new(name, data)]).unwrap()
    }

    fn kind_of(table: &Table) -> StorageKind {
        table.columns()[0].kind()
    }

    fn assert_same_values(a: &Table, b: &Table) {
        assert_eq!(a.row_count(), b.row_count());
        assert_eq!(a.labels(), b.labels());
        for row in 0..a.row_count() {
            assert_eq!(a.row(row), b.row(row), "row {} differs", row);
        }
    }

    #[test]
    fn test_int_downcast_to_8_bits() {
        let table = single("n", ColumnData::Int64(vec![-120, 0, 5, 127]));
        let out = optimize(&table).unwrap();

        assert_eq!(kind_of(&out), StorageKind::Int(IntWidth::W8));
        assert_same_values(&table, &out);
    }

    #[test]
    fn test_int_downcast_skips_16_bits_when_too_small() {
        let table = single("n", ColumnData::Int64(vec![0, 40_000]));
        let out = optimize(&table).unwrap();

        assert_eq!(kind_of(&out), StorageKind::Int(IntWidth::W32));
        assert_eq!(out.row(1).unwrap()[0], CellValue::Int(40_000));
    }

    #[test]
    fn test_int_overflow_fails_whole_table() {
        let table = Table::new(vec![
            Column::new("ok", ColumnData::Int64(vec![1, 2])),
            Column::new("big", ColumnData::Int128(vec![0, i64::MAX as i128 + 1])),
        ])
        .unwrap();

        let err = optimize(&table).unwrap_err();
        assert!(matches!(err, SchemaError::IntegerOverflow { ref column, .. } if column == "big"));
    }

    #[test]
    fn test_int128_within_range_downcasts() {
        let table = single("n", ColumnData::Int128(vec![-1, 300]));
        assert_eq!(kind_of(&optimize(&table).unwrap()), StorageKind::Int(IntWidth::W16));
    }

    #[test]
    fn test_categorical_threshold() {
        // 2 distinct out of 5 rows: 2 < 2.5
        let table = single(
            "room",
            ColumnData::text(vec![Some("a"), Some("b"), Some("a"), Some("a"), Some("b")]),
        );
        let out = optimize(&table).unwrap();
        assert_eq!(kind_of(&out), StorageKind::Categorical);
        assert_same_values(&table, &out);

        // 2 distinct out of 4 rows: 2 < 2 is false
        let table = single(
            "room",
            ColumnData::text(vec![Some("a"), Some("b"), Some("a"), Some("b")]),
        );
        assert_eq!(kind_of(&optimize(&table).unwrap()), StorageKind::Text);
    }

    #[test]
    fn test_missing_counts_as_distinct() {
        // "a" and missing: 2 distinct out of 4 rows stays text
        let table = single("c", ColumnData::text(vec![Some("a"), None, Some("a"), None]));
        assert_eq!(kind_of(&optimize(&table).unwrap()), StorageKind::Text);

        // "a" and missing: 2 distinct out of 5 rows converts
        let table = single(
            "c",
            ColumnData::text(vec![Some("a"), None, Some("a"), Some("a"), None]),
        );
        let out = optimize(&table).unwrap();
        assert_eq!(kind_of(&out), StorageKind::Categorical);
        assert_same_values(&table, &out);
    }

    #[test]
    fn test_float_downcast_widths() {
        let half_exact = single("f", ColumnData::Float64(vec![0.5, 2.0, f64::NAN, -3.25]));
        let out = optimize(&half_exact).unwrap();
        assert_eq!(kind_of(&out), StorageKind::Float(FloatWidth::W16));
        assert_same_values(&half_exact, &out);

        let single_exact = single("f", ColumnData::Float64(vec![100_000.0, 1.0 / 1024.0]));
        assert_eq!(
            kind_of(&optimize(&single_exact).unwrap()),
            StorageKind::Float(FloatWidth::W32)
        );

        let needs_double = single("f", ColumnData::Float64(vec![0.1, 1.0]));
        assert_eq!(
            kind_of(&optimize(&needs_double).unwrap()),
            StorageKind::Float(FloatWidth::W64)
        );
    }

    #[test]
    fn test_narrower_float_inputs() {
        let stays_single = single("f", ColumnData::Float32(vec![0.5, 1.0e-7]));
        let out = optimize(&stays_single).unwrap();
        assert_eq!(kind_of(&out), StorageKind::Float(FloatWidth::W32));
        assert_same_values(&stays_single, &out);

        let to_half = single("f", ColumnData::Float32(vec![0.5, -2.0, f32::NAN]));
        let out = optimize(&to_half).unwrap();
        assert_eq!(kind_of(&out), StorageKind::Float(FloatWidth::W16));
        assert_same_values(&to_half, &out);

        let half = single(
            "f",
            ColumnData::Float16(vec![f16::from_f32(1.5), f16::NAN, f16::from_f32(-0.25)]),
        );
        let out = optimize(&half).unwrap();
        assert_eq!(kind_of(&out), StorageKind::Float(FloatWidth::W16));
        assert_same_values(&half, &out);
    }

    #[test]
    fn test_integer_looking_floats() {
        let table = single("beds", ColumnData::Float64(vec![1.0, 2.0, f64::NAN, 4.0]));
        let out = optimize(&table).unwrap();
        assert_eq!(kind_of(&out), StorageKind::Float(FloatWidth::W16));
        assert_same_values(&table, &out);
    }

    #[test]
    fn test_other_kinds_pass_through() {
        let table = single("flag", ColumnData::Bool(vec![Some(true), None]));
        assert_eq!(kind_of(&optimize(&table).unwrap()), StorageKind::Bool);
    }

    #[test]
    fn test_empty_table_keeps_kinds() {
        let table = Table::new(vec![
            Column::new("t", ColumnData::Text(vec![])),
            Column::new("i", ColumnData::Int64(vec![])),
            Column::new("f", ColumnData::Float64(vec![])),
        ])
        .unwrap();

        let out = optimize(&table).unwrap();
        assert_eq!(out.row_count(), 0);
        let kinds: Vec<_> = out.columns().iter().map(Column::kind).collect();
        let original: Vec<_> = table.columns().iter().map(Column::kind).collect();
        assert_eq!(kinds, original);
    }

    #[test]
    fn test_idempotent() {
        let table = Table::new(vec![
            Column::new("id", ColumnData::Int64(vec![1, 2, 3, 4, 70_000])),
            Column::new("price", ColumnData::Float64(vec![10.0, 12.5, 0.1, f64::NAN, 9.0])),
            Column::new(
                "city",
                ColumnData::text(vec![Some("Paris"); 5]),
            ),
            Column::new(
                "name",
                ColumnData::text(vec![Some("a"), Some("b"), Some("c"), None, Some("e")]),
            ),
        ])
        .unwrap();

        let once = optimize(&table).unwrap();
        let twice = optimize(&once).unwrap();

        let kinds = |t: &Table| t.columns().iter().map(Column::kind).collect::<Vec<_>>();
        assert_eq!(kinds(&once), kinds(&twice));
        assert_same_values(&once, &twice);
        assert_same_values(&table, &once);
        assert!(once.memory_usage() < table.memory_usage());
    }
}
