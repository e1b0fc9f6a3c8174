//! Parquet file parser

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, ArrowPrimitiveType, AsArray};
use arrow::compute::{cast, concat_batches};
use arrow::datatypes::{
    DataType as ArrowType, Date32Type, Float16Type, Float32Type, Float64Type, Int16Type,
    Int32Type, Int64Type, Int8Type, TimeUnit, TimestampMicrosecondType, UInt16Type, UInt32Type,
    UInt64Type, UInt8Type,
};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use chrono::{DateTime, NaiveDate, Utc};
use half::f16;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::config::Config;
use crate::model::{Categorical, Column, ColumnData, Table};

use super::Parser;

/// Days between 0001-01-01 and the Unix epoch
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Parser for Parquet files
pub struct ParquetParser;

impl Parser for ParquetParser {
    fn parse(&self, path: &Path, _config: &Config) -> Result<Table> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open Parquet file: {}", path.display()))?;

        let builder = ParquetRecordBatchReaderBuilder::try_new(file)
            .context("Failed to create Parquet reader")?;

        let schema = builder.schema().clone();
        let reader = builder.build().context("Failed to build Parquet reader")?;

        let batches = reader
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read Parquet batch")?;
        let batch = concat_batches(&schema, &batches).context("Failed to combine Parquet batches")?;
        drop(batches);

        let columns = schema
            .fields()
            .iter()
            .zip(batch.columns())
            .map(|(field, array)| {
                let data = convert_array(array)
                    .with_context(|| format!("Failed to convert column: {}", field.name()))?;
                Ok(Column::new(field.name().clone(), data))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Table::new(columns)?)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "parquet" | "pq")
    }
}

/// Map an arrow array onto the closest storage kind
///
/// Integers with nulls become floats with NaN, unsigned integers widen to
/// the next signed width, and dictionary-encoded strings stay categorical.
fn convert_array(array: &ArrayRef) -> Result<ColumnData> {
    let data = match array.data_type() {
        dt if dt.is_integer() && array.null_count() > 0 => {
            let floats = cast(array, &ArrowType::Float64)?;
            ColumnData::Float64(nan_filled::<Float64Type>(&floats, f64::NAN))
        }
        ArrowType::Int8 => ColumnData::Int8(values::<Int8Type>(array)),
        ArrowType::Int16 => ColumnData::Int16(values::<Int16Type>(array)),
        ArrowType::Int32 => ColumnData::Int32(values::<Int32Type>(array)),
        ArrowType::Int64 => ColumnData::Int64(values::<Int64Type>(array)),
        ArrowType::UInt8 => ColumnData::Int16(widen::<UInt8Type, i16>(array)),
        ArrowType::UInt16 => ColumnData::Int32(widen::<UInt16Type, i32>(array)),
        ArrowType::UInt32 => ColumnData::Int64(widen::<UInt32Type, i64>(array)),
        ArrowType::UInt64 => ColumnData::Int128(widen::<UInt64Type, i128>(array)),
        ArrowType::Float16 => ColumnData::Float16(nan_filled::<Float16Type>(array, f16::NAN)),
        ArrowType::Float32 => ColumnData::Float32(nan_filled::<Float32Type>(array, f32::NAN)),
        ArrowType::Float64 => ColumnData::Float64(nan_filled::<Float64Type>(array, f64::NAN)),
        ArrowType::Boolean => ColumnData::Bool(array.as_boolean().iter().collect()),
        ArrowType::Utf8 => ColumnData::text(array.as_string::<i32>().iter()),
        ArrowType::LargeUtf8 => ColumnData::text(array.as_string::<i64>().iter()),
        ArrowType::Dictionary(_, value)
            if matches!(value.as_ref(), ArrowType::Utf8 | ArrowType::LargeUtf8) =>
        {
            let strings = cast(array, &ArrowType::Utf8)?;
            ColumnData::Categorical(Categorical::encode(strings.as_string::<i32>().iter()))
        }
        ArrowType::Date32 | ArrowType::Date64 => {
            let days = cast(array, &ArrowType::Date32)?;
            ColumnData::Date(
                days.as_primitive::<Date32Type>()
                    .iter()
                    .map(|d| {
                        d.and_then(|d| {
                            NaiveDate::from_num_days_from_ce_opt(d + UNIX_EPOCH_DAYS_FROM_CE)
                        })
                    })
                    .collect(),
            )
        }
        ArrowType::Timestamp(_, _) => {
            let micros = cast(array, &ArrowType::Timestamp(TimeUnit::Microsecond, None))?;
            ColumnData::DateTime(
                micros
                    .as_primitive::<TimestampMicrosecondType>()
                    .iter()
                    .map(|m| {
                        m.and_then(DateTime::<Utc>::from_timestamp_micros)
                            .map(|dt| dt.naive_utc())
                    })
                    .collect(),
            )
        }
        _ => {
            // Fallback: render as text
            let formatter = ArrayFormatter::try_new(array.as_ref(), &FormatOptions::default())?;
            ColumnData::Text(
                (0..array.len())
                    .map(|i| (!array.is_null(i)).then(|| formatter.value(i).to_string()))
                    .collect(),
            )
        }
    };

    Ok(data)
}

fn values<T: ArrowPrimitiveType>(array: &ArrayRef) -> Vec<T::Native> {
    array.as_primitive::<T>().values().to_vec()
}

fn widen<T, W>(array: &ArrayRef) -> Vec<W>
where
    T: ArrowPrimitiveType,
    W: From<T::Native>,
{
    array
        .as_primitive::<T>()
        .values()
        .iter()
        .map(|&v| W::from(v))
        .collect()
}

fn nan_filled<T: ArrowPrimitiveType>(array: &ArrayRef, nan: T::Native) -> Vec<T::Native> {
    array
        .as_primitive::<T>()
        .iter()
        .map(|v| v.unwrap_or(nan))
        .collect()
}
