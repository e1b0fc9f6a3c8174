//! Column kind inference for text-based sources

use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::model::ColumnData;

/// Field contents treated as missing
const MISSING_MARKERS: [&str; 7] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL"];

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// `None` for missing markers, the trimmed field otherwise
pub(crate) fn normalize_missing(field: &str) -> Option<String> {
    let trimmed = field.trim();
    if MISSING_MARKERS.contains(&trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Choose the narrowest-meaning kind every value fits
///
/// Integers without gaps become 64-bit (or 128-bit on overflow), numbers
/// with gaps become floats with NaN, `true`/`false` become booleans, and
/// everything else stays text. Date parsing only applies when requested.
pub(crate) fn infer_column(name: &str, values: Vec<Option<String>>, as_date: bool) -> ColumnData {
    if as_date {
        if let Some(data) = parse_dates(&values) {
            return data;
        }
        warn!(column = name, "values are not dates, keeping text");
        return ColumnData::Text(values);
    }

    if values.is_empty() {
        return ColumnData::Text(values);
    }

    let present = || values.iter().flatten();

    if values.iter().all(Option::is_some) {
        if let Some(ints) = present().map(|s| s.parse::<i128>().ok()).collect::<Option<Vec<_>>>() {
            if ints.iter().all(|&v| i64::try_from(v).is_ok()) {
                return ColumnData::Int64(ints.into_iter().map(|v| v as i64).collect());
            }
            return ColumnData::Int128(ints);
        }
    }

    if present().next().is_some() && present().all(|s| s.parse::<f64>().is_ok()) {
        return ColumnData::Float64(
            values
                .iter()
                .map(|v| {
                    v.as_deref()
                        .and_then(|s| s.parse::<f64>().ok())
                        .unwrap_or(f64::NAN)
                })
                .collect(),
        );
    }

    if present().next().is_some() && present().all(|s| parse_bool(s).is_some()) {
        return ColumnData::Bool(
            values
                .iter()
                .map(|v| v.as_deref().and_then(parse_bool))
                .collect(),
        );
    }

    ColumnData::Text(values)
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

fn parse_dates(values: &[Option<String>]) -> Option<ColumnData> {
    let dates: Option<Vec<Option<NaiveDate>>> = values
        .iter()
        .map(|v| match v {
            Some(s) => NaiveDate::parse_from_str(s, DATE_FORMAT).ok().map(Some),
            None => Some(None),
        })
        .collect();
    if let Some(dates) = dates {
        return Some(ColumnData::Date(dates));
    }

    let datetimes: Option<Vec<Option<NaiveDateTime>>> = values
        .iter()
        .map(|v| match v {
            Some(s) => parse_datetime(s).map(Some),
            None => Some(None),
        })
        .collect();
    datetimes.map(ColumnData::DateTime)
}
