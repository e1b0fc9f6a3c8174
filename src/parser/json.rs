//! JSON array parser

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{bail, Context, Result};
use indexmap::IndexSet;
use serde_json::Value;

use crate::config::Config;
use crate::model::{Column, Table};

use super::infer::{infer_column, normalize_missing};
use super::Parser;

/// Parser for JSON array files
pub struct JsonParser;

impl Parser for JsonParser {
    fn parse(&self, path: &Path, config: &Config) -> Result<Table> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open JSON file: {}", path.display()))?;
        let reader = BufReader::new(file);

        let value: Value =
            serde_json::from_reader(reader).context("Failed to parse JSON file")?;

        parse_value(value, config)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "json")
    }
}

fn parse_value(value: Value, config: &Config) -> Result<Table> {
    // Handle both arrays and single objects
    let array = match value {
        Value::Array(arr) => arr,
        Value::Object(_) => vec![value],
        _ => bail!("JSON must be an array or object"),
    };

    // Collect all unique keys across all objects to build column list
    let mut column_names: IndexSet<String> = IndexSet::new();
    for item in &array {
        match item {
            Value::Object(obj) => {
                for key in obj.keys() {
                    column_names.insert(key.clone());
                }
            }
            _ => bail!("JSON array items must be objects"),
        }
    }

    let columns = column_names
        .iter()
        .map(|name| {
            let values = array
                .iter()
                .map(|item| item.get(name).and_then(json_value_to_text))
                .collect();
            Column::new(
                name.clone(),
                infer_column(name, values, config.is_date_column(name)),
            )
        })
        .collect();

    Ok(Table::new(columns)?)
}

/// Textual form of a JSON value, `None` for null and missing markers
fn json_value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => normalize_missing(s),
        // Serialize nested values back to JSON text
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}
