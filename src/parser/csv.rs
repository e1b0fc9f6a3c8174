//! CSV file parser

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::model::{Column, Table};

use super::infer::{infer_column, normalize_missing};
use super::Parser;

/// Parser for CSV files
pub struct CsvParser;

impl Parser for CsvParser {
    fn parse(&self, path: &Path, config: &Config) -> Result<Table> {
        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
            _ => b',',
        };
        parse_reader(BufReader::new(file), delimiter, config)
    }

    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_lowercase().as_str(), "csv" | "tsv" | "txt")
    }
}

/// Read delimited text column by column, then infer each column's kind
pub(crate) fn parse_reader<R: Read>(reader: R, delimiter: u8, config: &Config) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .byte_headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|h| config.encoding.decode(h).trim().to_string())
        .collect();

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    for (line_num, result) in csv_reader.byte_records().enumerate() {
        let record =
            result.with_context(|| format!("Failed to read CSV row {}", line_num + 2))?; // +2 for 1-indexing and header

        // Pad with missing values if row has fewer columns
        for (idx, values) in raw.iter_mut().enumerate() {
            values.push(
                record
                    .get(idx)
                    .and_then(|field| normalize_missing(&config.encoding.decode(field))),
            );
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, values)| {
            let data = infer_column(&name, values, config.is_date_column(&name));
            Column::new(name, data)
        })
        .collect();

    Ok(Table::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TextEncoding;
    use crate::model::{CellValue, FloatWidth, IntWidth, StorageKind};

    fn parse_str(input: &[u8], config: &Config) -> Table {
        parse_reader(input, b',', config).unwrap()
    }

    #[test]
    fn test_parse_listings() {
        let input = b"listing_id,city,price,host_since\n\
                      1,Paris,120.5,2011-12-03\n\
                      2,Rome,,2015-01-20\n\
                      3,Paris,80,\n";
        let config = Config::default().with_parse_dates(vec!["host_since".into()]);
        let table = parse_str(input, &config);

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.labels(), vec!["listing_id", "city", "price", "host_since"]);

        let kinds: Vec<_> = table.columns().iter().map(Column::kind).collect();
        assert_eq!(
            kinds,
            vec![
                StorageKind::Int(IntWidth::W64),
                StorageKind::Text,
                StorageKind::Float(FloatWidth::W64),
                StorageKind::Date,
            ]
        );
        assert_eq!(table.row(1).unwrap()[2], CellValue::Null);
        assert_eq!(table.row(2).unwrap()[3], CellValue::Null);
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = parse_str(b"a,b\n1,x\n2\n", &Config::default());
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.row(1).unwrap()[1], CellValue::Null);
    }

    #[test]
    fn test_latin1_input() {
        let input = b"name\nCaf\xe9 de Flore\n";
        let config = Config::default().with_encoding(TextEncoding::Latin1);
        let table = parse_str(input, &config);

        assert_eq!(table.row(0).unwrap()[0], CellValue::from("Café de Flore"));
    }

    #[test]
    fn test_tab_delimited() {
        let table = parse_reader(&b"a\tb\n1\tx y\n"[..], b'\t', &Config::default()).unwrap();
        assert_eq!(table.labels(), vec!["a", "b"]);
        assert_eq!(table.row(0).unwrap()[1], CellValue::from("x y"));
    }

    #[test]
    fn test_header_only() {
        let table = parse_str(b"a,b\n", &Config::default());
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 2);
    }
}
