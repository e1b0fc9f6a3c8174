//! Load, filter, optimize and relabel a table in one pass

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::model::Table;
use crate::output::{Preview, RunSummary, TableReport};
use crate::parser::ParserFactory;
use crate::transform::{normalize, normalize_strict, optimize};

/// Result of a full run: the final table plus its report
#[derive(Debug)]
pub struct PipelineOutput {
    pub table: Table,
    pub summary: RunSummary,
}

/// Read the configured input file
pub fn load(config: &Config) -> Result<Table> {
    ParserFactory::new()
        .parse(&config.input_file, config)
        .with_context(|| format!("Failed to parse file: {}", config.input_file.display()))
}

/// Keep the rows matching the configured filter, if any
pub fn select(table: Table, config: &Config) -> Result<Table> {
    let Some(filter) = &config.filter else {
        return Ok(table);
    };

    let table = table.filter_eq(&filter.column, &filter.value)?;
    info!(column = %filter.column, value = %filter.value, rows = table.row_count(), "filtered rows");
    Ok(table)
}

/// Apply the configured transformations to a selected table
///
/// Storage is narrowed before labels change so category statistics are
/// computed on the source columns.
pub fn process(mut table: Table, config: &Config) -> Result<Table> {
    if config.optimize {
        let before = table.memory_usage();
        table = optimize(&table)?;
        info!(before, after = table.memory_usage(), "optimized storage");
    }

    if config.normalize {
        table = if config.allow_duplicate_labels {
            normalize(&table)
        } else {
            normalize_strict(&table)?
        };
        info!(columns = table.column_count(), "normalized labels");
    }

    Ok(table)
}

/// Load, select and process the configured input
///
/// The "before" report describes the selected rows, so the reduction only
/// reflects storage narrowing.
pub fn run(config: &Config) -> Result<PipelineOutput> {
    let selected = select(load(config)?, config)?;
    let before = TableReport::from_table(&selected);

    let table = process(selected, config)?;
    let after = TableReport::from_table(&table);

    let mut summary = RunSummary::new(config.input_file.display().to_string(), before, after);
    if config.head > 0 {
        summary = summary.with_preview(Preview::from_table(&table, config.head));
    }

    Ok(PipelineOutput { table, summary })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::error::SchemaError;
    use crate::model::{Column, ColumnData, IntWidth, StorageKind};

    fn listings() -> Table {
        Table::new(vec![
            Column::new("listing_id", ColumnData::Int64(vec![1, 2, 3, 4, 5])),
            Column::new(
                "city",
                ColumnData::text(vec![
                    Some("Paris"),
                    Some("Paris"),
                    Some("Rome"),
                    Some("Paris"),
                    Some("Paris"),
                ]),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_select_then_process() {
        let config = Config::default().with_filter("city", "Paris");
        let selected = select(listings(), &config).unwrap();
        assert_eq!(selected.row_count(), 4);

        let table = process(selected, &config).unwrap();
        assert_eq!(table.labels(), vec!["ListingId", "City"]);
        assert_eq!(table.row_count(), 4);
        assert_eq!(table.columns()[0].kind(), StorageKind::Int(IntWidth::W8));
        assert_eq!(table.columns()[1].kind(), StorageKind::Categorical);
    }

    #[test]
    fn test_select_without_filter_keeps_rows() {
        let table = select(listings(), &Config::default()).unwrap();
        assert_eq!(table.row_count(), 5);
    }

    #[test]
    fn test_run_reports_filtered_table_as_before() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(b"id,city\n1,Paris\n2,Rome\n3,Rome\n4,Rome\n").unwrap();

        let config = Config::new(file.path().to_path_buf())
            .with_filter("city", "Paris")
            .with_optimize(false)
            .with_normalize(false);
        let output = run(&config).unwrap();

        assert_eq!(output.summary.before.rows, 1);
        assert_eq!(output.summary.after.rows, 1);
        assert_eq!(output.summary.before, output.summary.after);
        assert_eq!(output.summary.reduction_percent, 0.0);
    }

    #[test]
    fn test_process_switches() {
        let config = Config::default().with_optimize(false).with_normalize(false);
        let table = process(listings(), &config).unwrap();

        assert_eq!(table.labels(), vec!["listing_id", "city"]);
        assert_eq!(table.columns()[0].kind(), StorageKind::Int(IntWidth::W64));
    }

    #[test]
    fn test_duplicate_labels_rejected_unless_allowed() {
        let table = Table::new(vec![
            Column::new("host_id", ColumnData::Int64(vec![1])),
            Column::new("Host ID", ColumnData::Int64(vec![2])),
        ])
        .unwrap();

        let err = process(table.clone(), &Config::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SchemaError>(),
            Some(SchemaError::DuplicateLabel { .. })
        ));

        let config = Config::default().with_allow_duplicate_labels(true);
        assert_eq!(process(table, &config).unwrap().labels(), vec!["HostId", "HostId"]);
    }
}
