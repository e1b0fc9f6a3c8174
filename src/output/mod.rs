//! Output formatting for table reports

mod json;
mod terminal;

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::config::{Config, OutputFormat};
use crate::model::Table;

pub use json::JsonOutput;
pub use terminal::TerminalOutput;

/// One column's line in a table report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnReport {
    pub name: String,
    pub kind: String,
    pub non_null: usize,
    pub memory_bytes: usize,
}

/// Shape, kinds and deep memory usage of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub rows: usize,
    pub columns: Vec<ColumnReport>,
    pub memory_bytes: usize,
}

impl TableReport {
    /// Capture a report of the table as it is now
    pub fn from_table(table: &Table) -> Self {
        let columns = table
            .columns()
            .iter()
            .map(|c| ColumnReport {
                name: c.name.clone(),
                kind: c.kind().to_string(),
                non_null: c.non_null_count(),
                memory_bytes: c.memory_usage(),
            })
            .collect();

        Self {
            rows: table.row_count(),
            columns,
            memory_bytes: table.memory_usage(),
        }
    }
}

/// First rows of the final table, rendered as text
#[derive(Debug, Clone, Default, Serialize)]
pub struct Preview {
    pub labels: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Preview {
    pub fn from_table(table: &Table, rows: usize) -> Self {
        Self {
            labels: table.labels().into_iter().map(str::to_string).collect(),
            rows: table
                .head(rows)
                .into_iter()
                .map(|row| row.iter().map(|c| c.display().into_owned()).collect())
                .collect(),
        }
    }
}

/// Everything a run reports: the table before and after processing
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub source: String,
    pub before: TableReport,
    pub after: TableReport,
    pub reduction_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<Preview>,
}

impl RunSummary {
    pub fn new(source: impl Into<String>, before: TableReport, after: TableReport) -> Self {
        let reduction_percent = reduction_percent(before.memory_bytes, after.memory_bytes);
        Self {
            source: source.into(),
            before,
            after,
            reduction_percent,
            preview: None,
        }
    }

    pub fn with_preview(mut self, preview: Preview) -> Self {
        self.preview = Some(preview);
        self
    }
}

/// Share of `before` saved by shrinking to `after`, in percent
pub fn reduction_percent(before: usize, after: usize) -> f64 {
    if before == 0 {
        0.0
    } else {
        (before as f64 - after as f64) / before as f64 * 100.0
    }
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Render a run summary to a writer
    fn render(&self, summary: &RunSummary, writer: &mut dyn Write) -> Result<()>;
}

/// Factory for creating output formatters
pub struct OutputFactory;

impl OutputFactory {
    /// Create an output formatter based on format type
    pub fn create(format: OutputFormat, compact: bool) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Terminal => Box::new(TerminalOutput::new()),
            OutputFormat::Json if compact => Box::new(JsonOutput::compact()),
            OutputFormat::Json => Box::new(JsonOutput::new()),
        }
    }
}

/// Render a run summary to stdout in the configured format
pub fn render_to_stdout(summary: &RunSummary, config: &Config) -> Result<()> {
    let formatter = OutputFactory::create(config.output_format, config.compact);
    let mut stdout = std::io::stdout();
    formatter.render(summary, &mut stdout)
}
