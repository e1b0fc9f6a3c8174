//! Plain terminal output

use std::io::Write;

use anyhow::Result;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::memory::format_mb;

use super::{OutputFormatter, Preview, RunSummary, TableReport};

/// Terminal output with box-drawn tables
pub struct TerminalOutput;

impl TerminalOutput {
    pub fn new() -> Self {
        Self
    }

    fn write_header(&self, writer: &mut dyn Write, source: &str) -> Result<()> {
        writeln!(writer, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(writer, " tabslim: {}", source)?;
        writeln!(writer, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
        writeln!(writer)?;
        Ok(())
    }

    fn write_report(&self, title: &str, report: &TableReport, writer: &mut dyn Write) -> Result<()> {
        writeln!(
            writer,
            "{}: {} rows, {} columns",
            title,
            report.rows,
            report.columns.len()
        )?;

        let mut data = vec![vec![
            "#".to_string(),
            "Column".to_string(),
            "Non-Null".to_string(),
            "Kind".to_string(),
            "Memory".to_string(),
        ]];
        for (i, col) in report.columns.iter().enumerate() {
            data.push(vec![
                i.to_string(),
                col.name.clone(),
                col.non_null.to_string(),
                col.kind.clone(),
                format!("{} B", col.memory_bytes),
            ]);
        }

        writeln!(writer, "{}", build_table(data))?;
        writeln!(writer, "memory usage: {}", format_mb(report.memory_bytes as u64))?;
        writeln!(writer)?;
        Ok(())
    }

    fn write_reduction(&self, summary: &RunSummary, writer: &mut dyn Write) -> Result<()> {
        writeln!(
            writer,
            "Memory: {} → {} ({:.1}% saved)",
            format_mb(summary.before.memory_bytes as u64),
            format_mb(summary.after.memory_bytes as u64),
            summary.reduction_percent
        )?;
        writeln!(writer)?;
        Ok(())
    }

    fn write_preview(&self, preview: &Preview, writer: &mut dyn Write) -> Result<()> {
        if preview.rows.is_empty() {
            return Ok(());
        }

        writeln!(writer, "Preview:")?;
        let mut data = vec![preview.labels.clone()];
        data.extend(preview.rows.iter().cloned());
        writeln!(writer, "{}", build_table(data))?;
        Ok(())
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TerminalOutput {
    fn render(&self, summary: &RunSummary, writer: &mut dyn Write) -> Result<()> {
        self.write_header(writer, &summary.source)?;
        self.write_report("Before", &summary.before, writer)?;
        self.write_report("After", &summary.after, writer)?;
        self.write_reduction(summary, writer)?;

        if let Some(preview) = &summary.preview {
            self.write_preview(preview, writer)?;
        }

        Ok(())
    }
}

/// Build a formatted table, first row as header
fn build_table(data: Vec<Vec<String>>) -> String {
    let mut builder = Builder::default();
    for row in data {
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}
