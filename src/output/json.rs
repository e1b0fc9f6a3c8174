//! JSON output format

use std::io::Write;

use anyhow::Result;

use super::{OutputFormatter, RunSummary};

/// JSON output formatter
pub struct JsonOutput {
    pretty: bool,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonOutput {
    fn render(&self, summary: &RunSummary, writer: &mut dyn Write) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, summary)?;
        } else {
            serde_json::to_writer(&mut *writer, summary)?;
        }
        writeln!(writer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputFormat;
    use crate::output::{fixtures, OutputFactory};
    use serde_json::Value;

    #[test]
    fn test_render_json() {
        let mut buf = Vec::new();
        JsonOutput::compact()
            .render(&fixtures::summary(), &mut buf)
            .unwrap();

        let value: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["source"], "Listings.csv");
        assert_eq!(value["before"]["rows"], 3);
        assert_eq!(value["after"]["columns"][1]["name"], "city");
        assert_eq!(value["after"]["columns"][1]["kind"], "text");
        assert_eq!(value["reduction_percent"], 0.0);
        assert_eq!(value["preview"]["rows"][0][1], "Paris");
        assert_eq!(buf.iter().filter(|&&b| b == b'\n').count(), 1);
    }

    #[test]
    fn test_factory_picks_compact_json() {
        let mut pretty = Vec::new();
        let mut compact = Vec::new();
        OutputFactory::create(OutputFormat::Json, false)
            .render(&fixtures::summary(), &mut pretty)
            .unwrap();
        OutputFactory::create(OutputFormat::Json, true)
            .render(&fixtures::summary(), &mut compact)
            .unwrap();

        assert!(pretty.len() > compact.len());
        let a: Value = serde_json::from_slice(&pretty).unwrap();
        let b: Value = serde_json::from_slice(&compact).unwrap();
        assert_eq!(a, b);
    }
}
