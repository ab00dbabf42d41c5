//! Comma-separated unused-components report

use super::UsageReport;
use std::io::{self, Write};

/// Header row of the report
pub const HEADER: &str = "Relative Path,GUID";

/// CSV reporter
pub struct CsvReporter;

impl CsvReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn write<W: Write>(&self, report: &UsageReport, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", HEADER)?;
        for entry in &report.unused {
            writeln!(
                out,
                "{},{}",
                escape(&entry.relative_path),
                escape(&entry.guid)
            )?;
        }
        Ok(())
    }
}

impl Default for CsvReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Quote a cell only when it contains a separator, quote or line break
fn escape(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}
