//! JSON unused-components report

use super::UsageReport;
use std::io::{self, Write};

/// JSON reporter for machine-readable output
pub struct JsonReporter;

impl JsonReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn write<W: Write>(&self, report: &UsageReport, out: &mut W) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}
