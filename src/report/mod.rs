mod csv;
mod json;
mod style;
mod summary;

pub use csv::{CsvReporter, HEADER as CSV_HEADER};
pub use json::JsonReporter;
pub use summary::SummaryReporter;

use crate::error::{AuditError, Result};
use crate::registry::ComponentRegistry;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Output format for the unused-components report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// `Relative Path,GUID` rows
    #[default]
    Csv,
    /// JSON machine-readable format
    Json,
}

/// One component nothing uses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnusedEntry {
    pub relative_path: String,
    pub guid: String,
}

/// Unused components, one row per declaration, sorted by relative path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsageReport {
    pub unused: Vec<UnusedEntry>,
    /// Number of declared components
    pub total: usize,
}

impl UsageReport {
    /// Reduce the final registry state into report rows
    pub fn from_registry(registry: &ComponentRegistry) -> Self {
        let unused = registry
            .unused()
            .into_iter()
            .map(|record| UnusedEntry {
                relative_path: record.relative_path.clone(),
                guid: record.stable_id.clone(),
            })
            .collect();

        Self {
            unused,
            total: registry.len(),
        }
    }
}

/// Writes the unused-components report into a file
pub struct Reporter {
    format: ReportFormat,
    output_path: PathBuf,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: PathBuf) -> Self {
        Self {
            format,
            output_path,
        }
    }

    /// Report path for a format inside an output folder
    ///
    /// JSON reports swap the configured file's extension for `.json`.
    pub fn path_in(output_dir: &Path, report_file: &str, format: ReportFormat) -> PathBuf {
        let path = output_dir.join(report_file);
        match format {
            ReportFormat::Csv => path,
            ReportFormat::Json => path.with_extension("json"),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn report(&self, report: &UsageReport) -> Result<()> {
        let io_err = |e| AuditError::io(&self.output_path, e);

        let file = File::create(&self.output_path).map_err(io_err)?;
        let mut out = BufWriter::new(file);
        let written = match self.format {
            ReportFormat::Csv => CsvReporter::new().write(report, &mut out),
            ReportFormat::Json => JsonReporter::new().write(report, &mut out),
        };
        written.map_err(io_err)?;
        out.flush().map_err(io_err)
    }
}
