//! Summary reporter - statistics and diagnostics overview

use crate::analysis::Analysis;
use crate::error::Severity;
use crate::report::style;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Terminal summary of an analysis run
pub struct SummaryReporter {
    /// Width of bar charts
    bar_width: usize,
    /// Maximum number of unused components listed
    top_n: usize,
    /// Base path to strip from file paths for shorter display
    base_path: Option<PathBuf>,
}

impl SummaryReporter {
    pub fn new() -> Self {
        Self {
            bar_width: 20,
            top_n: 10,
            base_path: None,
        }
    }

    pub fn with_top_n(mut self, n: usize) -> Self {
        self.top_n = n;
        self
    }

    pub fn with_base_path(mut self, path: PathBuf) -> Self {
        self.base_path = Some(path);
        self
    }

    fn format_path(&self, path: &Path) -> String {
        match &self.base_path {
            Some(base) => path.strip_prefix(base).unwrap_or(path).display().to_string(),
            None => path.display().to_string(),
        }
    }

    pub fn report(&self, analysis: &Analysis) {
        println!();
        println!("{}", "SceneSweep Analysis Summary".cyan().bold());
        println!("{}", style::rule(50));
        println!();

        self.print_basic_stats(analysis);
        println!();

        self.print_unused(analysis);
        self.print_diagnostics(analysis);
    }

    fn print_basic_stats(&self, analysis: &Analysis) {
        let label_width = 22;
        let scenes = analysis
            .documents
            .iter()
            .filter(|d| d.dump_requested)
            .count();

        let rows = [
            ("Scenes dumped:", analysis.dumps_written()),
            ("Dumps failed:", analysis.dumps_failed()),
            ("Documents swept:", analysis.documents.len()),
            ("Scripts scanned:", analysis.scripts_scanned),
            ("Components declared:", analysis.registry.len()),
            ("Components unused:", analysis.unused().len()),
        ];

        for (label, value) in rows {
            println!(
                "{:>width$}  {}",
                label.dimmed(),
                style::figure(value),
                width = label_width
            );
        }

        if scenes > 0 {
            let share = analysis.dumps_written() as f64 / scenes as f64;
            println!(
                "{:>width$}  {} {:>5.1}%",
                "Dump coverage:".dimmed(),
                style::gauge(share, self.bar_width).green(),
                share * 100.0,
                width = label_width
            );
        }
    }

    fn print_unused(&self, analysis: &Analysis) {
        let unused = analysis.unused();
        if unused.is_empty() {
            println!("{}", "No unused components found!".green().bold());
            return;
        }

        println!("{}", "Unused components:".white().bold());
        for record in unused.iter().take(self.top_n) {
            println!(
                "  {} {} {}",
                "○".dimmed(),
                style::script_path(&record.relative_path),
                style::guid(&record.stable_id)
            );
        }
        if unused.len() > self.top_n {
            println!("  ... and {} more", unused.len() - self.top_n);
        }
        println!();
    }

    fn print_diagnostics(&self, analysis: &Analysis) {
        let diagnostics: Vec<_> = analysis.all_diagnostics().collect();
        if diagnostics.is_empty() {
            return;
        }

        println!(
            "{} ({})",
            "Diagnostics:".white().bold(),
            diagnostics.len()
        );
        for diagnostic in diagnostics {
            println!(
                "  {} {}",
                style::severity_mark(diagnostic.severity()),
                diagnostic
            );
        }
        println!();

        for document in analysis.documents.iter().filter(|d| d.dump_failed()) {
            let reason = document
                .hierarchy_error()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "not written".to_string());
            println!(
                "  {} no dump for {}: {}",
                style::severity_mark(Severity::Error),
                self.format_path(&document.path),
                reason.dimmed()
            );
        }
    }
}

impl Default for SummaryReporter {
    fn default() -> Self {
        Self::new()
    }
}
