//! Terminal styling for the run summary

use crate::error::Severity;
use colored::{ColoredString, Colorize};

pub fn script_path(path: &str) -> ColoredString {
    path.cyan().bold()
}

pub fn guid(guid: &str) -> ColoredString {
    guid.dimmed()
}

pub fn figure(value: usize) -> ColoredString {
    value.to_string().white().bold()
}

/// One-glyph marker in front of a diagnostic line
pub fn severity_mark(severity: Severity) -> ColoredString {
    match severity {
        Severity::Error => "✖".red().bold(),
        Severity::Warning => "⚠".yellow(),
        Severity::Info => "ℹ".blue(),
    }
}

/// Fixed-width gauge for a share between 0 and 1
pub fn gauge(share: f64, width: usize) -> String {
    let filled = ((share.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

pub fn rule(width: usize) -> String {
    "━".repeat(width)
}
