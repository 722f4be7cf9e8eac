//! Output formatting module.
//!
//! Renders aggregated results as a terminal table and, optionally, writes
//! them to a JSON or CSV document.

mod csv_format;
mod json_format;
mod table;

pub use csv_format::{save_csv, write_csv};
pub use json_format::{save_json, write_json};
pub use table::{print_results, print_scan_header, print_success, print_warning, render_table};

use crate::aggregate::ScanReport;
use crate::error::OutputResult;
use std::path::Path;

/// Format of the saved results document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Indented JSON array of host records
    #[default]
    Json,
    /// CSV, one row per host
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Save the report to `path` in the given format.
pub fn save_results(path: &Path, report: &ScanReport, format: OutputFormat) -> OutputResult<()> {
    match format {
        OutputFormat::Json => save_json(path, report),
        OutputFormat::Csv => save_csv(path, report),
    }
}
