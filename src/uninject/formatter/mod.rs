//! Output formatters for uninjection reports.

pub mod json;
pub mod plain;

use crate::uninject::report::Report;
use serde::{Deserialize, Serialize};

/// Report output options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// One status line per resource.
    #[default]
    Plain,
    /// Machine-readable JSON.
    Json,
}

/// Format reports to a string.
pub fn format_reports(reports: &[Report], format: ReportFormat, color: bool) -> String {
    match format {
        ReportFormat::Plain => plain::format(reports, color),
        ReportFormat::Json => json::format(reports),
    }
}
