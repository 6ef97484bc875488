use crate::manifest::OutputFormat;
use crate::uninject::{NamingPolicy, ReportFormat};
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reserved names the uninjector matches against
    pub naming: NamingPolicy,
    pub output: OutputConfig,
}

/// Output configuration, used when the matching CLI flags are not given
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Manifest format written to stdout or `--output`
    pub format: OutputFormat,
    /// Report format written to stderr
    pub report: ReportFormat,
    /// Colour status markers in plain reports
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Yaml,
            report: ReportFormat::Plain,
            color: true,
        }
    }
}
