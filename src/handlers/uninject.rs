//! Handler for the `uninject` command.
//!
//! Reads manifests from files, directories or stdin, strips injected sidecars
//! from every workload, writes the manifests to stdout (or a file) and the
//! per-resource report to stderr.

use crate::config::types::Config;
use crate::error::{Result, UninjectError};
use crate::manifest::{ManifestProcessor, OutputFormat, ProcessedManifest};
use crate::uninject::{Report, ReportFormat, Uninjector, format_reports};
use log::{debug, warn};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Path argument that stands for stdin.
pub const STDIN_PATH: &str = "-";

/// Options for the uninject command
#[derive(Debug, Clone)]
pub struct UninjectOptions {
    /// Files, directories, or `-` for stdin
    pub paths: Vec<PathBuf>,
    /// Write manifests here instead of stdout
    pub output: Option<PathBuf>,
    /// Manifest format (overrides config)
    pub format: Option<OutputFormat>,
    /// Report format (overrides config)
    pub report: Option<ReportFormat>,
    /// Disable colour in plain reports
    pub no_color: bool,
    /// Skip the report on stderr
    pub quiet: bool,
}

/// One manifest source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestInput {
    Stdin,
    File(PathBuf),
}

impl ManifestInput {
    fn read(&self) -> Result<String> {
        match self {
            Self::Stdin => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
            Self::File(path) => fs::read_to_string(path).map_err(|source| UninjectError::Input {
                path: path.clone(),
                source,
            }),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Stdin => "<stdin>".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

/// Expand the command-line paths into individual manifest inputs.
///
/// Directories are walked recursively in file-name order, picking up
/// `.yaml`, `.yml` and `.json` files.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<ManifestInput>> {
    let mut inputs = Vec::new();

    for path in paths {
        if path.as_os_str() == STDIN_PATH {
            inputs.push(ManifestInput::Stdin);
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let entry_path = entry.path();
                if entry_path.is_file() && is_manifest_file(entry_path) {
                    inputs.push(ManifestInput::File(entry_path.to_path_buf()));
                }
            }
        } else if path.exists() {
            inputs.push(ManifestInput::File(path.clone()));
        } else {
            return Err(UninjectError::Input {
                path: path.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such file or directory"),
            });
        }
    }

    Ok(inputs)
}

fn is_manifest_file(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str());
    matches!(ext, Some("yaml") | Some("yml") | Some("json"))
}

/// Uninject every input and assemble the results into one manifest.
pub fn uninject_inputs(
    inputs: &[ManifestInput],
    uninjector: &Uninjector,
    format: OutputFormat,
) -> Result<(Vec<u8>, Vec<Report>)> {
    let processor = ManifestProcessor::new(uninjector, format);
    let mut all = ProcessedManifest::default();

    for input in inputs {
        debug!("Reading {}", input.describe());
        let content = input.read()?;
        let processed = processor.process(&content)?;

        if processed.documents.is_empty() {
            warn!("{} contained no documents", input.describe());
            continue;
        }
        all.documents.extend(processed.documents);
        all.reports.extend(processed.reports);
    }

    Ok((all.output(format)?, all.reports))
}

/// Handle the `uninject` command
pub fn handle_uninject(options: UninjectOptions, config: &Config) -> Result<()> {
    let format = options.format.unwrap_or(config.output.format);
    let report_format = options.report.unwrap_or(config.output.report);
    let color = config.output.color && !options.no_color;

    let inputs = collect_inputs(&options.paths)?;
    let uninjector = Uninjector::new(config.naming.clone());
    let (output, reports) = uninject_inputs(&inputs, &uninjector, format)?;

    match &options.output {
        Some(path) => fs::write(path, &output).map_err(|source| UninjectError::Output {
            path: path.clone(),
            source,
        })?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&output)?;
            stdout.flush()?;
        }
    }

    if !options.quiet {
        eprint!("{}", format_reports(&reports, report_format, color));
    }
    Ok(())
}
