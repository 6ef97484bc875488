//! # mesh-uninject
//!
//! Reverses service-mesh sidecar injection on Kubernetes manifests: the proxy
//! container, the proxy-init container, the identity volume and the mesh's
//! marker annotations and labels are stripped back out of every workload,
//! and a report records what was removed.
//!
//! ## Example
//!
//! ```rust,no_run
//! use mesh_uninject::manifest::{ManifestProcessor, OutputFormat};
//! use mesh_uninject::uninject::Uninjector;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manifest = std::fs::read_to_string("deployment.yaml")?;
//! let uninjector = Uninjector::default();
//! let processed = ManifestProcessor::new(&uninjector, OutputFormat::Yaml).process(&manifest)?;
//! print!("{}", String::from_utf8_lossy(&processed.output(OutputFormat::Yaml)?));
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod manifest;
pub mod uninject;

// Re-export commonly used types and functions
pub use error::{ConfigError, Result, UninjectError};
pub use uninject::{NamingPolicy, Report, Uninjected, Uninjector, WorkloadResource};
use cli::Commands;
use config::types::Config;

/// Run a parsed command. `quiet` suppresses the report on stderr.
pub fn run_command(command: Commands, config: &Config, quiet: bool) -> Result<()> {
    match command {
        Commands::Uninject {
            paths,
            output,
            format,
            report,
            no_color,
        } => handlers::handle_uninject(
            handlers::UninjectOptions {
                paths,
                output,
                format,
                report,
                no_color,
                quiet,
            },
            config,
        ),
        Commands::Policy { json } => handlers::handle_policy(config, json),
    }
}
