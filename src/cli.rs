use crate::manifest::OutputFormat;
use crate::uninject::ReportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mesh-uninject")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Remove injected service-mesh sidecars from Kubernetes manifests")]
#[command(long_about = "Reads Kubernetes manifests and strips the proxy sidecar, the proxy-init container, the identity volume and the mesh's marker annotations and labels back out of every workload, printing the restored manifests.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress logging and the uninjection report; manifests and errors are still printed
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Uninject sidecars from manifest files, directories or stdin
    Uninject {
        /// Manifest files or directories; use `-` for stdin
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,

        /// Write the uninjected manifests to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Manifest output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Report format (written to stderr)
        #[arg(long, value_enum)]
        report: Option<ReportFormat>,

        /// Disable coloured status markers
        #[arg(long)]
        no_color: bool,
    },

    /// Show the effective naming policy
    Policy {
        /// Print as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}
