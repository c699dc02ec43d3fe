//! Command-line interface definitions for porthole.
//!
//! Uses `clap` derive macros for declarative argument parsing.
//!
//! - `porthole <TARGET>` - scan a host
//! - `porthole import <CSV>` - load the service-name registry

use crate::config::AppSettings;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::fmt;
use std::path::PathBuf;

/// Discover open TCP ports on a host and name the services behind them.
#[derive(Parser, Debug)]
#[command(name = "porthole")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A concurrent TCP port scanner", long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Target IP address (v4 or v6) or hostname to scan
    #[arg(value_name = "TARGET")]
    pub target: Option<String>,

    /// First port to scan
    #[arg(short = 's', long, value_name = "PORT")]
    pub start_port: Option<u16>,

    /// Last port to scan
    #[arg(short = 'e', long, value_name = "PORT")]
    pub end_port: Option<u16>,

    /// Connection timeout in milliseconds
    #[arg(short = 't', long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Maximum number of simultaneous connection attempts (0 = unlimited)
    #[arg(short = 'c', long)]
    pub concurrency: Option<usize>,

    /// Format of the final report
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
    pub output: OutputFormat,

    /// Disable the interactive display (Ctrl+C still aborts)
    #[arg(long)]
    pub plain: bool,

    /// Path to the service store
    #[arg(long, global = true, value_name = "PATH", env = "PORTHOLE_SERVICES")]
    pub services: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom settings file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import service names from a registry CSV into the service store
    Import(ImportCommand),
}

/// Load a service-name registry dataset.
#[derive(Parser, Debug)]
pub struct ImportCommand {
    /// Delimited file with a header row: service name, port number, protocol
    #[arg(value_name = "CSV", default_value = "service-names-port-numbers.csv")]
    pub dataset: PathBuf,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line per open port
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

impl Cli {
    /// Short usage text, shown when no target is given.
    pub fn usage() -> String {
        Cli::command().render_usage().to_string()
    }

    /// Apply command-line overrides on top of loaded settings.
    pub fn apply_overrides(&self, mut settings: AppSettings) -> AppSettings {
        if let Some(start) = self.start_port {
            settings.start_port = start;
        }
        if let Some(end) = self.end_port {
            settings.end_port = end;
        }
        if let Some(timeout) = self.timeout {
            settings.timeout_ms = timeout;
        }
        if let Some(concurrency) = self.concurrency {
            settings.concurrency = concurrency;
        }
        if let Some(services) = &self.services {
            settings.services_path = Some(services.clone());
        }
        settings
    }
}
