//! Error types for porthole.
//!
//! Uses `thiserror` for ergonomic error definitions. Per-port connection
//! errors never leave the probe; only configuration, directory, display and
//! usage errors reach the process exit path.

use std::path::PathBuf;
use thiserror::Error;

/// Connection-level failures seen by a single probe.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("connection to {target}:{port} failed: {reason}")]
    ConnectionFailed {
        target: String,
        port: u16,
        reason: String,
    },

    #[error("connection timed out")]
    Timeout,

    #[error("connection refused")]
    ConnectionRefused,

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("host unreachable")]
    HostUnreachable,

    #[error("DNS resolution failed: {0}")]
    DnsResolution(String),
}

/// Errors from the service store and the CSV import.
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("failed to read service store {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write service store {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("malformed service store: {0}")]
    InvalidFormat(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset {0} has no header row")]
    MissingHeader(PathBuf),
}

/// Errors from settings and path discovery.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine a home directory for configuration")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings file: {0}")]
    InvalidFormat(String),

    #[error("invalid port range: {0}")]
    InvalidRange(#[from] crate::types::PortError),
}

/// Errors raised by the terminal display.
#[derive(Error, Debug)]
pub enum ViewError {
    #[error("failed to initialise terminal: {0}")]
    Init(std::io::Error),

    #[error("terminal rendering failed: {0}")]
    Render(#[from] std::io::Error),
}

/// Top-level error for command execution.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    View(#[from] ViewError),

    #[error("{0}")]
    Other(String),
}

impl CliError {
    /// Process exit status for this failure. Every fatal error, usage
    /// included, exits with 1.
    pub fn exit_code(&self) -> u8 {
        1
    }
}

/// Result type alias for connect attempts.
pub type ScanResult<T> = Result<T, ScanError>;
/// Result type alias for service store operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;
/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
/// Result type alias for display operations.
pub type ViewResult<T> = Result<T, ViewError>;
/// Result type alias for command execution.
pub type CliResult<T> = Result<T, CliError>;
