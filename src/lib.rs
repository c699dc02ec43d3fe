//! # porthole - concurrent TCP port discovery
//!
//! porthole probes every port of a host with a bounded-timeout TCP connect,
//! names each open port from a service directory, and reports the open
//! ports in ascending order once the scan completes (or the user quits).
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use porthole::scanner::{ScanCoordinator, ScanEvent, TcpProbe};
//! use porthole::services::ServiceDirectory;
//! use porthole::types::{PortRange, Target};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let probe = TcpProbe::with_default_timeout(Arc::new(ServiceDirectory::builtin()));
//!     let target = Target::new("192.168.1.1", PortRange::from_bounds(1, 1024).unwrap());
//!     let mut scan = ScanCoordinator::new(probe).run(target);
//!
//!     while let Some(ScanEvent::PortOpen(result)) = scan.next_event().await {
//!         println!("{} is open", result.port);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - validated ports, ranges and targets
//! - [`services`] - port to service-name directory and its import
//! - [`scanner`] - per-port probes and the coordinator that fans them out
//! - [`view`] - the display state machine and terminal screens
//! - [`config`] - settings file and XDG paths
//! - [`output`] - report formatting
//! - [`error`] - error types

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod scanner;
pub mod services;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use error::{CliError, ScanError};
pub use scanner::{ProbeResult, Prober, ScanCoordinator, ScanEvent, ScanHandle, TcpProbe};
pub use services::{ServiceDirectory, ServiceLookup};
pub use types::{Port, PortRange, Target};
pub use view::{ScanState, ScanView};
