//! Probe abstraction and the events a scan produces.
//!
//! The [`Prober`] trait lets the coordinator fan out over any connection
//! strategy, which keeps the coordinator testable without a network.

use crate::types::Port;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

/// Default per-port connection timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// An open port discovered by a probe.
///
/// Only open ports are ever reported; closed and filtered ports produce no
/// result at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// The port that accepted a connection.
    pub port: Port,
    /// Registered service name, `None` when unknown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

impl ProbeResult {
    /// Create a result, treating a blank service name as unknown.
    pub fn new(port: Port, service: Option<String>) -> Self {
        let service = service.filter(|name| !name.trim().is_empty());
        Self { port, service }
    }
}

/// Event delivered from the scan engine to the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A probe found an open port.
    PortOpen(ProbeResult),
    /// Every probe has finished; nothing else will arrive.
    Complete,
}

/// A single-port connection strategy.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe `addr:port` once.
    ///
    /// Returns `Some` only when the port is open. Every failure (refused,
    /// timed out, unreachable) is absorbed and reported as `None`.
    async fn probe(&self, addr: IpAddr, port: Port) -> Option<ProbeResult>;
}
