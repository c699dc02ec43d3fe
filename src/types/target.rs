//! Scan target: one host plus the port range to sweep.

use super::port::PortRange;
use crate::error::{ScanError, ScanResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// The host and port range of a single scan.
///
/// Immutable once the scan starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Address as given by the user: IPv4, IPv6 or a hostname.
    pub address: String,
    /// Ports to probe.
    pub ports: PortRange,
}

impl Target {
    /// Create a new target.
    pub fn new(address: impl Into<String>, ports: PortRange) -> Self {
        Self {
            address: address.into(),
            ports,
        }
    }

    /// Resolve the address to a single IP.
    ///
    /// Literal addresses are returned as-is; hostnames go through DNS and the
    /// first answer is used.
    pub async fn resolve(&self) -> ScanResult<IpAddr> {
        let address = self.address.trim();
        let literal = address
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(address);

        if let Ok(ip) = literal.parse::<IpAddr>() {
            return Ok(ip);
        }

        let response = system_resolver()
            .lookup_ip(address)
            .await
            .map_err(|e| ScanError::DnsResolution(format!("{}: {}", address, e)))?;

        response
            .iter()
            .next()
            .ok_or_else(|| ScanError::DnsResolution(format!("{}: no addresses found", address)))
    }
}

/// Resolver configured from the host (resolv.conf and hosts file), so names
/// only internal DNS knows still resolve. Falls back to the default upstream
/// configuration when the system configuration cannot be read.
fn system_resolver() -> TokioAsyncResolver {
    TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
        tracing::debug!("system resolver configuration unavailable: {}", e);
        TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
    })
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.address, self.ports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[tokio::test]
    async fn test_resolve_ipv4_literal() {
        let target = Target::new("127.0.0.1", PortRange::full());
        assert_eq!(
            target.resolve().await.unwrap(),
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        );
    }

    #[tokio::test]
    async fn test_resolve_ipv6_literal() {
        let target = Target::new("::1", PortRange::full());
        assert_eq!(
            target.resolve().await.unwrap(),
            IpAddr::V6(Ipv6Addr::LOCALHOST)
        );

        let bracketed = Target::new("[::1]", PortRange::full());
        assert_eq!(
            bracketed.resolve().await.unwrap(),
            IpAddr::V6(Ipv6Addr::LOCALHOST)
        );
    }

    #[tokio::test]
    async fn test_resolve_localhost_through_system_config() {
        let target = Target::new("localhost", PortRange::full());
        assert!(target.resolve().await.unwrap().is_loopback());
    }

    #[tokio::test]
    async fn test_unknown_host_is_dns_error() {
        let target = Target::new("no-such-host.invalid", PortRange::full());
        assert!(matches!(
            target.resolve().await,
            Err(ScanError::DnsResolution(_))
        ));
    }

    #[test]
    fn test_display() {
        let target = Target::new("example.com", PortRange::from_bounds(1, 100).unwrap());
        assert_eq!(target.to_string(), "example.com [1-100]");
    }
}
