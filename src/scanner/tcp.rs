//! TCP connect probe.
//!
//! Completes a full handshake against each port using the operating
//! system's socket API and closes the connection immediately. Nothing is
//! sent or read.

use crate::error::{ScanError, ScanResult};
use crate::scanner::traits::{ProbeResult, Prober, DEFAULT_TIMEOUT};
use crate::services::ServiceLookup;
use crate::types::Port;
use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// TCP connect prober.
///
/// Holds the shared service directory so that an open port can be named
/// right away.
pub struct TcpProbe {
    timeout: Duration,
    services: Arc<dyn ServiceLookup>,
}

impl TcpProbe {
    /// Create a new probe.
    ///
    /// # Arguments
    /// * `timeout` - Connection timeout per port
    /// * `services` - Directory consulted for every open port
    pub fn new(timeout: Duration, services: Arc<dyn ServiceLookup>) -> Self {
        Self { timeout, services }
    }

    /// Probe with the default three second timeout.
    pub fn with_default_timeout(services: Arc<dyn ServiceLookup>) -> Self {
        Self::new(DEFAULT_TIMEOUT, services)
    }

    /// Connection timeout applied per port.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Attempt to connect to the target address.
    async fn attempt_connect(&self, addr: SocketAddr) -> ScanResult<TcpStream> {
        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(classify(addr, e)),
            Err(_) => Err(ScanError::Timeout),
        }
    }
}

fn classify(addr: SocketAddr, e: std::io::Error) -> ScanError {
    if e.kind() == std::io::ErrorKind::ConnectionRefused {
        return ScanError::ConnectionRefused;
    }

    let message = e.to_string().to_lowercase();
    if message.contains("host") && message.contains("unreachable") {
        ScanError::HostUnreachable
    } else if message.contains("unreachable") {
        ScanError::NetworkUnreachable(e.to_string())
    } else {
        ScanError::ConnectionFailed {
            target: addr.ip().to_string(),
            port: addr.port(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl Prober for TcpProbe {
    async fn probe(&self, addr: IpAddr, port: Port) -> Option<ProbeResult> {
        let socket = SocketAddr::new(addr, port.as_u16());

        match self.attempt_connect(socket).await {
            Ok(stream) => {
                drop(stream);
                let service = self.services.lookup(port);
                tracing::debug!("{} open ({})", socket, service.as_deref().unwrap_or("?"));
                Some(ProbeResult::new(port, service))
            }
            Err(e) => {
                tracing::trace!("{}: {}", socket, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ServiceDirectory;
    use std::net::Ipv4Addr;
    use tokio::net::TcpListener;

    fn probe_with(directory: ServiceDirectory) -> TcpProbe {
        TcpProbe::new(Duration::from_millis(500), Arc::new(directory))
    }

    #[test]
    fn test_default_timeout() {
        let probe = TcpProbe::with_default_timeout(Arc::new(ServiceDirectory::empty()));
        assert_eq!(probe.timeout(), Duration::from_secs(3));
        assert_eq!(probe_with(ServiceDirectory::empty()).timeout(), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_open_port_is_named() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port_num = listener.local_addr().unwrap().port();
        let probe = probe_with(ServiceDirectory::from([(port_num, "testsvc")]));

        let result = probe
            .probe(IpAddr::V4(Ipv4Addr::LOCALHOST), Port::new(port_num).unwrap())
            .await
            .expect("listener should be open");

        assert_eq!(result.port.as_u16(), port_num);
        assert_eq!(result.service.as_deref(), Some("testsvc"));
    }

    #[tokio::test]
    async fn test_open_port_without_service() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port_num = listener.local_addr().unwrap().port();
        let probe = probe_with(ServiceDirectory::empty());

        let result = probe
            .probe(IpAddr::V4(Ipv4Addr::LOCALHOST), Port::new(port_num).unwrap())
            .await
            .expect("listener should be open");
        assert_eq!(result.service, None);
    }

    #[tokio::test]
    async fn test_closed_port_is_silent() {
        // Grab a free port, then release it so nothing listens there.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port_num = listener.local_addr().unwrap().port();
        drop(listener);

        let probe = probe_with(ServiceDirectory::builtin());
        let result = probe
            .probe(IpAddr::V4(Ipv4Addr::LOCALHOST), Port::new(port_num).unwrap())
            .await;
        assert!(result.is_none());
    }

    #[test]
    fn test_classify_refused() {
        let addr: SocketAddr = "127.0.0.1:1".parse().unwrap();
        let err = std::io::Error::from(std::io::ErrorKind::ConnectionRefused);
        assert!(matches!(classify(addr, err), ScanError::ConnectionRefused));
    }
}
