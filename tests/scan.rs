//! End-to-end scans: coordinator, display state machine and report output.

use async_trait::async_trait;
use futures::stream;
use porthole::cli::OutputFormat;
use porthole::error::ViewResult;
use porthole::output::{write_report, ScanReport};
use porthole::scanner::{ProbeResult, Prober, ScanCoordinator, TcpProbe};
use porthole::services::{ServiceDirectory, ServiceLookup};
use porthole::types::{Port, PortRange, Target};
use porthole::view::{FinishReason, ScanState, ScanView, Screen};
use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

struct NullScreen;

impl Screen for NullScreen {
    fn draw(&mut self, _state: &ScanState) -> ViewResult<()> {
        Ok(())
    }

    fn finish(&mut self) -> ViewResult<()> {
        Ok(())
    }
}

/// Pretends a fixed set of ports is listening and names them like the real
/// probe does.
struct SimulatedHost {
    open: HashSet<u16>,
    services: Arc<dyn ServiceLookup>,
}

#[async_trait]
impl Prober for SimulatedHost {
    async fn probe(&self, _addr: IpAddr, port: Port) -> Option<ProbeResult> {
        tokio::time::sleep(Duration::from_millis(u64::from(port.as_u16() % 7))).await;
        self.open
            .contains(&port.as_u16())
            .then(|| ProbeResult::new(port, self.services.lookup(port)))
    }
}

async fn scan_to_text<P: Prober + 'static>(prober: P, target: Target) -> (ScanState, String) {
    let mut handle = ScanCoordinator::new(prober).run(target.clone());
    let state = ScanView::new(NullScreen)
        .run(handle.events(), stream::pending())
        .await
        .unwrap();

    let report = ScanReport::new(&target, chrono::Utc::now(), &state);
    let mut buf = Vec::new();
    write_report(&mut buf, &report, OutputFormat::Plain).unwrap();
    (state, String::from_utf8(buf).unwrap())
}

#[tokio::test]
async fn ssh_and_http_in_first_hundred_ports() {
    let host = SimulatedHost {
        open: HashSet::from([80, 22]),
        services: Arc::new(ServiceDirectory::from([(22, "ssh"), (80, "http")])),
    };
    let target = Target::new("10.0.0.5", PortRange::from_bounds(1, 100).unwrap());

    let (state, text) = scan_to_text(host, target).await;

    assert_eq!(state.finish_reason(), Some(FinishReason::Completed));
    assert_eq!(text, "22 is open (service: ssh)\n80 is open (service: http)\n");
}

#[tokio::test]
async fn unknown_service_has_no_annotation() {
    let host = SimulatedHost {
        open: HashSet::from([9999]),
        services: Arc::new(ServiceDirectory::from([(22, "ssh")])),
    };
    let target = Target::new("10.0.0.5", PortRange::from_bounds(9990, 10010).unwrap());

    let (_, text) = scan_to_text(host, target).await;
    assert_eq!(text, "9999 is open\n");
}

#[tokio::test]
async fn ports_outside_range_are_never_reported() {
    let host = SimulatedHost {
        open: HashSet::from([5, 50, 500]),
        services: Arc::new(ServiceDirectory::empty()),
    };
    let target = Target::new("10.0.0.5", PortRange::from_bounds(10, 100).unwrap());

    let (state, text) = scan_to_text(host, target).await;
    assert_eq!(state.open_count(), 1);
    assert_eq!(text, "50 is open\n");
}

#[tokio::test]
async fn real_listener_is_found_and_named() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let probe = TcpProbe::new(
        Duration::from_millis(500),
        Arc::new(ServiceDirectory::from([(port, "porthole-test")])),
    );
    let target = Target::new("127.0.0.1", PortRange::from_bounds(port, port).unwrap());

    let (_, text) = scan_to_text(probe, target).await;
    assert_eq!(text, format!("{} is open (service: porthole-test)\n", port));
}

#[tokio::test]
async fn closed_port_never_appears() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let probe = TcpProbe::new(Duration::from_millis(500), Arc::new(ServiceDirectory::builtin()));
    let target = Target::new("127.0.0.1", PortRange::from_bounds(port, port).unwrap());

    let (state, text) = scan_to_text(probe, target).await;
    assert_eq!(state.finish_reason(), Some(FinishReason::Completed));
    assert!(text.is_empty());
}
