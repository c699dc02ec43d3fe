//! Scan engine: fans a probe out over every port of a target and funnels
//! the results into one event stream.
//!
//! Each port gets its own tokio task. Open ports travel over an unbounded
//! channel to a forwarding loop, which relays them as [`ScanEvent`]s and
//! finally emits [`ScanEvent::Complete`]. The result channel closes only
//! once every probe task has dropped its sender, so the completion event is
//! always the last one and always follows every result.

pub mod tcp;
pub mod traits;

pub use tcp::TcpProbe;
pub use traits::{ProbeResult, Prober, ScanEvent, DEFAULT_TIMEOUT};

use crate::types::{Port, PortRange, Target};
use std::future::{self, Future};
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Default ceiling on simultaneous connection attempts.
pub const DEFAULT_CONCURRENCY: usize = 500;

/// Launches probes and produces the event stream for one scan.
pub struct ScanCoordinator<P> {
    prober: Arc<P>,
    concurrency: usize,
}

impl<P: Prober + 'static> ScanCoordinator<P> {
    /// Create a coordinator with the default concurrency ceiling.
    pub fn new(prober: P) -> Self {
        Self {
            prober: Arc::new(prober),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Limit how many probes may hold a connection attempt at once.
    ///
    /// `0` removes the limit: every port's probe connects immediately.
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit;
        self
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Start scanning `target` in the background.
    ///
    /// Must be called from within a tokio runtime. The returned handle yields
    /// at most one [`ScanEvent::PortOpen`] per port followed by exactly one
    /// [`ScanEvent::Complete`]. A target that cannot be resolved scans
    /// nothing and completes immediately.
    pub fn run(&self, target: Target) -> ScanHandle {
        let ports = target.ports;
        self.start(ports, async move {
            match target.resolve().await {
                Ok(addr) => Some(addr),
                Err(e) => {
                    tracing::warn!("{}", e);
                    None
                }
            }
        })
    }

    /// Start scanning an already resolved address.
    ///
    /// `None` stands for a target that failed to resolve: no probe runs and
    /// the handle yields only [`ScanEvent::Complete`].
    pub fn run_resolved(&self, addr: Option<IpAddr>, ports: PortRange) -> ScanHandle {
        self.start(ports, future::ready(addr))
    }

    fn start<F>(&self, ports: PortRange, resolve: F) -> ScanHandle
    where
        F: Future<Output = Option<IpAddr>> + Send + 'static,
    {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let prober = Arc::clone(&self.prober);
        let semaphore = (self.concurrency > 0).then(|| Arc::new(Semaphore::new(self.concurrency)));
        let token = cancel.clone();

        tokio::spawn(async move {
            let (results_tx, results_rx) = mpsc::unbounded_channel();

            if let Some(addr) = resolve.await {
                tracing::info!("scanning {}, {} ports", addr, ports.len());
                for port in ports.iter() {
                    spawn_probe(
                        Arc::clone(&prober),
                        addr,
                        port,
                        semaphore.clone(),
                        results_tx.clone(),
                        token.clone(),
                    );
                }
            }

            // Only the probe tasks hold senders from here on.
            drop(results_tx);
            forward(results_rx, events_tx).await;
        });

        ScanHandle {
            events: events_rx,
            cancel,
        }
    }
}

fn spawn_probe<P: Prober + 'static>(
    prober: Arc<P>,
    addr: IpAddr,
    port: Port,
    semaphore: Option<Arc<Semaphore>>,
    results: UnboundedSender<ProbeResult>,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = async {
                let _permit = match semaphore {
                    Some(sem) => match sem.acquire_owned().await {
                        Ok(permit) => Some(permit),
                        Err(_) => return,
                    },
                    None => None,
                };

                if let Some(result) = prober.probe(addr, port).await {
                    // The forwarder outlives every sender, so this only fails
                    // once the whole scan has been torn down.
                    let _ = results.send(result);
                }
            } => {}
        }
    });
}

/// Relay every probe result, then signal completion.
async fn forward(
    mut results: UnboundedReceiver<ProbeResult>,
    events: UnboundedSender<ScanEvent>,
) {
    let mut open = 0usize;

    while let Some(result) = results.recv().await {
        open += 1;
        if events.send(ScanEvent::PortOpen(result)).is_err() {
            tracing::debug!("display gone, dropping remaining results");
            return;
        }
    }

    tracing::info!("scan complete, {} open ports", open);
    let _ = events.send(ScanEvent::Complete);
}

/// Handle to a running scan.
///
/// Dropping the handle cancels any probes still in flight.
pub struct ScanHandle {
    events: UnboundedReceiver<ScanEvent>,
    cancel: CancellationToken,
}

impl ScanHandle {
    /// Wait for the next event. `None` once the engine has shut down.
    pub async fn next_event(&mut self) -> Option<ScanEvent> {
        self.events.recv().await
    }

    /// Direct access to the event receiver, for use in `select!` loops.
    pub fn events(&mut self) -> &mut UnboundedReceiver<ScanEvent> {
        &mut self.events
    }

    /// Abandon the scan. Probes still waiting or connecting stop without
    /// reporting.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for ScanHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
