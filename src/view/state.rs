//! Display state machine.
//!
//! Two phases: `Scanning` accumulates open ports as results arrive,
//! `Finished` is terminal and only renders. All mutation happens on the
//! single display loop, so the accumulator needs no locking.

use crate::scanner::{ProbeResult, ScanEvent};
use crate::types::Port;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Key shown in the in-progress message.
pub const QUIT_KEY: char = 'q';

/// Everything the state machine reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// An open port reported by the scan engine.
    Probe(ProbeResult),
    /// The scan engine has finished.
    Complete,
    /// The user asked to stop.
    Quit,
}

impl From<ScanEvent> for ViewEvent {
    fn from(event: ScanEvent) -> Self {
        match event {
            ScanEvent::PortOpen(result) => Self::Probe(result),
            ScanEvent::Complete => Self::Complete,
        }
    }
}

/// Why the view stopped scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FinishReason {
    /// Every probe finished.
    Completed,
    /// The user quit before the scan finished.
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Scanning,
    Finished(FinishReason),
}

/// One line of the final report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLine {
    pub port: Port,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.service {
            Some(service) => write!(f, "{} is open (service: {})", self.port, service),
            None => write!(f, "{} is open", self.port),
        }
    }
}

/// Accumulated scan state owned by the display loop.
#[derive(Debug, Clone)]
pub struct ScanState {
    open_ports: HashMap<Port, Option<String>>,
    phase: Phase,
}

impl Default for ScanState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanState {
    pub fn new() -> Self {
        Self {
            open_ports: HashMap::new(),
            phase: Phase::Scanning,
        }
    }

    /// Feed one event through the state machine.
    ///
    /// Returns `true` if this event moved the view into `Finished`. Events
    /// arriving after that are ignored.
    pub fn apply(&mut self, event: ViewEvent) -> bool {
        if self.is_finished() {
            return false;
        }

        match event {
            ViewEvent::Probe(result) => {
                self.open_ports.insert(result.port, result.service);
                false
            }
            ViewEvent::Complete => {
                self.phase = Phase::Finished(FinishReason::Completed);
                true
            }
            ViewEvent::Quit => {
                self.phase = Phase::Finished(FinishReason::Aborted);
                true
            }
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished(_))
    }

    /// Reason the scan stopped, `None` while still scanning.
    pub fn finish_reason(&self) -> Option<FinishReason> {
        match self.phase {
            Phase::Scanning => None,
            Phase::Finished(reason) => Some(reason),
        }
    }

    /// Number of open ports seen so far.
    pub fn open_count(&self) -> usize {
        self.open_ports.len()
    }

    /// Open ports in ascending order.
    pub fn report(&self) -> Vec<ReportLine> {
        let mut lines: Vec<ReportLine> = self
            .open_ports
            .iter()
            .map(|(port, service)| ReportLine {
                port: *port,
                service: service.clone(),
            })
            .collect();
        lines.sort_unstable_by_key(|line| line.port);
        lines
    }

    /// Text for the current phase.
    pub fn render(&self) -> String {
        match self.phase {
            Phase::Scanning => format!("Scanning... Press {} to quit\n", QUIT_KEY),
            Phase::Finished(_) => self
                .report()
                .iter()
                .map(|line| format!("{}\n", line))
                .collect(),
        }
    }
}
