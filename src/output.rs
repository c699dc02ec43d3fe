//! Output formatting module.
//!
//! Renders the final scan report as plain text, JSON or CSV, plus the
//! styled status messages printed on stderr.

use crate::cli::OutputFormat;
use crate::types::Target;
use crate::view::{FinishReason, ReportLine, ScanState};
use chrono::{DateTime, Utc};
use console::style;
use serde::Serialize;
use std::io::{self, Write};

/// The final report of one scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Address as given on the command line.
    pub target: String,
    /// Scanned range, e.g. `1-65535`.
    pub ports: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Whether every probe finished or the user quit early.
    pub status: FinishReason,
    /// Open ports, ascending.
    pub open_ports: Vec<ReportLine>,
}

impl ScanReport {
    /// Freeze a finished display state into a report.
    pub fn new(target: &Target, started_at: DateTime<Utc>, state: &ScanState) -> Self {
        Self {
            target: target.address.clone(),
            ports: target.ports.to_string(),
            started_at,
            finished_at: Utc::now(),
            status: state.finish_reason().unwrap_or(FinishReason::Aborted),
            open_ports: state.report(),
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.status == FinishReason::Aborted
    }
}

/// Print the report to stdout in the requested format.
pub fn print_report(report: &ScanReport, format: OutputFormat) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, report, format)
}

/// Write the report in the requested format.
pub fn write_report<W: Write>(out: W, report: &ScanReport, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Plain => write_plain(out, report),
        OutputFormat::Json => write_json(out, report),
        OutputFormat::Csv => write_csv(out, report),
    }
}

fn write_plain<W: Write>(mut out: W, report: &ScanReport) -> io::Result<()> {
    for line in &report.open_ports {
        writeln!(out, "{}", line)?;
    }
    out.flush()
}

fn write_json<W: Write>(mut out: W, report: &ScanReport) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut out, report).map_err(io::Error::other)?;
    writeln!(out)
}

fn write_csv<W: Write>(out: W, report: &ScanReport) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["port", "service"])?;
    for line in &report.open_ports {
        wtr.write_record([
            line.port.to_string().as_str(),
            line.service.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()
}

/// Styled `Error:` line for a fatal message.
pub fn error_line(msg: &str) -> String {
    format!("{} {}", style("Error:").red().bold(), msg)
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{}", error_line(msg));
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    eprintln!("{} {}", style("✓").green().bold(), msg);
}
