//! Command execution: wires configuration, the scan engine and the display
//! together for each subcommand.

use crate::cli::{Cli, Commands, ImportCommand};
use crate::config::{AppSettings, Paths};
use crate::error::{CliError, CliResult};
use crate::output::{self, ScanReport};
use crate::scanner::{ScanCoordinator, TcpProbe};
use crate::services::{import_csv, ServiceDirectory, ServiceStore};
use crate::types::Target;
use crate::view::{PlainScreen, ScanState, ScanView, TerminalScreen};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;

/// Execute the parsed command line.
pub async fn run(cli: Cli) -> CliResult<()> {
    match (&cli.command, &cli.target) {
        (Some(Commands::Import(cmd)), _) => import(&cli, cmd),
        (None, Some(target)) => scan(&cli, target).await,
        (None, None) => Err(CliError::Usage(Cli::usage())),
    }
}

/// Report a failed command on stderr and return the exit status.
pub fn fail(err: &CliError) -> u8 {
    match err {
        CliError::Usage(usage) => eprintln!("{}", usage),
        other => output::print_error(&other.to_string()),
    }
    err.exit_code()
}

/// Settings file plus command-line overrides.
fn settings(cli: &Cli, paths: Option<&Paths>) -> CliResult<AppSettings> {
    let loaded = AppSettings::load(cli.config.as_deref(), paths)?;
    Ok(cli.apply_overrides(loaded))
}

fn discover_paths() -> Option<Paths> {
    match Paths::discover() {
        Ok(paths) => Some(paths),
        Err(e) => {
            tracing::warn!("{}", e);
            None
        }
    }
}

fn services_path(settings: &AppSettings, paths: Option<&Paths>) -> Option<PathBuf> {
    settings
        .services_path
        .clone()
        .or_else(|| paths.map(Paths::services_file))
}

async fn scan(cli: &Cli, address: &str) -> CliResult<()> {
    let paths = discover_paths();
    let settings = settings(cli, paths.as_ref())?;
    let target = Target::new(address, settings.port_range()?);

    let directory = match services_path(&settings, paths.as_ref()) {
        Some(path) => ServiceDirectory::open(&path),
        None => ServiceDirectory::builtin(),
    };

    let probe = TcpProbe::new(settings.timeout(), Arc::new(directory));
    let probe_timeout = probe.timeout();
    let coordinator = ScanCoordinator::new(probe).with_concurrency(settings.concurrency);

    tracing::debug!(
        "scan of {} with timeout {:?}, concurrency {}",
        target,
        probe_timeout,
        coordinator.concurrency()
    );

    let started_at = Utc::now();

    // Resolved before the display owns the terminal, so a lookup failure is
    // reported on a clean line. The scan then completes with nothing found.
    let addr = match target.resolve().await {
        Ok(addr) => Some(addr),
        Err(e) => {
            output::print_warning(&e.to_string());
            None
        }
    };
    let mut handle = coordinator.run_resolved(addr, target.ports);

    let state: ScanState = if cli.plain {
        ScanView::new(PlainScreen::new())
            .run(handle.events(), PlainScreen::input())
            .await?
    } else {
        let screen = TerminalScreen::init()?;
        ScanView::new(screen)
            .run(handle.events(), TerminalScreen::input())
            .await?
    };

    // Anything still probing after a quit is abandoned here.
    handle.cancel();

    let report = ScanReport::new(&target, started_at, &state);
    if report.is_aborted() {
        output::print_warning("scan aborted, results are partial");
    }

    output::print_report(&report, cli.output)
        .map_err(|e| CliError::Other(format!("failed to write report: {}", e)))
}

fn import(cli: &Cli, cmd: &ImportCommand) -> CliResult<()> {
    let paths = discover_paths();
    let settings = settings(cli, paths.as_ref())?;
    let path = services_path(&settings, paths.as_ref()).ok_or_else(|| {
        CliError::Other("no location for the service store, pass --services".to_string())
    })?;

    let store = ServiceStore::new(&path);
    let summary = import_csv(&cmd.dataset, &store)?;

    output::print_success(&format!(
        "Imported {} service entries into {} ({} rows skipped)",
        summary.imported,
        store.path().display(),
        summary.skipped
    ));

    Ok(())
}
