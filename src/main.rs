// porthole - discover open TCP ports and name the services behind them.

use clap::Parser;
use porthole::cli::Cli;
use porthole::{app, logging, output};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Checked before anything touches the network or the filesystem.
    if cli.command.is_none() && cli.target.is_none() {
        eprintln!("{}", Cli::usage());
        return ExitCode::from(1);
    }

    if let Err(e) = logging::init(logging::level_from_verbosity(cli.verbose)) {
        output::print_warning(&e.to_string());
    }

    match app::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(app::fail(&e)),
    }
}
