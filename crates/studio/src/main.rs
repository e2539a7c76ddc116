mod app;
mod cli;

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use crate::cli::Cli;

fn main() -> ExitCode {
    app::init_tracing();
    let cli = Cli::parse();

    if let Err(err) = app::run(cli) {
        error!(error = %err, "startup_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
