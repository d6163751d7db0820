//! CLI entry point for running the mitosim Gillespie rewrite simulator.
//!
//! Parses command-line arguments with clap, drives the requested run range,
//! renders a summary to stdout, and maps errors to exit codes. Logging is
//! initialized eagerly so subsequent operations can emit structured
//! diagnostics via `tracing`.

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use mitosim_cli::{
    cli::{Cli, CliError, render_summary, run_cli},
    logging::{self, LoggingError},
};
use tracing::error;

/// Parse CLI arguments, run the requested range, render the summary, and
/// flush the output stream.
fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let verbose = cli.verbose != 0;
    let outcomes = run_cli(cli).context("failed to execute run range")?;
    if verbose {
        tracing::info!(runs = outcomes.len(), "run range complete");
    }
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    render_summary(&outcomes, &mut writer).context("failed to render summary")?;
    writer.flush().context("failed to flush output")?;
    Ok(())
}

fn main() -> ExitCode {
    if let Err(err) = logging::init_logging() {
        report_logging_init_error(&err);
        return ExitCode::FAILURE;
    }

    if let Err(err) = try_main() {
        let code = err
            .chain()
            .find_map(|cause| {
                let cause: &(dyn std::error::Error + 'static) = cause;
                cause.downcast_ref::<CliError>().map(CliError::code)
            });

        error!(
            error = %err,
            code = ?code.map(|c| c.as_str()),
            "run failed"
        );
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Emit a fallback diagnostic to stderr when tracing initialization fails.
#[expect(
    clippy::print_stderr,
    reason = "Emit one-off diagnostic before tracing is initialized"
)]
fn report_logging_init_error(err: &LoggingError) {
    eprintln!("failed to initialize logging: {err}");
}
