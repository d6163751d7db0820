//! Command-line surface: argument parsing, the run loop invocation, and
//! summary rendering.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use mitosim_core::driver::{Driver, RunOutcome, StopReason};
use mitosim_core::error::MitosimError;
use thiserror::Error;

/// Runs the mitosim Gillespie rewrite simulator over a range of run indices.
///
/// Reads `config_<configSuffix>.txt` from `workingDir`, derives or reuses a
/// per-run seed from the working directory's seed table, and writes periodic
/// and final snapshots back into `workingDir`.
#[derive(Debug, Parser)]
#[command(name = "mitosim", version, about)]
pub struct Cli {
    /// Directory holding the config file, seed table, and snapshot outputs.
    pub working_dir: PathBuf,
    /// Suffix identifying which `config_<suffix>.txt` to read.
    pub config_suffix: String,
    /// First run index to execute (inclusive).
    pub run_ini: u64,
    /// Last run index to execute (inclusive).
    pub run_end: u64,
    /// Non-zero requests a progress line per run in the rendered summary.
    #[arg(default_value_t = 0)]
    pub verbose: u8,
}

/// Errors surfaced to `main`.
#[derive(Debug, Error)]
pub enum CliError {
    /// A core library failure: bad config, bad seed table, or snapshot I/O.
    #[error(transparent)]
    Core(#[from] MitosimError),
}

impl CliError {
    /// The stable machine-readable code for this error, when one exists.
    #[must_use]
    pub fn code(&self) -> mitosim_core::error::MitosimErrorCode {
        match self {
            Self::Core(err) => err.code(),
        }
    }
}

/// Runs every requested run index and returns their outcomes in order.
///
/// # Errors
/// Returns [`CliError`] if the config or seed table cannot be read, or a
/// run's snapshot I/O fails.
pub fn run_cli(cli: Cli) -> Result<Vec<RunOutcome>, CliError> {
    let driver = Driver::new(cli.working_dir.clone(), cli.config_suffix.clone());
    let outcomes = driver.run_range(cli.run_ini, cli.run_end)?;
    Ok(outcomes)
}

/// Writes a one-line-per-run summary to `writer`.
///
/// # Errors
/// Returns an I/O error if `writer` fails to accept a write.
pub fn render_summary(outcomes: &[RunOutcome], writer: &mut impl Write) -> io::Result<()> {
    for outcome in outcomes {
        let reason = match outcome.stopped_because {
            StopReason::TimeBudgetExhausted => "time budget exhausted",
            StopReason::NoActiveReactions => "no active reactions",
        };
        writeln!(
            writer,
            "run {}: {} events, t={:.6}, stopped: {reason}",
            outcome.run_index, outcome.iterations, outcome.final_time
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_summary_writes_one_line_per_run() {
        let outcomes = vec![
            RunOutcome {
                run_index: 0,
                iterations: 3,
                final_time: 1.5,
                stopped_because: StopReason::NoActiveReactions,
            },
            RunOutcome {
                run_index: 1,
                iterations: 9,
                final_time: 100.0,
                stopped_because: StopReason::TimeBudgetExhausted,
            },
        ];

        let mut buf = Vec::new();
        render_summary(&outcomes, &mut buf).unwrap();
        let rendered = String::from_utf8(buf).unwrap();
        assert_eq!(rendered.lines().count(), 2);
        assert!(rendered.contains("run 0: 3 events"));
        assert!(rendered.contains("no active reactions"));
        assert!(rendered.contains("time budget exhausted"));
    }
}
