//! Support library for the mitosim CLI binary.
//!
//! Re-exports the CLI module so doctests and integration tests can exercise
//! the run loop without forking a subprocess.

pub mod cli;
pub mod logging;
