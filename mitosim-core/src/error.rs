//! Error types for the mitosim core library.
//!
//! Two grades of failure exist. Recoverable failures — bad configuration,
//! a seed table that cannot be read, a snapshot write that fails — are
//! [`MitosimError`] values threaded back to the driver. Programming-contract
//! violations inside a rewrite (an unexpected neighbour pattern, a
//! precondition the caller should have upheld) are never expected in a
//! well-formed run; [`contract_violation`] logs the offending state and
//! aborts the process rather than returning a value a caller might ignore.

use std::fmt;

use thiserror::Error;

/// Stable codes describing [`MitosimError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum MitosimErrorCode {
    /// The configuration file could not be read or parsed.
    InvalidConfig,
    /// The seed table could not be read.
    InvalidSeedTable,
    /// A snapshot write failed.
    SnapshotIo,
}

impl MitosimErrorCode {
    /// Return the stable machine-readable representation of this error code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidConfig => "MITOSIM_INVALID_CONFIG",
            Self::InvalidSeedTable => "MITOSIM_INVALID_SEED_TABLE",
            Self::SnapshotIo => "MITOSIM_SNAPSHOT_IO",
        }
    }
}

impl fmt::Display for MitosimErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recoverable errors surfaced by the driver.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum MitosimError {
    /// The configuration file was missing a required key, had an
    /// out-of-range value, or could not be read.
    #[error("invalid configuration `{key}`: {reason}")]
    InvalidConfig {
        /// Offending configuration key.
        key: String,
        /// Human-readable explanation.
        reason: String,
    },
    /// The seed table could not be read or written.
    #[error("seed table error: {reason}")]
    InvalidSeedTable {
        /// Human-readable explanation.
        reason: String,
    },
    /// Reading or writing a configuration, seed, or snapshot file failed.
    #[error("I/O failure on `{path}`: {source}")]
    Io {
        /// Path of the file involved.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl MitosimError {
    /// Retrieve the stable [`MitosimErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> MitosimErrorCode {
        match self {
            Self::InvalidConfig { .. } => MitosimErrorCode::InvalidConfig,
            Self::InvalidSeedTable { .. } => MitosimErrorCode::InvalidSeedTable,
            Self::Io { .. } => MitosimErrorCode::SnapshotIo,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, MitosimError>;

/// A programming-contract violation: an unexpected graph shape that the
/// caller's precondition should have ruled out.
///
/// These never occur in a well-formed run. [`contract_violation`] logs the
/// offending state at `error` level and then panics, matching the source's
/// `msgr.exit(...)` semantics: propagating a `Result` here would only give a
/// caller the option of ignoring a corrupted graph.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("contract violation: {0}")]
pub struct ContractViolation(pub String);

/// Logs `message` at `error` level and aborts the process.
///
/// # Panics
/// Always panics, after emitting a `tracing::error!` record so the
/// offending configuration is visible in structured logs before the
/// process unwinds.
#[track_caller]
pub fn contract_violation(message: impl Into<String>) -> ! {
    let message = message.into();
    tracing::error!(violation = %message, "contract violation");
    panic!("contract violation: {message}");
}
