//! Error types for the aggregator.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors produced while decoding a single line of probe output.
///
/// These are always local to the line: the ingestion loop logs them and
/// moves on to the next line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The line was empty after trimming.
    #[error("empty line")]
    Empty,

    /// The line has no whitespace between the sensor id and the payload.
    #[error("no separator between sensor id and payload: {0:?}")]
    MissingSeparator(String),
}

/// Errors that can occur while serving a single report connection.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Writing the report to the peer failed.
    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),

    /// The peer did not take the report within the write timeout.
    #[error("report write timed out after {0:?}")]
    Timeout(Duration),
}

/// Service-level errors.
///
/// Everything except [`ServiceError::ProcessDied`] happens during startup.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Configuration could not be loaded or deserialized.
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration was loaded but is semantically invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The measurement process could not be started.
    #[error("failed to spawn measurement process {path:?}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The measurement process was started without a readable stdout.
    #[error("measurement process has no stdout")]
    MissingStdout,

    /// The report listener could not be bound.
    #[error("failed to bind report listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Reading the measurement stream failed.
    #[error("failed to read measurement stream: {0}")]
    Read(#[source] io::Error),

    /// The measurement stream closed: the process has died.
    #[error("measurement process has died")]
    ProcessDied,
}
