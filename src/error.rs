//! Error types for portsweep.
//!
//! Uses `thiserror` for ergonomic error definitions. Per-entry parse
//! problems live next to their parsers ([`crate::types::TargetError`],
//! [`crate::types::PortError`]) and are reported, not raised.

use std::path::PathBuf;
use thiserror::Error;

/// Why a single probe did not find an open port.
///
/// The engine treats every variant the same way ("not open"); the
/// distinction only shows up in trace logs.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Connection timed out")]
    Timeout,

    #[error("Connection refused")]
    ConnectionRefused,

    #[error("Connection to {target}:{port} failed: {reason}")]
    ConnectionFailed {
        target: String,
        port: u16,
        reason: String,
    },
}

/// Result type alias for probe operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors loading or saving application settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine a configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid settings file: {0}")]
    InvalidFormat(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors writing a report document.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type OutputResult<T> = Result<T, OutputError>;

/// Fatal errors for the command-line front end.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("no targets specified; use --target or --file")]
    NoTargetsGiven,

    #[error("no valid targets resolved from the given specifications")]
    NoTargetsResolved,

    #[error("failed to read target file {path}: {source}")]
    TargetFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;
