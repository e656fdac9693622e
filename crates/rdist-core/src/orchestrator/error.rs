//! Error type for orchestrator calls.

use std::fmt;
use std::path::PathBuf;

/// Coarse classification of an `OrchestratorError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    TransferFailure,
    NoValidSources,
    UnsupportedFormat,
    IntegrityMismatch,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::TransferFailure => "transfer failure",
            ErrorKind::NoValidSources => "no valid sources",
            ErrorKind::UnsupportedFormat => "unsupported format",
            ErrorKind::IntegrityMismatch => "integrity mismatch",
            ErrorKind::Io => "io",
        };
        f.write_str(s)
    }
}

/// Terminal failure of an upload or download call.
///
/// Individual host failures never surface here on their own; they only
/// become `TransferFailure` once every download candidate has failed.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("manifest has no successful uploads to download from")]
    NoValidSources,
    #[error("unsupported manifest version {0:?}")]
    UnsupportedFormat(String),
    #[error("all {attempted} source(s) failed; last error from {last_host}: {last_error}")]
    TransferFailure {
        attempted: usize,
        last_host: String,
        last_error: String,
    },
    #[error(
        "integrity mismatch for {}: expected {expected_size} bytes / {expected_hash}, got {actual_size} bytes / {}",
        .path.display(),
        .actual_hash.as_deref().unwrap_or("(not hashed)")
    )]
    IntegrityMismatch {
        path: PathBuf,
        expected_size: u64,
        actual_size: u64,
        expected_hash: String,
        actual_hash: Option<String>,
    },
    #[error("failed to move verified file into place at {}: {source}", .path.display())]
    Finalize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl OrchestratorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            OrchestratorError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            OrchestratorError::NoValidSources => ErrorKind::NoValidSources,
            OrchestratorError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            OrchestratorError::TransferFailure { .. } => ErrorKind::TransferFailure,
            OrchestratorError::IntegrityMismatch { .. } => ErrorKind::IntegrityMismatch,
            OrchestratorError::Finalize { .. } | OrchestratorError::Io(_) => ErrorKind::Io,
        }
    }
}
