//! Error type for a single backend call.

use std::time::Duration;

/// Why one upload or download attempt against one host failed.
///
/// These are always recovered by the orchestrator: recorded against the host
/// and folded into redundancy / failover decisions.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// The external program could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// The external program exited unsuccessfully.
    #[error("command '{program}' returned non-zero exit status {code}")]
    Exit { program: String, code: i32 },
    /// The call exceeded the configured timeout and was killed.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    /// The program succeeded but printed nothing usable.
    #[error("no locator in output of {0}")]
    EmptyOutput(String),
    /// Curl reported an error (connect failure, timeout, etc.).
    #[error("curl: {0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// The tool reported a saved file outside the directory it was given.
    #[error("download saved outside {}: {}", .dir.display(), .path.display())]
    OutsideDir {
        path: std::path::PathBuf,
        dir: std::path::PathBuf,
    },
    /// Host or locator is not a usable URL.
    #[error("invalid url {0}")]
    InvalidUrl(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
