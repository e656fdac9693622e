//! Transfer backends: the blocking I/O that moves a file to or from one host.
//!
//! The orchestrator only sees the `TransferBackend` trait. Implementations
//! must bound every call with their own timeout; the orchestrator never
//! cancels an attempt once it has started.

mod command;
mod error;
mod http;
mod output;
mod plowshare;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{BackendKind, RdistConfig};

pub use error::TransferError;
pub use http::HttpBackend;
pub use output::last_token;
pub use plowshare::PlowshareBackend;

/// One-host upload/download primitive.
///
/// Calls are synchronous and may block for as long as the backend's timeout.
pub trait TransferBackend: Send + Sync {
    /// Upload `file` to `host` and return the retrieval locator. Must not modify `file`.
    fn upload(&self, file: &Path, host: &str) -> Result<String, TransferError>;

    /// Download `locator` into `dest_dir` and return the path of the file
    /// written there, which must lie inside `dest_dir`. The caller decides the
    /// final name.
    ///
    /// The returned file is unverified and may carry any name, including the
    /// remote one (plowdown's `--temp-rename` only hides it while the transfer
    /// runs). The orchestrator therefore passes a fresh hidden scratch
    /// directory per attempt and removes it afterwards; only a verified copy
    /// is renamed out of it.
    fn download(&self, locator: &str, dest_dir: &Path) -> Result<PathBuf, TransferError>;
}

/// Build the backend selected in config.
pub fn from_config(cfg: &RdistConfig) -> Arc<dyn TransferBackend> {
    match cfg.backend.kind {
        BackendKind::Plowshare => Arc::new(PlowshareBackend::from_config(&cfg.backend)),
        BackendKind::Http => Arc::new(HttpBackend::from_config(&cfg.backend)),
    }
}
