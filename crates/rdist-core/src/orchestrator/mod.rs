//! Redundancy-aware transfer orchestration.
//!
//! An `Orchestrator` owns the host pool, the redundancy ratio, a transfer
//! backend and a reliability tracker. `upload` spreads one file over a random
//! subset of the pool and returns a manifest; `download` fails over between
//! the manifest's successful copies and hands back a verified local file.
//!
//! Each call runs its own bounded group of worker threads, joined before the
//! call returns. The tracker is the only state shared between calls.

mod download;
mod error;
mod sample;
mod upload;
mod verify;

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::backend::TransferBackend;
use crate::config::RdistConfig;
use crate::reliability::ReliabilityTracker;

pub use download::VerifiedFile;
pub use error::{ErrorKind, OrchestratorError};
pub use verify::verify_file;

pub struct Orchestrator {
    hosts: Vec<String>,
    min_redundancy: f64,
    upload_parallelism: Option<usize>,
    download_parallelism: usize,
    backend: Arc<dyn TransferBackend>,
    tracker: Arc<ReliabilityTracker>,
    rng: Mutex<StdRng>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("hosts", &self.hosts)
            .field("min_redundancy", &self.min_redundancy)
            .field("upload_parallelism", &self.upload_parallelism)
            .field("download_parallelism", &self.download_parallelism)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Create an orchestrator over `hosts` with redundancy ratio `min_redundancy` in (0, 1].
    pub fn new(
        hosts: Vec<String>,
        min_redundancy: f64,
        backend: Arc<dyn TransferBackend>,
    ) -> Result<Self, OrchestratorError> {
        if !(min_redundancy > 0.0 && min_redundancy <= 1.0) {
            return Err(OrchestratorError::InvalidArgument(format!(
                "redundancy ratio must be in (0, 1], got {min_redundancy}"
            )));
        }
        Ok(Self {
            hosts,
            min_redundancy,
            upload_parallelism: None,
            download_parallelism: 1,
            backend,
            tracker: Arc::new(ReliabilityTracker::new()),
            rng: Mutex::new(StdRng::from_entropy()),
        })
    }

    /// Create from loaded config (pool, ratio and parallelism limits).
    pub fn from_config(
        cfg: &RdistConfig,
        backend: Arc<dyn TransferBackend>,
    ) -> Result<Self, OrchestratorError> {
        Ok(Self::new(cfg.hosts.clone(), cfg.min_redundancy, backend)?
            .with_upload_parallelism(cfg.upload_parallelism)
            .with_download_parallelism(cfg.download_parallelism))
    }

    /// Seed the host sampler so draws are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Share a reliability tracker with other orchestrators.
    pub fn with_tracker(mut self, tracker: Arc<ReliabilityTracker>) -> Self {
        self.tracker = tracker;
        self
    }

    /// Cap concurrent upload attempts per call (`None` = one worker per drawn host).
    pub fn with_upload_parallelism(mut self, limit: Option<usize>) -> Self {
        self.upload_parallelism = limit.map(|n| n.max(1));
        self
    }

    /// Number of download candidates probed at once (1 = strict failover order).
    pub fn with_download_parallelism(mut self, limit: usize) -> Self {
        self.download_parallelism = limit.max(1);
        self
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    pub fn min_redundancy(&self) -> f64 {
        self.min_redundancy
    }

    pub fn tracker(&self) -> &Arc<ReliabilityTracker> {
        &self.tracker
    }
}

#[cfg(test)]
mod tests;
