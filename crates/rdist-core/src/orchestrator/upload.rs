//! Upload side: draw, rank, dispatch, stop at the redundancy ratio.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::checksum;
use crate::manifest::{FailureReason, Manifest, UploadResult};

use super::sample::draw_hosts;
use super::{Orchestrator, OrchestratorError};

/// True once `successes / count` has reached `ratio`.
pub(super) fn redundancy_met(successes: usize, count: usize, ratio: f64) -> bool {
    count > 0 && successes as f64 / count as f64 >= ratio
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl Orchestrator {
    /// Upload `file` to `count` hosts drawn at random from the pool.
    ///
    /// Host failures never fail the call: the manifest lists every drawn host,
    /// successful or not, and may contain zero successes. Fails only when
    /// `count` is 0 or larger than the pool, or `file` is not a readable
    /// regular file; in those cases no backend call is made.
    pub fn upload(&self, file: &Path, count: usize) -> Result<Manifest, OrchestratorError> {
        if count == 0 {
            return Err(OrchestratorError::InvalidArgument(
                "host count must be at least 1".to_string(),
            ));
        }
        if count > self.hosts.len() {
            return Err(OrchestratorError::InvalidArgument(format!(
                "requested {} hosts but the pool only has {}",
                count,
                self.hosts.len()
            )));
        }
        let meta = std::fs::metadata(file).map_err(|e| {
            OrchestratorError::InvalidArgument(format!("{}: {}", file.display(), e))
        })?;
        if !meta.is_file() {
            return Err(OrchestratorError::InvalidArgument(format!(
                "{} is not a regular file",
                file.display()
            )));
        }
        let digest = checksum::digest_path(file)
            .map_err(|e| OrchestratorError::InvalidArgument(format!("{:#}", e)))?;

        let drawn = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            draw_hosts(&self.hosts, count, &mut *rng)
        };
        let ranked = self.tracker.rank(&drawn);
        tracing::info!(
            "uploading {} ({} bytes, sha256 {}) to {} host(s): {:?}",
            file.display(),
            digest.size,
            digest.sha256,
            count,
            ranked
        );

        let uploads = self.dispatch_uploads(file, &ranked);
        let manifest = Manifest::new(unix_now(), digest.size, digest.sha256, uploads);

        let successes = manifest.success_count();
        if redundancy_met(successes, count, self.min_redundancy) {
            tracing::info!(
                "upload of {} reached {}/{} copies (ratio {:.2} >= {:.2})",
                file.display(),
                successes,
                count,
                manifest.success_ratio(),
                self.min_redundancy
            );
        } else {
            tracing::warn!(
                "upload of {} only reached {}/{} copies (ratio {:.2} < {:.2})",
                file.display(),
                successes,
                count,
                manifest.success_ratio(),
                self.min_redundancy
            );
        }
        Ok(manifest)
    }

    /// Run one attempt per host with a bounded worker group. Workers take hosts
    /// in ranked order and stop starting new attempts once the redundancy ratio
    /// is met; attempts already running finish and are recorded. Results come
    /// back in ranked order regardless of completion order.
    fn dispatch_uploads(&self, file: &Path, ranked: &[String]) -> Vec<UploadResult> {
        let count = ranked.len();
        let work: Arc<Mutex<VecDeque<(usize, String)>>> = Arc::new(Mutex::new(
            ranked.iter().cloned().enumerate().collect(),
        ));
        let successes = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::channel::<(usize, UploadResult)>();
        let num_workers = self.upload_parallelism.unwrap_or(count).min(count).max(1);
        let mut handles = Vec::with_capacity(num_workers);
        for _ in 0..num_workers {
            let work = Arc::clone(&work);
            let successes = Arc::clone(&successes);
            let tx = tx.clone();
            let backend = Arc::clone(&self.backend);
            let tracker = Arc::clone(&self.tracker);
            let file: PathBuf = file.to_path_buf();
            let ratio = self.min_redundancy;
            handles.push(std::thread::spawn(move || loop {
                let next = work
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .pop_front();
                let Some((index, host)) = next else {
                    break;
                };
                if redundancy_met(successes.load(Ordering::Acquire), count, ratio) {
                    tracing::debug!("redundancy reached; not starting upload to {}", host);
                    let _ = tx.send((index, UploadResult::failure(host, FailureReason::NotAttempted)));
                    continue;
                }
                let attempt = panic::catch_unwind(AssertUnwindSafe(|| backend.upload(&file, &host)));
                let result = match attempt {
                    Ok(Ok(url)) => {
                        successes.fetch_add(1, Ordering::AcqRel);
                        tracing::info!("uploaded to {}: {}", host, url);
                        UploadResult::success(host, url)
                    }
                    Ok(Err(e)) => {
                        tracker.record_failure(&host);
                        tracing::warn!("upload to {} failed: {}", host, e);
                        UploadResult::failure(host, FailureReason::Transfer(e.to_string()))
                    }
                    Err(_) => {
                        tracker.record_failure(&host);
                        tracing::error!("upload worker for {} panicked", host);
                        UploadResult::failure(
                            host,
                            FailureReason::Transfer("upload attempt panicked".to_string()),
                        )
                    }
                };
                let _ = tx.send((index, result));
            }));
        }
        drop(tx);

        let mut slots: Vec<Option<UploadResult>> = vec![None; count];
        for (index, result) in rx {
            slots[index] = Some(result);
        }
        for h in handles {
            if h.join().is_err() {
                tracing::error!("upload worker thread panicked");
            }
        }

        slots
            .into_iter()
            .zip(ranked)
            .map(|(slot, host)| {
                slot.unwrap_or_else(|| UploadResult::failure(host.clone(), FailureReason::NotAttempted))
            })
            .collect()
    }
}
