//! Download side: rank candidates, fail over, verify, then expose the file.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};

use crate::backend::TransferBackend;
use crate::manifest::{DownloadCandidate, Manifest};

use super::verify::verify_file;
use super::{Orchestrator, OrchestratorError};

/// A downloaded file that matched the manifest's size and hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedFile {
    /// Final location under the destination directory.
    pub path: PathBuf,
    /// Host the copy came from.
    pub host: String,
    pub size: u64,
}

static SCRATCH_COUNTER: AtomicU64 = AtomicU64::new(0);

enum Attempt {
    Won { host: String, copy: RetrievedCopy },
    Failed { host: String, error: String },
}

/// A backend download sitting in its own hidden directory under `dest_dir`.
/// Dropping it removes the directory and anything still in it.
struct RetrievedCopy {
    scratch: PathBuf,
    path: PathBuf,
}

impl Drop for RetrievedCopy {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.scratch) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("failed to remove {}: {}", self.scratch.display(), e);
            }
        }
    }
}

/// Fresh per-attempt directory, so concurrent attempts that save under the
/// same remote file name never share a path.
fn create_scratch_dir(dest_dir: &Path) -> std::io::Result<PathBuf> {
    let n = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = dest_dir.join(format!(".rdist-{}-{}", std::process::id(), n));
    std::fs::create_dir(&dir)?;
    Ok(dir)
}

/// Run one backend download into a fresh scratch directory. The directory is
/// removed again unless a copy inside it is returned.
fn retrieve_into_scratch(
    backend: &dyn TransferBackend,
    locator: &str,
    dest_dir: &Path,
) -> Result<RetrievedCopy, String> {
    let scratch = create_scratch_dir(dest_dir)
        .map_err(|e| format!("create scratch dir in {}: {}", dest_dir.display(), e))?;
    let mut copy = RetrievedCopy {
        scratch,
        path: PathBuf::new(),
    };
    let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
        backend.download(locator, &copy.scratch)
    }));
    match attempt {
        Ok(Ok(path)) if path.starts_with(&copy.scratch) => {
            copy.path = path;
            Ok(copy)
        }
        Ok(Ok(path)) => Err(format!(
            "backend returned {} outside its download directory",
            path.display()
        )),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err("download attempt panicked".to_string()),
    }
}

fn check_file_name(name: &str) -> Result<(), OrchestratorError> {
    let plain = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\');
    if plain {
        Ok(())
    } else {
        Err(OrchestratorError::InvalidArgument(format!(
            "output name {name:?} must be a plain file name"
        )))
    }
}

impl Orchestrator {
    /// Download the manifest's file into `dest_dir`, named after its SHA-256.
    pub fn download(
        &self,
        manifest: &Manifest,
        dest_dir: &Path,
    ) -> Result<VerifiedFile, OrchestratorError> {
        self.download_as(manifest, dest_dir, manifest.file_hash())
    }

    /// Download the manifest's file into `dest_dir/file_name`.
    ///
    /// Candidates are tried most reliable first; the next one is only tried
    /// after the previous failed. A copy that fails verification ends the call
    /// with `IntegrityMismatch` and is deleted; nothing appears under
    /// `file_name` unless it verified.
    pub fn download_as(
        &self,
        manifest: &Manifest,
        dest_dir: &Path,
        file_name: &str,
    ) -> Result<VerifiedFile, OrchestratorError> {
        if !manifest.is_supported() {
            return Err(OrchestratorError::UnsupportedFormat(
                manifest.version().to_string(),
            ));
        }
        check_file_name(file_name)?;
        let candidates = manifest.candidates();
        if candidates.is_empty() {
            return Err(OrchestratorError::NoValidSources);
        }
        if !dest_dir.is_dir() {
            return Err(OrchestratorError::InvalidArgument(format!(
                "{} is not a directory",
                dest_dir.display()
            )));
        }

        let ranked = self.tracker.rank_by(candidates, |c| c.host.as_str());
        tracing::info!(
            "downloading {} from {} candidate(s): {:?}",
            manifest.file_hash(),
            ranked.len(),
            ranked.iter().map(|c| c.host.as_str()).collect::<Vec<_>>()
        );
        // `copy` owns its scratch directory; every return below removes it.
        let (host, copy) = self.retrieve_first(ranked, dest_dir)?;

        if let Err(e) = verify_file(manifest, &copy.path) {
            tracing::warn!("copy from {} failed verification: {}", host, e);
            return Err(e);
        }

        let final_path = dest_dir.join(file_name);
        if let Err(source) = std::fs::rename(&copy.path, &final_path) {
            return Err(OrchestratorError::Finalize {
                path: final_path,
                source,
            });
        }
        drop(copy);
        tracing::info!("downloaded {} from {}", final_path.display(), host);
        Ok(VerifiedFile {
            path: final_path,
            host,
            size: manifest.file_size(),
        })
    }

    /// Pull candidates in ranked order until one backend download succeeds.
    /// With more than one worker the first success wins and later successes
    /// are discarded; no worker starts a new attempt once a winner exists.
    fn retrieve_first(
        &self,
        ranked: Vec<DownloadCandidate>,
        dest_dir: &Path,
    ) -> Result<(String, RetrievedCopy), OrchestratorError> {
        let count = ranked.len();
        let work: Arc<Mutex<VecDeque<DownloadCandidate>>> =
            Arc::new(Mutex::new(ranked.into_iter().collect()));
        let won = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel::<Attempt>();
        let num_workers = self.download_parallelism.min(count).max(1);
        let mut handles = Vec::with_capacity(num_workers);
        for _ in 0..num_workers {
            let work = Arc::clone(&work);
            let won = Arc::clone(&won);
            let tx = tx.clone();
            let backend = Arc::clone(&self.backend);
            let tracker = Arc::clone(&self.tracker);
            let dest_dir = dest_dir.to_path_buf();
            handles.push(std::thread::spawn(move || loop {
                if won.load(Ordering::Acquire) {
                    break;
                }
                let next = work
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .pop_front();
                let Some(candidate) = next else {
                    break;
                };
                let error = match retrieve_into_scratch(&*backend, &candidate.url, &dest_dir) {
                    Ok(copy) => {
                        if won
                            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                            .is_ok()
                        {
                            let _ = tx.send(Attempt::Won {
                                host: candidate.host,
                                copy,
                            });
                        } else {
                            // Dropping the late copy removes only its own scratch dir.
                            tracing::debug!("discarding late copy from {}", candidate.host);
                        }
                        continue;
                    }
                    Err(error) => error,
                };
                tracker.record_failure(&candidate.host);
                tracing::warn!("download from {} failed: {}", candidate.host, error);
                let _ = tx.send(Attempt::Failed {
                    host: candidate.host,
                    error,
                });
            }));
        }
        drop(tx);

        let mut winner = None;
        let mut attempted = 0usize;
        let mut last_failure: Option<(String, String)> = None;
        for attempt in rx {
            attempted += 1;
            match attempt {
                Attempt::Won { host, copy } => winner = Some((host, copy)),
                Attempt::Failed { host, error } => last_failure = Some((host, error)),
            }
        }
        for h in handles {
            if h.join().is_err() {
                tracing::error!("download worker thread panicked");
            }
        }

        match (winner, last_failure) {
            (Some(won), _) => Ok(won),
            (None, Some((last_host, last_error))) => Err(OrchestratorError::TransferFailure {
                attempted,
                last_host,
                last_error,
            }),
            (None, None) => Err(OrchestratorError::NoValidSources),
        }
    }
}
