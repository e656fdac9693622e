//! Scripted in-memory transfer backend for orchestrator tests.
//!
//! Uploads succeed unless the host is listed as failing; successful uploads
//! keep the file's bytes under the returned locator so a later download can
//! serve them. Downloads can be overridden per locator to fail or to serve
//! different bytes.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Barrier, Mutex};

use rdist_core::backend::{TransferBackend, TransferError};

#[derive(Debug, Clone)]
pub enum Serve {
    Bytes(Vec<u8>),
    Fail,
}

#[derive(Default)]
pub struct FakeBackend {
    failing_hosts: HashSet<String>,
    overrides: HashMap<String, Serve>,
    upload_barrier: Option<Barrier>,
    stored: Mutex<HashMap<String, Vec<u8>>>,
    upload_calls: Mutex<Vec<String>>,
    download_calls: Mutex<Vec<String>>,
    temp_counter: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads to these hosts fail with a non-zero exit.
    pub fn fail_uploads_to(mut self, hosts: &[&str]) -> Self {
        self.failing_hosts
            .extend(hosts.iter().map(|h| h.to_string()));
        self
    }

    /// Downloads of `locator` return `bytes` regardless of what was uploaded.
    pub fn serve(mut self, locator: &str, bytes: &[u8]) -> Self {
        self.overrides
            .insert(locator.to_string(), Serve::Bytes(bytes.to_vec()));
        self
    }

    /// Downloads of `locator` fail.
    pub fn fail_download(mut self, locator: &str) -> Self {
        self.overrides.insert(locator.to_string(), Serve::Fail);
        self
    }

    /// Every upload waits until `n` uploads are in flight before completing.
    pub fn with_upload_barrier(mut self, n: usize) -> Self {
        self.upload_barrier = Some(Barrier::new(n));
        self
    }

    pub fn upload_calls(&self) -> Vec<String> {
        self.upload_calls.lock().unwrap().clone()
    }

    pub fn download_calls(&self) -> Vec<String> {
        self.download_calls.lock().unwrap().clone()
    }

    pub fn locator(host: &str, file: &Path) -> String {
        format!(
            "http://{}.example/{}",
            host,
            file.file_name().unwrap().to_string_lossy()
        )
    }
}

impl TransferBackend for FakeBackend {
    fn upload(&self, file: &Path, host: &str) -> Result<String, TransferError> {
        self.upload_calls.lock().unwrap().push(host.to_string());
        if let Some(barrier) = &self.upload_barrier {
            barrier.wait();
        }
        if self.failing_hosts.contains(host) {
            return Err(TransferError::Exit {
                program: "plowup".to_string(),
                code: 1,
            });
        }
        let bytes = std::fs::read(file)?;
        let locator = Self::locator(host, file);
        self.stored.lock().unwrap().insert(locator.clone(), bytes);
        Ok(locator)
    }

    fn download(&self, locator: &str, dest_dir: &Path) -> Result<PathBuf, TransferError> {
        self.download_calls.lock().unwrap().push(locator.to_string());
        let bytes = match self.overrides.get(locator) {
            Some(Serve::Bytes(b)) => b.clone(),
            Some(Serve::Fail) => return Err(TransferError::Http(503)),
            None => match self.stored.lock().unwrap().get(locator) {
                Some(b) => b.clone(),
                None => return Err(TransferError::Http(404)),
            },
        };
        let n = self.temp_counter.fetch_add(1, Ordering::Relaxed);
        let path = dest_dir.join(format!(".fake-{n}.part"));
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}
