//! Manifest model: the versioned, content-addressed record of one upload.
//!
//! A manifest carries the source file's size and SHA-256 (computed once, at
//! upload time) plus one entry per drawn host. It is the only thing a later
//! download trusts. Values are immutable once built; the JSON form keeps all
//! numbers as strings for compatibility with existing manifests.

mod persist;
mod wire;

use serde::{Deserialize, Serialize};

/// Format version written by this crate.
pub const MANIFEST_VERSION: &str = "1";

/// Versions the download path knows how to read.
pub const SUPPORTED_VERSIONS: &[&str] = &[MANIFEST_VERSION];

/// Why a host has no copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The backend attempt ran and failed.
    Transfer(String),
    /// Redundancy was reached before this host's attempt started.
    NotAttempted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Success { url: String },
    Failure { reason: FailureReason },
}

/// Per-host entry of a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "wire::UploadEntry", into = "wire::UploadEntry")]
pub struct UploadResult {
    pub host: String,
    pub outcome: UploadOutcome,
}

impl UploadResult {
    pub fn success(host: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            outcome: UploadOutcome::Success { url: url.into() },
        }
    }

    pub fn failure(host: impl Into<String>, reason: FailureReason) -> Self {
        Self {
            host: host.into(),
            outcome: UploadOutcome::Failure { reason },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, UploadOutcome::Success { .. })
    }

    /// Retrieval locator, for successful entries.
    pub fn url(&self) -> Option<&str> {
        match &self.outcome {
            UploadOutcome::Success { url } => Some(url),
            UploadOutcome::Failure { .. } => None,
        }
    }
}

/// A successful manifest entry the download path may retrieve from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadCandidate {
    pub host: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "wire::ManifestDoc", into = "wire::ManifestDoc")]
pub struct Manifest {
    version: String,
    created_at: u64,
    file_size: u64,
    file_hash: String,
    uploads: Vec<UploadResult>,
}

impl Manifest {
    /// Build a manifest in the current format version.
    pub fn new(
        created_at: u64,
        file_size: u64,
        file_hash: impl Into<String>,
        uploads: Vec<UploadResult>,
    ) -> Self {
        Self {
            version: MANIFEST_VERSION.to_string(),
            created_at,
            file_size,
            file_hash: file_hash.into().to_ascii_lowercase(),
            uploads,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_supported(&self) -> bool {
        SUPPORTED_VERSIONS.contains(&self.version.as_str())
    }

    /// Creation time as unix epoch seconds.
    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Lowercase hex SHA-256 of the original file.
    pub fn file_hash(&self) -> &str {
        &self.file_hash
    }

    pub fn uploads(&self) -> &[UploadResult] {
        &self.uploads
    }

    /// Successful entries, in manifest order. Failed entries are never candidates.
    pub fn candidates(&self) -> Vec<DownloadCandidate> {
        self.uploads
            .iter()
            .filter_map(|u| match &u.outcome {
                UploadOutcome::Success { url } => Some(DownloadCandidate {
                    host: u.host.clone(),
                    url: url.clone(),
                }),
                UploadOutcome::Failure { .. } => None,
            })
            .collect()
    }

    pub fn success_count(&self) -> usize {
        self.uploads.iter().filter(|u| u.is_success()).count()
    }

    /// Successes over drawn hosts; 0.0 for an empty upload list.
    pub fn success_ratio(&self) -> f64 {
        if self.uploads.is_empty() {
            return 0.0;
        }
        self.success_count() as f64 / self.uploads.len() as f64
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}
