//! JSON wire shapes for manifests.
//!
//! Numbers travel as strings. A failed entry carries `"error"`, which older
//! writers set to a message string and current writers set to `true`.

use serde::{Deserialize, Serialize};

use super::{FailureReason, Manifest, UploadOutcome, UploadResult};

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct ManifestDoc {
    version: String,
    datetime: String,
    filesize: String,
    filehash: String,
    uploads: Vec<UploadResult>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ErrorField {
    Flag(bool),
    Message(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct UploadEntry {
    host_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<ErrorField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attempted: Option<bool>,
}

impl TryFrom<UploadEntry> for UploadResult {
    type Error = String;

    fn try_from(entry: UploadEntry) -> Result<Self, Self::Error> {
        let error_message = match entry.error {
            None | Some(ErrorField::Flag(false)) => None,
            Some(ErrorField::Flag(true)) => Some(entry.reason.unwrap_or_default()),
            Some(ErrorField::Message(m)) => Some(entry.reason.unwrap_or(m)),
        };
        let outcome = match (error_message, entry.url) {
            (Some(_), _) if entry.attempted == Some(false) => UploadOutcome::Failure {
                reason: FailureReason::NotAttempted,
            },
            (Some(message), _) => UploadOutcome::Failure {
                reason: FailureReason::Transfer(message),
            },
            (None, Some(url)) => UploadOutcome::Success { url },
            (None, None) => {
                return Err(format!(
                    "upload entry for {} has neither url nor error",
                    entry.host_name
                ))
            }
        };
        Ok(UploadResult {
            host: entry.host_name,
            outcome,
        })
    }
}

impl From<UploadResult> for UploadEntry {
    fn from(result: UploadResult) -> Self {
        let mut entry = UploadEntry {
            host_name: result.host,
            url: None,
            error: None,
            reason: None,
            attempted: None,
        };
        match result.outcome {
            UploadOutcome::Success { url } => entry.url = Some(url),
            UploadOutcome::Failure { reason } => {
                entry.error = Some(ErrorField::Flag(true));
                match reason {
                    FailureReason::Transfer(message) if !message.is_empty() => {
                        entry.reason = Some(message)
                    }
                    FailureReason::Transfer(_) => {}
                    FailureReason::NotAttempted => entry.attempted = Some(false),
                }
            }
        }
        entry
    }
}

impl TryFrom<ManifestDoc> for Manifest {
    type Error = String;

    fn try_from(doc: ManifestDoc) -> Result<Self, Self::Error> {
        let created_at = doc
            .datetime
            .trim()
            .parse::<u64>()
            .map_err(|e| format!("invalid datetime {:?}: {}", doc.datetime, e))?;
        let file_size = doc
            .filesize
            .trim()
            .parse::<u64>()
            .map_err(|e| format!("invalid filesize {:?}: {}", doc.filesize, e))?;
        let is_sha256 = hex::decode(&doc.filehash)
            .map(|bytes| bytes.len() == 32)
            .unwrap_or(false);
        if !is_sha256 {
            return Err(format!("filehash {:?} is not a hex SHA-256 digest", doc.filehash));
        }
        Ok(Manifest {
            version: doc.version,
            created_at,
            file_size,
            file_hash: doc.filehash.to_ascii_lowercase(),
            uploads: doc.uploads,
        })
    }
}

impl From<Manifest> for ManifestDoc {
    fn from(m: Manifest) -> Self {
        ManifestDoc {
            version: m.version,
            datetime: m.created_at.to_string(),
            filesize: m.file_size.to_string(),
            filehash: m.file_hash,
            uploads: m.uploads,
        }
    }
}
