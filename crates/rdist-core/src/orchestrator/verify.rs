//! Integrity check of a retrieved copy against its manifest.

use std::fs::File;
use std::path::Path;

use crate::checksum;
use crate::manifest::Manifest;

use super::OrchestratorError;

/// Checks that `path` has the manifest's byte size and SHA-256.
///
/// Size is compared first so a truncated copy is rejected without hashing it.
pub fn verify_file(manifest: &Manifest, path: &Path) -> Result<(), OrchestratorError> {
    let actual_size = std::fs::metadata(path)?.len();
    if actual_size != manifest.file_size() {
        return Err(OrchestratorError::IntegrityMismatch {
            path: path.to_path_buf(),
            expected_size: manifest.file_size(),
            actual_size,
            expected_hash: manifest.file_hash().to_string(),
            actual_hash: None,
        });
    }
    let digest = checksum::digest_reader(File::open(path)?)?;
    if digest.size != manifest.file_size() || digest.sha256 != manifest.file_hash() {
        return Err(OrchestratorError::IntegrityMismatch {
            path: path.to_path_buf(),
            expected_size: manifest.file_size(),
            actual_size: digest.size,
            expected_hash: manifest.file_hash().to_string(),
            actual_hash: Some(digest.sha256),
        });
    }
    Ok(())
}
