//! SHA-256 content hashing for manifests and post-download verification.
//!
//! Files are read in fixed-size chunks so hashing large uploads keeps memory
//! use bounded.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Size and content hash of a local file, as recorded in a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigest {
    pub size: u64,
    /// Lowercase hex SHA-256.
    pub sha256: String,
}

/// Compute SHA-256 of a file and return the digest as lowercase hex.
pub fn sha256_path(path: &Path) -> Result<String> {
    Ok(digest_path(path)?.sha256)
}

/// Hash a file and count its bytes in a single pass.
pub fn digest_path(path: &Path) -> Result<FileDigest> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    digest_reader(f).with_context(|| format!("read {}", path.display()))
}

/// Hash everything `reader` yields and count the bytes.
pub fn digest_reader<R: Read>(mut reader: R) -> io::Result<FileDigest> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; BUF_SIZE];
    let mut size = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        size += n as u64;
        hasher.update(&buf[..n]);
    }
    Ok(FileDigest {
        size,
        sha256: hex::encode(hasher.finalize()),
    })
}
