//! Checksum command: compute SHA-256 of a file.

use anyhow::{Context, Result};
use rdist_core::checksum;
use std::path::Path;

/// Compute and print SHA-256 of the given file.
pub async fn run_checksum(path: &Path) -> Result<()> {
    let digest = tokio::task::spawn_blocking({
        let path = path.to_path_buf();
        move || checksum::sha256_path(&path)
    })
    .await
    .context("checksum task join")??;
    println!("{}  {}", digest, path.display());
    Ok(())
}
