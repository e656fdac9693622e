//! `rdist verify <manifest> <file>` – check a local copy against a manifest.

use anyhow::{Context, Result};
use rdist_core::manifest::Manifest;
use rdist_core::orchestrator;
use std::path::Path;

pub async fn run_verify(manifest_path: &Path, path: &Path) -> Result<()> {
    let manifest = Manifest::load_from_path(manifest_path)?;
    tokio::task::spawn_blocking({
        let path = path.to_path_buf();
        move || orchestrator::verify_file(&manifest, &path)
    })
    .await
    .context("verify task join")??;
    println!("OK  {}", path.display());
    Ok(())
}
