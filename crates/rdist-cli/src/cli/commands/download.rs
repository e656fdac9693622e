//! `rdist download <manifest>` – fetch and verify a distributed file.

use anyhow::{Context, Result};
use rdist_core::backend;
use rdist_core::config::RdistConfig;
use rdist_core::manifest::Manifest;
use rdist_core::orchestrator::Orchestrator;
use std::path::Path;

pub async fn run_download(
    cfg: &RdistConfig,
    manifest_path: &Path,
    dir: &Path,
    name: Option<&str>,
) -> Result<()> {
    let manifest = Manifest::load_from_path(manifest_path)?;
    let orch = Orchestrator::from_config(cfg, backend::from_config(cfg))?;
    let file = tokio::task::spawn_blocking({
        let dir = dir.to_path_buf();
        let name = name.map(str::to_string);
        move || match name {
            Some(name) => orch.download_as(&manifest, &dir, &name),
            None => orch.download(&manifest, &dir),
        }
    })
    .await
    .context("download task join")??;
    println!(
        "{}  ({} bytes from {})",
        file.path.display(),
        file.size,
        file.host
    );
    Ok(())
}
