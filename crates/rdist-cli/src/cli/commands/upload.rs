//! `rdist upload <file> <count>` – spread a file over the host pool.

use anyhow::{Context, Result};
use rdist_core::backend;
use rdist_core::config::RdistConfig;
use rdist_core::manifest::{FailureReason, Manifest, UploadOutcome};
use rdist_core::orchestrator::Orchestrator;
use std::path::Path;

fn print_summary(manifest: &Manifest) {
    for u in manifest.uploads() {
        match &u.outcome {
            UploadOutcome::Success { url } => eprintln!("  ok       {:<16} {}", u.host, url),
            UploadOutcome::Failure {
                reason: FailureReason::Transfer(msg),
            } => eprintln!("  failed   {:<16} {}", u.host, msg),
            UploadOutcome::Failure {
                reason: FailureReason::NotAttempted,
            } => eprintln!("  skipped  {:<16} redundancy reached", u.host),
        }
    }
    eprintln!(
        "{}/{} host(s) hold a copy",
        manifest.success_count(),
        manifest.uploads().len()
    );
}

/// Upload `path` to `count` hosts. The manifest JSON goes to stdout and,
/// with `--manifest`, to a file as well.
pub async fn run_upload(
    cfg: &RdistConfig,
    path: &Path,
    count: usize,
    manifest_path: Option<&Path>,
) -> Result<()> {
    let orch = Orchestrator::from_config(cfg, backend::from_config(cfg))?;
    let manifest = tokio::task::spawn_blocking({
        let path = path.to_path_buf();
        move || orch.upload(&path, count)
    })
    .await
    .context("upload task join")??;

    print_summary(&manifest);
    if manifest.success_ratio() < cfg.min_redundancy {
        eprintln!(
            "warning: redundancy {:.2} is below the configured {:.2}",
            manifest.success_ratio(),
            cfg.min_redundancy
        );
    }
    if let Some(out) = manifest_path {
        manifest.save_to_path(out)?;
        eprintln!("manifest written to {}", out.display());
    }
    println!("{}", manifest.to_json().context("serialize manifest")?);
    Ok(())
}
