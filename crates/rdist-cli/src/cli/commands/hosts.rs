//! `rdist hosts` – show the configured pool.

use anyhow::Result;
use rdist_core::config::{self, BackendKind, RdistConfig};

pub fn run_hosts(cfg: &RdistConfig) -> Result<()> {
    println!("config:         {}", config::config_path()?.display());
    let backend = match cfg.backend.kind {
        BackendKind::Plowshare => "plowshare",
        BackendKind::Http => "http",
    };
    println!("backend:        {} (timeout {}s)", backend, cfg.backend.timeout_secs);
    println!("min redundancy: {}", cfg.min_redundancy);
    let upload_workers = cfg
        .upload_parallelism
        .map(|n| n.to_string())
        .unwrap_or_else(|| "one per host".to_string());
    println!("upload workers: {}", upload_workers);
    println!("download probes: {}", cfg.download_parallelism);
    println!("hosts ({}):", cfg.hosts.len());
    for h in &cfg.hosts {
        println!("  {}", h);
    }
    Ok(())
}
