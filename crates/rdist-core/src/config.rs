use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Transfer backend: external plowshare tools or plain HTTP PUT/GET via curl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Plowshare,
    Http,
}

/// Backend section of config.toml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,
    /// Upper bound on a single upload or download call, in seconds.
    pub timeout_secs: u64,
    /// Program used for uploads with the plowshare backend.
    #[serde(default = "default_plowup")]
    pub plowup: String,
    /// Program used for downloads with the plowshare backend.
    #[serde(default = "default_plowdown")]
    pub plowdown: String,
    /// Connect timeout for the HTTP backend, in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_plowup() -> String {
    "plowup".to_string()
}

fn default_plowdown() -> String {
    "plowdown".to_string()
}

fn default_connect_timeout() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::Plowshare,
            timeout_secs: 600,
            plowup: default_plowup(),
            plowdown: default_plowdown(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Global configuration loaded from `~/.config/rdist/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RdistConfig {
    /// Host pool uploads draw from.
    pub hosts: Vec<String>,
    /// Fraction of drawn hosts that must succeed before no new uploads start.
    pub min_redundancy: f64,
    /// Maximum concurrent upload attempts per call (None = one per drawn host).
    #[serde(default)]
    pub upload_parallelism: Option<usize>,
    /// Candidates probed at once on download (1 = strict failover order).
    #[serde(default = "default_download_parallelism")]
    pub download_parallelism: usize,
    #[serde(default)]
    pub backend: BackendConfig,
}

fn default_download_parallelism() -> usize {
    1
}

impl Default for RdistConfig {
    fn default() -> Self {
        Self {
            hosts: vec![
                "rghost".to_string(),
                "ge_tt".to_string(),
                "multiupload".to_string(),
            ],
            min_redundancy: 0.6,
            upload_parallelism: None,
            download_parallelism: default_download_parallelism(),
            backend: BackendConfig::default(),
        }
    }
}

impl RdistConfig {
    /// Reject values the orchestrator cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.hosts.is_empty() {
            anyhow::bail!("config: host pool is empty");
        }
        if !(self.min_redundancy > 0.0 && self.min_redundancy <= 1.0) {
            anyhow::bail!(
                "config: min_redundancy must be in (0, 1], got {}",
                self.min_redundancy
            );
        }
        if self.upload_parallelism == Some(0) {
            anyhow::bail!("config: upload_parallelism must be at least 1");
        }
        if self.download_parallelism == 0 {
            anyhow::bail!("config: download_parallelism must be at least 1");
        }
        if self.backend.timeout_secs == 0 {
            anyhow::bail!("config: backend.timeout_secs must be at least 1");
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("rdist")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RdistConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RdistConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load and validate configuration from an explicit path.
pub fn load_from_path(path: &Path) -> Result<RdistConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: RdistConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
