//! Save and load manifests as JSON files.

use anyhow::{Context, Result};
use std::path::Path;

use super::Manifest;

impl Manifest {
    /// Write the manifest to `path` (creates parent dir if needed).
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir: {}", parent.display()))?;
        }
        let json = self.to_json().context("serialize manifest")?;
        std::fs::write(path, json)
            .with_context(|| format!("write manifest: {}", path.display()))?;
        Ok(())
    }

    /// Read a manifest from `path`. The version is not checked here; the
    /// download path rejects unsupported versions before any transfer.
    pub fn load_from_path(path: &Path) -> Result<Manifest> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read manifest: {}", path.display()))?;
        let manifest: Manifest = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse manifest: {}", path.display()))?;
        Ok(manifest)
    }
}
