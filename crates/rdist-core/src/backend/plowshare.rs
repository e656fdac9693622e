//! Backend driving the plowshare command-line tools (`plowup` / `plowdown`).

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use crate::config::BackendConfig;

use super::command::run_with_timeout;
use super::output::last_token;
use super::{TransferBackend, TransferError};

/// Uploads with `plowup <host> <file>` and downloads with
/// `plowdown <url> -o <dir> --temp-rename`.
#[derive(Debug, Clone)]
pub struct PlowshareBackend {
    plowup: String,
    plowdown: String,
    timeout: Duration,
}

impl PlowshareBackend {
    pub fn new(plowup: impl Into<String>, plowdown: impl Into<String>, timeout: Duration) -> Self {
        Self {
            plowup: plowup.into(),
            plowdown: plowdown.into(),
            timeout,
        }
    }

    pub fn from_config(cfg: &BackendConfig) -> Self {
        Self::new(cfg.plowup.clone(), cfg.plowdown.clone(), cfg.timeout())
    }
}

impl TransferBackend for PlowshareBackend {
    fn upload(&self, file: &Path, host: &str) -> Result<String, TransferError> {
        let args: [OsString; 2] = [host.into(), file.as_os_str().to_owned()];
        let out = run_with_timeout(&self.plowup, &args, self.timeout)?;
        last_token(&out)
            .map(str::to_string)
            .ok_or_else(|| TransferError::EmptyOutput(self.plowup.clone()))
    }

    fn download(&self, locator: &str, dest_dir: &Path) -> Result<PathBuf, TransferError> {
        let args: [OsString; 4] = [
            locator.into(),
            "-o".into(),
            dest_dir.as_os_str().to_owned(),
            "--temp-rename".into(),
        ];
        let out = run_with_timeout(&self.plowdown, &args, self.timeout)?;
        let token =
            last_token(&out).ok_or_else(|| TransferError::EmptyOutput(self.plowdown.clone()))?;
        resolve_saved_path(Path::new(token), dest_dir)
    }
}

/// plowdown prints the saved path. A relative path is taken relative to the
/// output dir, never the working directory, and the result must stay inside
/// the output dir.
fn resolve_saved_path(printed: &Path, dest_dir: &Path) -> Result<PathBuf, TransferError> {
    let path = if printed.is_absolute() {
        printed.to_path_buf()
    } else {
        dest_dir.join(printed)
    };
    let escapes = path
        .components()
        .any(|c| matches!(c, Component::ParentDir));
    if escapes || !path.starts_with(dest_dir) || path == dest_dir {
        return Err(TransferError::OutsideDir {
            path,
            dir: dest_dir.to_path_buf(),
        });
    }
    Ok(path)
}
