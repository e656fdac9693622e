//! HTTP backend: hosts are base URLs accepting `PUT`, locators are plain `GET` URLs.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use curl::easy::{Easy, ReadError};

use crate::config::BackendConfig;

use super::{TransferBackend, TransferError};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct HttpBackend {
    timeout: Duration,
    connect_timeout: Duration,
}

impl HttpBackend {
    pub fn new(timeout: Duration, connect_timeout: Duration) -> Self {
        Self {
            timeout,
            connect_timeout,
        }
    }

    pub fn from_config(cfg: &BackendConfig) -> Self {
        Self::new(cfg.timeout(), cfg.connect_timeout())
    }

    fn easy(&self, url: &str) -> Result<Easy, TransferError> {
        let mut easy = Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;
        Ok(easy)
    }

    fn fetch_into(&self, locator: &str, out: &mut File) -> Result<(), TransferError> {
        let mut easy = self.easy(locator)?;
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match out.write_all(data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    tracing::warn!("http download write failed: {}", e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.perform()?;
        }
        check_status(easy.response_code()?)?;
        out.sync_all()?;
        Ok(())
    }
}

/// Upload target for `file` under the `host` base URL.
fn upload_url(host: &str, file: &Path) -> Result<url::Url, TransferError> {
    let mut base = host.to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    let base = url::Url::parse(&base).map_err(|_| TransferError::InvalidUrl(host.to_string()))?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| TransferError::InvalidUrl(format!("{}{}", host, file.display())))?;
    base.join(&name)
        .map_err(|_| TransferError::InvalidUrl(format!("{base}{name}")))
}

fn temp_download_path(dest_dir: &Path) -> PathBuf {
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    dest_dir.join(format!(".rdist-{}-{}.part", std::process::id(), n))
}

fn check_status(code: u32) -> Result<(), TransferError> {
    if (200..300).contains(&code) {
        Ok(())
    } else {
        Err(TransferError::Http(code))
    }
}

impl TransferBackend for HttpBackend {
    fn upload(&self, file: &Path, host: &str) -> Result<String, TransferError> {
        let target = upload_url(host, file)?;
        let mut source = File::open(file)?;
        let size = source.metadata()?.len();

        let mut easy = self.easy(target.as_str())?;
        easy.upload(true)?;
        easy.in_filesize(size)?;
        let mut location: Option<String> = None;
        {
            let mut transfer = easy.transfer();
            transfer.read_function(|buf| source.read(buf).map_err(|_| ReadError::Abort))?;
            transfer.header_function(|line| {
                if let Ok(line) = std::str::from_utf8(line) {
                    if let Some((name, value)) = line.split_once(':') {
                        if name.trim().eq_ignore_ascii_case("location") {
                            location = Some(value.trim().to_string());
                        }
                    }
                }
                true
            })?;
            transfer.perform()?;
        }
        check_status(easy.response_code()?)?;

        // A server may hand back its own retrieval URL (201 + Location).
        let locator = match location {
            Some(loc) => target
                .join(&loc)
                .map(|u| u.to_string())
                .unwrap_or(loc),
            None => target.to_string(),
        };
        Ok(locator)
    }

    fn download(&self, locator: &str, dest_dir: &Path) -> Result<PathBuf, TransferError> {
        url::Url::parse(locator).map_err(|_| TransferError::InvalidUrl(locator.to_string()))?;
        let temp_path = temp_download_path(dest_dir);
        let mut out = File::create(&temp_path)?;
        if let Err(e) = self.fetch_into(locator, &mut out) {
            drop(out);
            let _ = std::fs::remove_file(&temp_path);
            return Err(e);
        }
        Ok(temp_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_url_appends_file_name() {
        let u = upload_url("https://store.example/up", Path::new("/tmp/a b.tar.gz")).unwrap();
        assert_eq!(u.as_str(), "https://store.example/up/a%20b.tar.gz");
        let u = upload_url("https://store.example/up/", Path::new("x.bin")).unwrap();
        assert_eq!(u.as_str(), "https://store.example/up/x.bin");
    }

    #[test]
    fn upload_url_rejects_non_url_host() {
        let err = upload_url("rghost", Path::new("x.bin")).unwrap_err();
        assert!(matches!(err, TransferError::InvalidUrl(_)));
    }

    #[test]
    fn status_check() {
        assert!(check_status(200).is_ok());
        assert!(check_status(201).is_ok());
        assert!(matches!(check_status(404), Err(TransferError::Http(404))));
    }

    #[test]
    fn temp_paths_are_unique_and_hidden() {
        let dir = Path::new("/tmp");
        let a = temp_download_path(dir);
        let b = temp_download_path(dir);
        assert_ne!(a, b);
        let name = a.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".rdist-"));
        assert!(name.ends_with(".part"));
    }
}
