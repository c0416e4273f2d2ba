//! Artifact download into the cache directory
//!
//! The cache holds one artifact per product, named
//! `<product>-v<version>.<ext>`. Before a download every cached version of the
//! product is evicted; eviction failures are warnings. The target path itself
//! must be free before writing, otherwise the download is aborted.
//!
//! The body is streamed to disk in chunks through an 8 KiB buffered writer.
//! When the download fails the partial file is removed.

use std::path::{Path, PathBuf};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};

use crate::config::LauncherConfig;
use crate::core::LauncherError;
use crate::utils::fs::{ensure_dir, remove_file_if_exists};
use crate::utils::http::{UrlTarget, build_client, describe_error, resolve_url};
use crate::utils::progress::{UpdateProgress, human_readable_size};

/// Capacity of the buffered writer the body is streamed through.
const WRITE_BUFFER_SIZE: usize = 8 * 1024;

/// Path of the cached artifact for `product` at `version`.
#[must_use]
pub fn artifact_path(cache_dir: &Path, product: &str, version: &str, extension: &str) -> PathBuf {
    cache_dir.join(format!("{product}-v{version}.{extension}"))
}

/// Downloads artifacts with the artifact timeout profile.
pub struct ArtifactDownloader {
    client: reqwest::Client,
    extension: String,
    mark_executable: bool,
}

impl ArtifactDownloader {
    /// Create a downloader from the launcher configuration.
    ///
    /// Artifacts are marked executable on Unix when no runner is configured.
    pub fn new(config: &LauncherConfig) -> Result<Self, LauncherError> {
        Ok(Self {
            client: build_client(&config.download_timeouts, &config.user_agent)?,
            extension: config.artifact_extension.clone(),
            mark_executable: config.runner.is_empty(),
        })
    }

    /// Download `url` into `cache_dir` as the artifact of `product` at `version`.
    ///
    /// Returns the path of the new artifact.
    ///
    /// # Errors
    ///
    /// - [`LauncherError::ArtifactBusy`] if an existing file at the target
    ///   path cannot be deleted
    /// - [`LauncherError::HttpStatus`] for a non-2xx response
    /// - [`LauncherError::DownloadFailed`] for transport or write failures
    pub async fn download(
        &self,
        cache_dir: &Path,
        product: &str,
        version: &str,
        url: &str,
        progress: &dyn UpdateProgress,
    ) -> Result<PathBuf, LauncherError> {
        ensure_dir(cache_dir).map_err(|e| LauncherError::FileSystemError {
            operation: "creating cache directory".to_string(),
            path: format!("{}: {e}", cache_dir.display()),
        })?;

        self.evict_cached_versions(cache_dir, product).await;

        let target = artifact_path(cache_dir, product, version, &self.extension);
        remove_file_if_exists(&target).map_err(|e| LauncherError::ArtifactBusy {
            path: target.display().to_string(),
            reason: e.to_string(),
        })?;

        info!("Downloading {product} {version} from {url}");
        let transferred = match resolve_url(url)? {
            UrlTarget::Http(remote) => {
                self.stream_to_file(remote, url, &target, version, progress).await
            }
            UrlTarget::File(source) => copy_local(&source, url, &target).await,
        };

        let size = self.complete(&target, transferred).await?;
        info!("Downloaded {} to {}", human_readable_size(size), target.display());
        Ok(target)
    }

    /// Finish a transfer into `target`. The file is removed if any step failed.
    async fn complete(
        &self,
        target: &Path,
        transferred: Result<u64, LauncherError>,
    ) -> Result<u64, LauncherError> {
        let result = match transferred {
            Ok(size) => self.finish(target).await.map(|()| size),
            Err(e) => Err(e),
        };

        if result.is_err() {
            if let Err(cleanup) = remove_file_if_exists(target) {
                warn!("Failed to remove partial download {}: {cleanup}", target.display());
            }
        }
        result
    }

    /// Remove every `<product>-v*.<ext>` file in `cache_dir`.
    async fn evict_cached_versions(&self, cache_dir: &Path, product: &str) {
        let prefix = format!("{product}-v");
        let suffix = format!(".{}", self.extension);

        let mut entries = match tokio::fs::read_dir(cache_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to list cache directory {}: {e}", cache_dir.display());
                return;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!("Failed to read cache directory entry: {e}");
                    break;
                }
            };

            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !name.starts_with(&prefix) || !name.ends_with(&suffix) {
                continue;
            }
            if !entry.file_type().await.is_ok_and(|kind| kind.is_file()) {
                continue;
            }

            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => debug!("Removed cached artifact {name}"),
                Err(e) => warn!("Failed to delete cached artifact {name}: {e}"),
            }
        }
    }

    async fn stream_to_file(
        &self,
        remote: reqwest::Url,
        url: &str,
        target: &Path,
        version: &str,
        progress: &dyn UpdateProgress,
    ) -> Result<u64, LauncherError> {
        let failed = |reason: String| LauncherError::DownloadFailed {
            url: url.to_string(),
            reason,
        };

        let mut response =
            self.client.get(remote).send().await.map_err(|e| failed(describe_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::HttpStatus {
                operation: "downloading artifact".to_string(),
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let total = response.content_length();
        let file = tokio::fs::File::create(target)
            .await
            .map_err(|e| failed(format!("cannot create {}: {e}", target.display())))?;
        let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);

        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await.map_err(|e| failed(describe_error(&e)))? {
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| failed(format!("write to {} failed: {e}", target.display())))?;
            written += chunk.len() as u64;
            progress.set_status_text(&download_status(version, written, total));
        }

        writer
            .flush()
            .await
            .map_err(|e| failed(format!("flush of {} failed: {e}", target.display())))?;
        Ok(written)
    }

    async fn finish(&self, target: &Path) -> Result<(), LauncherError> {
        if !self.mark_executable {
            return Ok(());
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            tokio::fs::set_permissions(target, std::fs::Permissions::from_mode(0o755))
                .await
                .map_err(|e| LauncherError::FileSystemError {
                    operation: "marking artifact executable".to_string(),
                    path: format!("{}: {e}", target.display()),
                })?;
        }
        #[cfg(not(unix))]
        let _ = target;
        Ok(())
    }
}

async fn copy_local(source: &Path, url: &str, target: &Path) -> Result<u64, LauncherError> {
    tokio::fs::copy(source, target).await.map_err(|e| LauncherError::DownloadFailed {
        url: url.to_string(),
        reason: format!("cannot copy {}: {e}", source.display()),
    })
}

fn download_status(version: &str, written: u64, total: Option<u64>) -> String {
    match total {
        Some(total) => format!(
            "Updating to version {version}... {} of {}",
            human_readable_size(written),
            human_readable_size(total)
        ),
        None => format!("Updating to version {version}... {}", human_readable_size(written)),
    }
}
