//! Test utilities for the bootstrapper
//!
//! Shared by unit tests and the integration suite (through the `test-utils`
//! feature):
//! - logging setup that can be called from every test
//! - a progress recorder to assert on presentation calls
//! - fixtures for manifests, state files and shell-script artifacts
//!
//! # Example
//!
//! ```rust,no_run
//! use bootstrapper::test_utils::{ManifestFixture, init_test_logging};
//!
//! init_test_logging(None);
//! let manifest = ManifestFixture::new("App", "2").download_url("http://x/app.bin").to_json();
//! assert!(manifest.contains("downloadUrl"));
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::utils::progress::UpdateProgress;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` if given, otherwise `RUST_LOG`; without either nothing is
/// logged. Only the first call has an effect.
///
/// ```bash
/// RUST_LOG=bootstrapper=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_ansi(true)
            .try_init();
    });
}

/// Presentation call observed by [`RecordingProgress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// `show_progress()`
    Shown,
    /// `hide_progress()`
    Hidden,
    /// `set_status_text(text)`
    Status(String),
}

/// Progress sink that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls so far.
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    /// Status texts so far.
    pub fn statuses(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::Status(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl UpdateProgress for RecordingProgress {
    fn show_progress(&self) {
        self.record(ProgressEvent::Shown);
    }

    fn hide_progress(&self) {
        self.record(ProgressEvent::Hidden);
    }

    fn set_status_text(&self, message: &str) {
        self.record(ProgressEvent::Status(message.to_string()));
    }
}

/// Builder for manifest documents.
#[derive(Debug, Clone, Default)]
pub struct ManifestFixture {
    name: Option<String>,
    version: Option<String>,
    download_url: Option<String>,
}

impl ManifestFixture {
    /// Manifest with a name and version but no download URL.
    #[must_use]
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            version: Some(version.to_string()),
            download_url: None,
        }
    }

    /// Set the `downloadUrl` field.
    #[must_use]
    pub fn download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = Some(url.into());
        self
    }

    /// Drop the `name` field.
    #[must_use]
    pub fn without_name(mut self) -> Self {
        self.name = None;
        self
    }

    /// Render the manifest as pretty JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        let mut fields = serde_json::Map::new();
        if let Some(name) = &self.name {
            fields.insert("name".to_string(), name.clone().into());
        }
        if let Some(version) = &self.version {
            fields.insert("version".to_string(), version.clone().into());
        }
        if let Some(url) = &self.download_url {
            fields.insert("downloadUrl".to_string(), url.clone().into());
        }
        serde_json::to_string_pretty(&serde_json::Value::Object(fields)).unwrap_or_default()
    }

    /// Write the manifest to `path` and return its path as a string URL.
    pub fn write_to(&self, path: &Path) -> std::io::Result<String> {
        std::fs::write(path, self.to_json())?;
        Ok(path.display().to_string())
    }
}

/// Write a state file with raw JSON content.
pub fn write_state(path: &Path, json: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)
}

/// Body of a shell-script artifact that appends its arguments to `log`
/// and exits with `code`.
#[must_use]
pub fn recording_script(log: &Path, code: i32) -> String {
    format!("#!/bin/sh\necho \"$@\" >> \"{}\"\nexit {code}\n", log.display())
}

/// Place a cached artifact `<product>-v<version>.<extension>` under
/// `<install_dir>/cache` with the given content.
pub fn install_artifact(
    install_dir: &Path,
    product: &str,
    version: &str,
    extension: &str,
    content: &str,
) -> std::io::Result<PathBuf> {
    let cache = install_dir.join("cache");
    std::fs::create_dir_all(&cache)?;
    let path = cache.join(format!("{product}-v{version}.{extension}"));
    std::fs::write(&path, content)?;
    Ok(path)
}
