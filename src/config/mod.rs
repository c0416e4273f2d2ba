//! Launcher configuration
//!
//! Settings that shape how the bootstrapper talks to the network and how it
//! starts the artifact. Everything has a default, so the launcher runs without
//! a configuration file; `--config <file>` loads a TOML file whose fields
//! override the defaults one by one.
//!
//! ```toml
//! user_agent = "bootstrapper/0.1.0"
//! artifact_extension = "jar"
//! runner = ["java", "-jar"]
//! show_progress = false
//!
//! [manifest_timeouts]
//! connect_secs = 5
//! read_secs = 10
//!
//! [download_timeouts]
//! connect_secs = 10
//! read_secs = 20
//!
//! [restart]
//! max_restarts = 16     # omit for no limit
//! min_interval_ms = 500
//!
//! [logging]
//! info = false
//! errors = true
//! ```

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::core::LauncherError;

/// User agent sent on every HTTP request unless configured otherwise.
pub const DEFAULT_USER_AGENT: &str = concat!("bootstrapper/", env!("CARGO_PKG_VERSION"));

/// Connect and read timeouts for one kind of request.
///
/// The read timeout applies to each read from the socket, so a slow but
/// steady download is never cut off; a stalled peer is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TimeoutProfile {
    /// Seconds allowed to establish the connection.
    pub connect_secs: u64,
    /// Seconds allowed between two reads of the response.
    pub read_secs: u64,
}

impl TimeoutProfile {
    /// Timeouts for fetching the manifest: connect 5s, read 10s.
    #[must_use]
    pub const fn manifest() -> Self {
        Self {
            connect_secs: 5,
            read_secs: 10,
        }
    }

    /// Timeouts for downloading the artifact: connect 10s, read 20s.
    #[must_use]
    pub const fn download() -> Self {
        Self {
            connect_secs: 10,
            read_secs: 20,
        }
    }

    /// Connect timeout as a [`Duration`].
    #[must_use]
    pub const fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }

    /// Read timeout as a [`Duration`].
    #[must_use]
    pub const fn read(&self) -> Duration {
        Duration::from_secs(self.read_secs)
    }
}

/// Bounds on the restart protocol (child exit code `-2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RestartPolicy {
    /// Maximum number of relaunches per launch; `None` means no limit.
    pub max_restarts: Option<u32>,
    /// Minimum time between two starts of the artifact, in milliseconds.
    ///
    /// A restart requested sooner waits for the remainder first.
    pub min_interval_ms: u64,
}

impl RestartPolicy {
    /// Policy that never relaunches.
    #[must_use]
    pub const fn never() -> Self {
        Self {
            max_restarts: Some(0),
            min_interval_ms: 0,
        }
    }

    /// Minimum interval as a [`Duration`].
    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }

    /// Whether another relaunch is allowed after `performed` relaunches.
    #[must_use]
    pub fn allows(&self, performed: u32) -> bool {
        self.max_restarts.is_none_or(|max| performed < max)
    }
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            max_restarts: None,
            min_interval_ms: 500,
        }
    }
}

/// The two independently toggleable log channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogChannels {
    /// Informational messages (stdout).
    pub info: bool,
    /// Error messages (stderr).
    pub errors: bool,
}

impl Default for LogChannels {
    fn default() -> Self {
        Self {
            info: false,
            errors: true,
        }
    }
}

/// Complete launcher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    /// User agent for HTTP(S) requests.
    pub user_agent: String,
    /// File extension of cached artifacts, without the leading dot.
    pub artifact_extension: String,
    /// Command prefix used to run the artifact (e.g. `["java", "-jar"]`).
    ///
    /// Empty means the artifact is executed directly.
    pub runner: Vec<String>,
    /// Whether the CLI shows a spinner while updating.
    pub show_progress: bool,
    /// Timeouts for the manifest request.
    pub manifest_timeouts: TimeoutProfile,
    /// Timeouts for the artifact download.
    pub download_timeouts: TimeoutProfile,
    /// Restart protocol bounds.
    pub restart: RestartPolicy,
    /// Log channel toggles.
    pub logging: LogChannels,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            artifact_extension: "jar".to_string(),
            runner: vec!["java".to_string(), "-jar".to_string()],
            show_progress: false,
            manifest_timeouts: TimeoutProfile::manifest(),
            download_timeouts: TimeoutProfile::download(),
            restart: RestartPolicy::default(),
            logging: LogChannels::default(),
        }
    }
}

impl LauncherConfig {
    /// Load a configuration file.
    ///
    /// # Errors
    ///
    /// - [`LauncherError::ConfigNotFound`] if the file does not exist
    /// - [`LauncherError::TomlError`] for invalid TOML
    /// - [`LauncherError::ConfigError`] if a value fails [`LauncherConfig::validate`]
    pub async fn load_from(path: &Path) -> Result<Self, LauncherError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LauncherError::ConfigNotFound {
                    path: path.display().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let config = Self::from_toml(&content)?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load a configuration file if a path is given, defaults otherwise.
    pub async fn load_with_optional(path: Option<&Path>) -> Result<Self, LauncherError> {
        match path {
            Some(path) => Self::load_from(path).await,
            None => Ok(Self::default()),
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, LauncherError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would make every run fail.
    pub fn validate(&self) -> Result<(), LauncherError> {
        if self.user_agent.trim().is_empty() {
            return Err(config_error("user_agent must not be empty"));
        }

        let ext = &self.artifact_extension;
        if ext.is_empty() || ext.starts_with('.') || ext.contains(['/', '\\']) {
            return Err(config_error(format!(
                "artifact_extension '{ext}' must be a bare extension such as \"jar\""
            )));
        }

        for (name, profile) in
            [("manifest_timeouts", &self.manifest_timeouts), ("download_timeouts", &self.download_timeouts)]
        {
            if profile.connect_secs == 0 || profile.read_secs == 0 {
                return Err(config_error(format!("{name} must be greater than zero")));
            }
        }

        if self.runner.iter().any(|part| part.trim().is_empty()) {
            return Err(config_error("runner entries must not be empty"));
        }

        Ok(())
    }
}

fn config_error(message: impl Into<String>) -> LauncherError {
    LauncherError::ConfigError {
        message: message.into(),
    }
}
