//! The orchestrator
//!
//! A [`Bootstrapper`] is created once per run by the entry point. Creation
//! fetches the manifest, loads the local state and resolves the session:
//!
//! | Field             | Source                                                       |
//! |-------------------|--------------------------------------------------------------|
//! | `current_version` | `installedVersion` of the local state                        |
//! | `latest_version`  | manifest `version`, else `current_version`                   |
//! | `name`            | manifest `name`, else `installedProduct` of the local state  |
//! | `executable_url`  | manifest `downloadUrl`                                       |
//!
//! Without a `downloadUrl` the latest version is pinned to the current one and
//! a pending force update is ignored for this run. Without a manifest at all
//! the run is offline: updating is skipped, launching still works from the
//! cache. Offline with no state file is the one fatal condition, since there
//! is nothing to launch and nowhere to download it from.
//!
//! ```rust,no_run
//! use bootstrapper::bootstrapper::{BootstrapOptions, Bootstrapper};
//! use bootstrapper::config::LauncherConfig;
//!
//! # async fn example() -> Result<(), bootstrapper::core::LauncherError> {
//! let options = BootstrapOptions::new("https://example.com/meta.json", "bootstrapper-meta.json");
//! let mut bootstrapper = Bootstrapper::init(options, LauncherConfig::default()).await?;
//! bootstrapper.update().await;
//! std::process::exit(bootstrapper.launch().await);
//! # }
//! ```

use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::config::LauncherConfig;
use crate::core::LauncherError;
use crate::download::{ArtifactDownloader, artifact_path};
use crate::launcher::{LAUNCH_FAILED_EXIT_CODE, ProcessLauncher};
use crate::manifest::{FetchedManifest, ManifestFetcher};
use crate::planner::{PlanInput, UpdateDecision, plan};
use crate::state::{LocalState, LocalStateStore};
use crate::utils::fs::ensure_dir;
use crate::utils::progress::{NoProgress, UpdateProgress};


/// Name of the cache directory inside the install directory.
pub const CACHE_DIR: &str = "cache";

/// Raw manifest text recorded when running offline.
const OFFLINE_MANIFEST: &str = "{}";

/// What the entry point passes to [`Bootstrapper::init`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapOptions {
    /// URL (or path) of the remote manifest.
    pub manifest_url: String,
    /// Installation directory; the cache lives in its `cache` subdirectory.
    pub install_dir: PathBuf,
    /// Local state file.
    pub state_file: PathBuf,
    /// Arguments passed verbatim to the artifact.
    pub args: Vec<String>,
}

impl BootstrapOptions {
    /// Options installing into the current directory with no child arguments.
    pub fn new(manifest_url: impl Into<String>, state_file: impl Into<PathBuf>) -> Self {
        Self {
            manifest_url: manifest_url.into(),
            install_dir: PathBuf::from("."),
            state_file: state_file.into(),
            args: Vec::new(),
        }
    }

    /// Set the installation directory.
    #[must_use]
    pub fn install_dir(mut self, install_dir: impl Into<PathBuf>) -> Self {
        self.install_dir = install_dir.into();
        self
    }

    /// Set the arguments for the artifact.
    #[must_use]
    pub fn args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }
}

/// Result of a successful [`Bootstrapper::try_update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Nothing was downloaded.
    Skipped(UpdateDecision),
    /// A new artifact was installed and the state saved.
    Updated {
        /// Version now installed.
        version: String,
        /// Path of the new artifact.
        artifact: PathBuf,
    },
}

impl UpdateOutcome {
    /// Whether an update was installed.
    #[must_use]
    pub const fn is_updated(&self) -> bool {
        matches!(self, Self::Updated { .. })
    }
}

/// Values resolved from the manifest and the local state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Session {
    pub(crate) offline: bool,
    pub(crate) current_version: String,
    pub(crate) latest_version: String,
    pub(crate) name: String,
    pub(crate) executable_url: Option<String>,
    pub(crate) auto_update: bool,
    pub(crate) force_update: bool,
    pub(crate) raw_manifest: String,
}

impl Session {
    /// Apply the fallback rules to a fetched manifest (or none) and a state.
    pub(crate) fn resolve(fetched: Option<FetchedManifest>, state: LocalState) -> Self {
        let offline = fetched.is_none();
        let (raw_manifest, manifest) = match fetched {
            Some(fetched) => (fetched.raw, fetched.manifest),
            None => (OFFLINE_MANIFEST.to_string(), Default::default()),
        };

        let current_version = state.installed_version;
        let mut force_update = state.force_update;
        let mut latest_version = match manifest.version {
            Some(version) => version,
            None => {
                if !offline {
                    info!("No version in manifest, using current version as latest");
                }
                current_version.clone()
            }
        };

        if manifest.download_url.is_some() {
            info!("Latest version is {latest_version}");
        } else {
            if !offline {
                info!("No download URL for the latest version, staying on {current_version}");
            }
            latest_version.clone_from(&current_version);
            force_update = false;
        }

        Self {
            offline,
            name: manifest.name.unwrap_or(state.installed_product),
            current_version,
            latest_version,
            executable_url: manifest.download_url,
            auto_update: state.auto_update,
            force_update,
            raw_manifest,
        }
    }
}

/// Sequences manifest fetch, update and launch for one run.
pub struct Bootstrapper {
    options: BootstrapOptions,
    config: LauncherConfig,
    session: Session,
    downloader: ArtifactDownloader,
    launcher: ProcessLauncher,
    progress: Box<dyn UpdateProgress>,
}

impl Bootstrapper {
    /// Fetch the manifest, load the local state and resolve the session.
    ///
    /// Creates the install directory if it does not exist.
    ///
    /// # Errors
    ///
    /// - [`LauncherError::FirstRunOffline`] if the manifest is unavailable and
    ///   there is no state file
    /// - [`LauncherError::FileSystemError`] if the install directory cannot be created
    /// - [`LauncherError::NetworkError`] if no HTTP client can be built
    pub async fn init(options: BootstrapOptions, config: LauncherConfig) -> Result<Self, LauncherError> {
        let options = BootstrapOptions {
            install_dir: normalize_install_dir(&options.install_dir),
            ..options
        };

        let created = ensure_dir(&options.install_dir).map_err(|e| LauncherError::FileSystemError {
            operation: "creating install directory".to_string(),
            path: format!("{}: {e}", options.install_dir.display()),
        })?;
        if created {
            info!("First launch, created {}", options.install_dir.display());
        }

        let fetcher = ManifestFetcher::new(&config)?;
        let fetched = fetcher.fetch_manifest(&options.manifest_url).await;
        if fetched.is_none() {
            info!("No manifest available, switching to offline mode");
        }

        let state_exists = LocalStateStore::exists(&options.state_file);
        if state_exists {
            info!("Found local state at {}", options.state_file.display());
        }
        let state = LocalStateStore::load(&options.state_file);
        info!("Current version is {}", state.installed_version);

        let session = Session::resolve(fetched, state);
        if session.offline && !state_exists {
            return Err(LauncherError::FirstRunOffline {
                path: options.state_file.display().to_string(),
            });
        }

        Ok(Self {
            downloader: ArtifactDownloader::new(&config)?,
            launcher: ProcessLauncher::new(&config),
            options,
            config,
            session,
            progress: Box::new(NoProgress),
        })
    }

    /// Report update progress to `progress` instead of discarding it.
    #[must_use]
    pub fn with_progress(mut self, progress: Box<dyn UpdateProgress>) -> Self {
        self.progress = progress;
        self
    }

    /// Version recorded as installed.
    pub fn current_version(&self) -> &str {
        &self.session.current_version
    }

    /// Latest version after the fallback rules.
    pub fn latest_version(&self) -> &str {
        &self.session.latest_version
    }

    /// Product name used for cached artifacts.
    pub fn name(&self) -> &str {
        &self.session.name
    }

    pub fn manifest_url(&self) -> &str {
        &self.options.manifest_url
    }

    /// Manifest text without line breaks, `{}` when offline.
    pub fn raw_manifest(&self) -> &str {
        &self.session.raw_manifest
    }

    pub fn install_dir(&self) -> &Path {
        &self.options.install_dir
    }

    pub fn state_path(&self) -> &Path {
        &self.options.state_file
    }

    pub fn args(&self) -> &[String] {
        &self.options.args
    }

    /// Whether the current version equals the latest one.
    pub fn is_latest(&self) -> bool {
        self.session.current_version == self.session.latest_version
    }

    pub fn is_offline(&self) -> bool {
        self.session.offline
    }

    pub fn is_auto_update_enabled(&self) -> bool {
        self.session.auto_update
    }

    /// Whether a forced update is still pending for this run.
    pub fn is_force_update_pending(&self) -> bool {
        self.session.force_update
    }

    /// Download URL of the latest version, if the manifest has one.
    pub fn executable_url(&self) -> Option<&str> {
        self.session.executable_url.as_deref()
    }

    /// Path of the cached artifact for the current version.
    pub fn executable_path(&self) -> PathBuf {
        artifact_path(
            &self.options.install_dir.join(CACHE_DIR),
            &self.session.name,
            &self.session.current_version,
            &self.config.artifact_extension,
        )
    }

    /// No fallback artifact is kept besides the cached one.
    pub const fn has_fallback(&self) -> bool {
        false
    }

    /// Decide, and on a positive decision download and record the new version.
    ///
    /// # Errors
    ///
    /// Download errors leave the state untouched; a state that cannot be
    /// saved is reported as [`LauncherError::StatePersist`] even though the
    /// artifact was downloaded, so the next run retries the whole update.
    pub async fn try_update(&mut self) -> Result<UpdateOutcome, LauncherError> {
        let decision = plan(&PlanInput {
            offline: self.session.offline,
            current_version: &self.session.current_version,
            latest_version: &self.session.latest_version,
            auto_update: self.session.auto_update,
            force_update: self.session.force_update,
            artifact_present: self.executable_path().exists(),
        });

        if !decision.needs_update() {
            info!("Skipping update: {decision}");
            return Ok(UpdateOutcome::Skipped(decision));
        }

        let version = self.session.latest_version.clone();
        info!("Updating to version {version}: {decision}");
        self.progress.set_status_text(&format!("Updating to version {version}..."));

        let url = self.session.executable_url.as_deref().ok_or_else(|| {
            LauncherError::DownloadFailed {
                url: String::new(),
                reason: "the manifest provides no download URL".to_string(),
            }
        })?;

        let artifact = self
            .downloader
            .download(
                &self.options.install_dir.join(CACHE_DIR),
                &self.session.name,
                &version,
                url,
                self.progress.as_ref(),
            )
            .await?;

        let state = LocalState {
            installed_version: version.clone(),
            installed_product: self.session.name.clone(),
            auto_update: self.session.auto_update,
            force_update: false,
        };
        LocalStateStore::save(&self.options.state_file, &state)?;

        self.session.current_version.clone_from(&version);
        self.session.force_update = false;
        info!("Installed version {version}");

        Ok(UpdateOutcome::Updated {
            version,
            artifact,
        })
    }

    /// [`Bootstrapper::try_update`] reduced to "was an update installed".
    ///
    /// Failures are logged on the error channel.
    pub async fn update(&mut self) -> bool {
        match self.try_update().await {
            Ok(outcome) => outcome.is_updated(),
            Err(e) => {
                error!("Update failed: {e}");
                false
            }
        }
    }

    /// Run the cached artifact for the current version and return its exit code.
    ///
    /// Launch failures are logged and reported as `-1`.
    pub async fn launch(&self) -> i32 {
        let executable = self.executable_path();
        info!("Launching {}", executable.display());

        match self.launcher.launch(&executable, &self.options.args).await {
            Ok(code) => code,
            Err(e) => {
                error!("Failed to launch {}: {e}", executable.display());
                LAUNCH_FAILED_EXIT_CODE
            }
        }
    }

    /// Show progress, update, hide progress, then launch.
    pub async fn run_with_progress(&mut self, progress: Box<dyn UpdateProgress>) -> i32 {
        self.progress = progress;
        self.progress.show_progress();
        self.update().await;
        self.progress.hide_progress();
        self.launch().await
    }
}

/// Expand `~` and strip one trailing separator.
fn normalize_install_dir(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::tilde(&raw);
    let trimmed = match expanded.strip_suffix(['/', '\\']) {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => expanded.as_ref(),
    };
    PathBuf::from(trimmed)
}
