//! Command-line interface for the bootstrapper.
//!
//! ```bash
//! bootstrapper --url https://example.com/meta.json --state-file bootstrapper-meta.json \
//!     --path ~/.local/share/app --progress -- --child-flag value
//! ```
//!
//! Everything after `--` is passed verbatim to the launched artifact. The
//! process exits with the artifact's exit code, or `1` when initialization
//! fails (for example on a first run without network access).
//!
//! # Configuration Precedence
//!
//! 1. Command-line flags (`--log`, `--errors`, `--quiet`, `--progress`)
//! 2. The TOML file given with `--config`
//! 3. Built-in defaults
//!
//! # Environment Variables
//!
//! - `BOOTSTRAPPER_URL`: manifest URL when `--url` is not given
//! - `BOOTSTRAPPER_CONFIG`: configuration file when `--config` is not given
//! - `BOOTSTRAPPER_NO_PROGRESS`: keep the spinner hidden even with `--progress`
//! - `RUST_LOG`: verbosity inside the enabled log channels

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::bootstrapper::{BootstrapOptions, Bootstrapper};
use crate::config::LauncherConfig;
use crate::utils::logging;
use crate::utils::progress::{NoProgress, SpinnerProgress, UpdateProgress};


/// Overrides the command line applies on top of the configuration file.
///
/// `None` keeps the file's (or the default) value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Informational log channel.
    pub log_info: Option<bool>,
    /// Error log channel.
    pub log_errors: Option<bool>,
    /// Progress spinner.
    pub show_progress: Option<bool>,
    /// Configuration file to load.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the overrides to a loaded configuration.
    pub fn apply_to(&self, config: &mut LauncherConfig) {
        if let Some(info) = self.log_info {
            config.logging.info = info;
        }
        if let Some(errors) = self.log_errors {
            config.logging.errors = errors;
        }
        if let Some(show) = self.show_progress {
            config.show_progress = show;
        }
    }
}

/// Self-updating application launcher.
#[derive(Parser, Debug)]
#[command(
    name = "bootstrapper",
    about = "Keep an application up to date from a remote manifest and launch it",
    version,
    long_about = "Fetches a remote manifest, downloads a newer artifact into the local cache when needed, \
                  records the installed version and launches the cached artifact, relaying its exit code."
)]
pub struct Cli {
    /// URL of the remote manifest (http, https, file or a local path).
    #[arg(long, env = "BOOTSTRAPPER_URL", value_name = "URL")]
    url: String,

    /// Local state file recording the installed version.
    #[arg(long, value_name = "FILE")]
    state_file: PathBuf,

    /// Installation directory; artifacts are cached in its `cache` subdirectory.
    #[arg(long, value_name = "DIR", default_value = ".")]
    path: PathBuf,

    /// Launcher configuration file (TOML).
    #[arg(long, env = "BOOTSTRAPPER_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable informational log output on stdout.
    #[arg(long)]
    log: bool,

    /// Enable error log output on stderr.
    #[arg(long)]
    errors: bool,

    /// Disable both log channels.
    #[arg(short, long, conflicts_with_all = ["log", "errors"])]
    quiet: bool,

    /// Show a progress spinner while updating.
    #[arg(long)]
    progress: bool,

    /// Arguments passed to the launched application.
    #[arg(last = true, value_name = "ARGS")]
    args: Vec<String>,
}

impl Cli {
    /// Build the overrides from the parsed flags.
    ///
    /// Flags only ever switch things on, except `--quiet`, which turns both
    /// log channels off.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let (log_info, log_errors) = if self.quiet {
            (Some(false), Some(false))
        } else {
            (self.log.then_some(true), self.errors.then_some(true))
        };

        CliConfig {
            log_info,
            log_errors,
            show_progress: self.progress.then_some(true),
            config_path: self.config.clone(),
        }
    }

    /// Options for the orchestrator.
    #[must_use]
    pub fn bootstrap_options(&self) -> BootstrapOptions {
        BootstrapOptions::new(self.url.clone(), self.state_file.clone())
            .install_dir(self.path.clone())
            .args(self.args.clone())
    }

    /// Run the launcher and return the exit code for the process.
    pub async fn execute(self) -> Result<i32> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Run with explicit overrides instead of the parsed flags.
    ///
    /// # Errors
    ///
    /// Configuration and initialization failures; everything after
    /// initialization is reported through the exit code.
    pub async fn execute_with_config(self, cli_config: CliConfig) -> Result<i32> {
        let mut config = LauncherConfig::load_with_optional(cli_config.config_path.as_deref()).await?;
        cli_config.apply_to(&mut config);
        logging::init(config.logging);

        let progress: Box<dyn UpdateProgress> = if config.show_progress {
            Box::new(SpinnerProgress::new())
        } else {
            Box::new(NoProgress)
        };

        let mut bootstrapper = Bootstrapper::init(self.bootstrap_options(), config).await?;
        Ok(bootstrapper.run_with_progress(progress).await)
    }
}
