//! Child process launch and the restart protocol
//!
//! The artifact runs as a child process that inherits stdin, stdout and
//! stderr, and is awaited without a timeout. Its exit code is relayed to the
//! caller, with one exception: exit code `-2` asks the launcher to start the
//! same artifact again with the same arguments. Unix only keeps the low eight
//! bits of an exit status, so there `-2` arrives as `254` and both values
//! count as a restart request.
//!
//! Relaunching is an explicit loop bounded by [`RestartPolicy`]: at most
//! `max_restarts` relaunches, and never sooner than `min_interval` after the
//! previous start.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::{LauncherConfig, RestartPolicy};
use crate::core::LauncherError;

/// Exit code a child uses to request a relaunch.
pub const RESTART_EXIT_CODE: i32 = -2;

/// Exit code reported when the launch fails or the child has no exit code.
pub const LAUNCH_FAILED_EXIT_CODE: i32 = -1;

/// Whether `code` is a restart request on this platform.
#[must_use]
pub fn is_restart_request(code: i32) -> bool {
    code == RESTART_EXIT_CODE || (cfg!(unix) && code == RESTART_EXIT_CODE & 0xff)
}

/// Starts the cached artifact.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    runner: Vec<String>,
    restart: RestartPolicy,
}

impl ProcessLauncher {
    /// Create a launcher with the runner and restart policy of `config`.
    #[must_use]
    pub fn new(config: &LauncherConfig) -> Self {
        Self {
            runner: config.runner.clone(),
            restart: config.restart,
        }
    }

    /// Run `executable` with `args` until it exits without requesting a restart.
    ///
    /// Returns the last exit code; `-1` if the child was terminated by a signal.
    ///
    /// # Errors
    ///
    /// - [`LauncherError::ExecutableNotFound`] if `executable` does not exist
    /// - [`LauncherError::RunnerNotFound`] if the runner is not on `PATH`
    /// - [`LauncherError::SpawnFailed`] if the process cannot be started
    pub async fn launch(&self, executable: &Path, args: &[String]) -> Result<i32, LauncherError> {
        if !executable.exists() {
            return Err(LauncherError::ExecutableNotFound {
                path: executable.display().to_string(),
            });
        }

        let (program, program_args) = self.command_line(executable, args)?;
        let mut restarts: u32 = 0;

        loop {
            let started = Instant::now();
            let code = run_once(&program, &program_args, executable).await?;

            if !is_restart_request(code) {
                debug!("Process exited with code {code}");
                return Ok(code);
            }

            if !self.restart.allows(restarts) {
                warn!("Restart requested but the limit of {restarts} restarts is reached");
                return Ok(code);
            }
            restarts += 1;

            let elapsed = started.elapsed();
            let min_interval = self.restart.min_interval();
            if elapsed < min_interval {
                tokio::time::sleep(min_interval - elapsed).await;
            }
            info!("Restart requested, relaunching {} (restart {restarts})", executable.display());
        }
    }

    fn command_line(
        &self,
        executable: &Path,
        args: &[String],
    ) -> Result<(PathBuf, Vec<String>), LauncherError> {
        let Some((runner, runner_args)) = self.runner.split_first() else {
            return Ok((executable.to_path_buf(), args.to_vec()));
        };

        let program = which::which(runner).map_err(|e| LauncherError::RunnerNotFound {
            program: format!("{runner} ({e})"),
        })?;

        let mut program_args = runner_args.to_vec();
        program_args.push(executable.display().to_string());
        program_args.extend_from_slice(args);
        Ok((program, program_args))
    }
}

async fn run_once(program: &Path, args: &[String], executable: &Path) -> Result<i32, LauncherError> {
    debug!("Launching {} {}", program.display(), args.join(" "));

    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| LauncherError::SpawnFailed {
            path: executable.display().to_string(),
            reason: e.to_string(),
        })?;

    Ok(status.code().unwrap_or_else(|| {
        warn!("Process was terminated without an exit code");
        LAUNCH_FAILED_EXIT_CODE
    }))
}
