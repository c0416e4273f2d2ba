//! Common test utilities and fixtures for bootstrapper integration tests
//!
//! A [`Workspace`] is a temporary directory holding everything one run
//! needs: a manifest file, an install directory, a state file and a
//! "release" directory with artifacts served through plain file paths.

// Not every helper is used by every test module
#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use bootstrapper::config::LauncherConfig;
use bootstrapper::test_utils::ManifestFixture;

/// Temporary directory layout for one launcher run.
pub struct Workspace {
    pub temp: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        bootstrapper::test_utils::init_test_logging(None);
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("releases")).unwrap();
        Self {
            temp,
        }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn install_dir(&self) -> PathBuf {
        self.root().join("install")
    }

    pub fn state_file(&self) -> PathBuf {
        self.root().join("bootstrapper-meta.json")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root().join("meta.json")
    }

    pub fn cache_file(&self, name: &str) -> PathBuf {
        self.install_dir().join("cache").join(name)
    }

    /// Log file the release scripts append their arguments to.
    pub fn run_log(&self) -> PathBuf {
        self.root().join("runs.log")
    }

    /// Lines written by launched artifacts so far.
    pub fn runs(&self) -> Vec<String> {
        fs::read_to_string(self.run_log())
            .map(|content| content.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Publish a release script that records its arguments and exits with `code`.
    ///
    /// Returns the path to use as `downloadUrl`.
    pub fn publish_release(&self, version: &str, code: i32) -> String {
        let body = format!(
            "#!/bin/sh\necho \"{version} $*\" >> \"{}\"\nexit {code}\n",
            self.run_log().display()
        );
        self.publish_raw(version, &body)
    }

    /// Publish a release with an arbitrary script body.
    pub fn publish_raw(&self, version: &str, body: &str) -> String {
        let path = self.root().join("releases").join(format!("app-{version}.sh"));
        fs::write(&path, body).unwrap();
        path.display().to_string()
    }

    /// Write the manifest file and return its path as the manifest URL.
    pub fn write_manifest(&self, manifest: &ManifestFixture) -> String {
        manifest.write_to(&self.manifest_path()).unwrap()
    }

    pub fn write_state(&self, json: &str) {
        bootstrapper::test_utils::write_state(&self.state_file(), json).unwrap();
    }

    pub fn state(&self) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(self.state_file()).unwrap()).unwrap()
    }

    /// Launcher configuration running `.sh` artifacts through `sh`.
    pub fn script_config(&self) -> LauncherConfig {
        LauncherConfig {
            runner: vec!["sh".to_string()],
            artifact_extension: "sh".to_string(),
            ..LauncherConfig::default()
        }
    }

    /// Write [`Workspace::script_config`] plus `extra` TOML to a config file.
    pub fn write_config(&self, extra: &str) -> PathBuf {
        let path = self.root().join("launcher.toml");
        let content = format!("artifact_extension = \"sh\"\nrunner = [\"sh\"]\n{extra}");
        fs::write(&path, content).unwrap();
        path
    }

    /// The binary, pointed at this workspace and with progress disabled.
    pub fn command(&self, manifest_url: &str) -> Command {
        let mut cmd = Command::cargo_bin("bootstrapper").unwrap();
        cmd.current_dir(self.root())
            .env("BOOTSTRAPPER_NO_PROGRESS", "1")
            .env_remove("BOOTSTRAPPER_URL")
            .env_remove("BOOTSTRAPPER_CONFIG")
            .arg("--url")
            .arg(manifest_url)
            .arg("--state-file")
            .arg(self.state_file())
            .arg("--path")
            .arg(self.install_dir());
        cmd
    }
}
