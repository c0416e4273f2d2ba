//! The `bootstrapper` binary end to end.

use assert_cmd::Command;
use bootstrapper::test_utils::ManifestFixture;
use predicates::prelude::*;
use serde_json::json;

use crate::common::Workspace;

#[test]
fn test_help_lists_options() {
    Command::cargo_bin("bootstrapper")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--url"))
        .stdout(predicate::str::contains("--state-file"))
        .stdout(predicate::str::contains("--path"));
}

#[test]
fn test_missing_url_is_a_usage_error() {
    Command::cargo_bin("bootstrapper")
        .unwrap()
        .env_remove("BOOTSTRAPPER_URL")
        .args(["--state-file", "meta.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--url"));
}

#[test]
fn test_first_run_offline_exits_with_one() {
    let ws = Workspace::new();
    let missing = ws.manifest_path().display().to_string();

    ws.command(&missing)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("internet connection is required"));
    assert!(!ws.state_file().exists());
}

#[test]
fn test_missing_config_file_exits_with_one() {
    let ws = Workspace::new();
    ws.write_state(r#"{"installedVersion":"1"}"#);

    ws.command("unused")
        .arg("--config")
        .arg(ws.root().join("nope.toml"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nope.toml"));
}

#[test]
fn test_invalid_config_file_exits_with_one() {
    let ws = Workspace::new();
    let config = ws.root().join("bad.toml");
    std::fs::write(&config, "artifact_extension = \".jar\"\n").unwrap();

    ws.command("unused")
        .arg("--config")
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("artifact_extension"));
}

#[cfg(unix)]
#[test]
fn test_install_and_launch_relays_exit_code() {
    let ws = Workspace::new();
    let release = ws.publish_release("2", 3);
    let url = ws.write_manifest(&ManifestFixture::new("App", "2").download_url(release));
    let config = ws.write_config("");

    ws.command(&url)
        .arg("--config")
        .arg(&config)
        .args(["--", "--level", "two words"])
        .assert()
        .code(3);

    assert_eq!(ws.runs(), vec!["2 --level two words"]);
    assert_eq!(
        ws.state(),
        json!({"installedVersion": "2", "installedProduct": "App", "autoUpdate": true, "forceUpdate": false})
    );
    assert!(ws.cache_file("App-v2.sh").exists());
}

#[cfg(unix)]
#[test]
fn test_offline_launches_cached_version() {
    let ws = Workspace::new();
    let release = ws.publish_release("1", 0);
    let url = ws.write_manifest(&ManifestFixture::new("App", "1").download_url(release));
    let config = ws.write_config("");

    ws.command(&url).arg("--config").arg(&config).assert().success();
    std::fs::remove_file(ws.manifest_path()).unwrap();

    ws.command(&url).arg("--config").arg(&config).arg("--").arg("offline").assert().success();
    assert_eq!(ws.runs(), vec!["1 ", "1 offline"]);
}

#[cfg(unix)]
#[test]
fn test_info_channel_reports_progress_of_run() {
    let ws = Workspace::new();
    let release = ws.publish_release("5", 0);
    let url = ws.write_manifest(&ManifestFixture::new("App", "5").download_url(release));
    let config = ws.write_config("");

    ws.command(&url)
        .arg("--config")
        .arg(&config)
        .arg("--log")
        .env("RUST_LOG", "info")
        .assert()
        .success()
        .stdout(predicate::str::contains("Updating to version 5"))
        .stdout(predicate::str::contains("Launching"));
}

#[test]
fn test_error_channel_alone_writes_only_to_stderr() {
    let ws = Workspace::new();
    ws.write_state(r#"{"installedVersion":"1","installedProduct":"App"}"#);
    let config = ws.write_config("");

    ws.command("http://127.0.0.1:9/meta.json")
        .arg("--config")
        .arg(&config)
        .arg("--errors")
        .env("RUST_LOG", "info")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Error fetching data"))
        .stderr(predicate::str::contains("Failed to launch"));
}

#[cfg(unix)]
#[test]
fn test_quiet_run_prints_nothing_of_its_own() {
    let ws = Workspace::new();
    ws.write_state(r#"{"installedVersion":"1","installedProduct":"App"}"#);
    let missing = ws.manifest_path().display().to_string();
    let config = ws.write_config("");

    // Offline with no cached artifact: the launch fails and reports -1
    ws.command(&missing)
        .arg("--config")
        .arg(&config)
        .arg("--quiet")
        .assert()
        .code(255)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

#[cfg(unix)]
#[test]
fn test_restart_through_binary() {
    let ws = Workspace::new();
    let log = ws.run_log();
    let body = format!(
        "#!/bin/sh\necho run >> \"{0}\"\nif [ \"$(wc -l < \"{0}\")\" -lt 3 ]; then exit 254; fi\nexit 6\n",
        log.display()
    );
    let release = ws.publish_raw("1", &body);
    let url = ws.write_manifest(&ManifestFixture::new("App", "1").download_url(release));
    let config = ws.write_config("[restart]\nmin_interval_ms = 0\n");

    ws.command(&url).arg("--config").arg(&config).assert().code(6);
    assert_eq!(ws.runs().len(), 3);
}
