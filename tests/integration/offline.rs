//! Runs where the manifest cannot be fetched or parsed.

use bootstrapper::bootstrapper::{BootstrapOptions, Bootstrapper, UpdateOutcome};
use bootstrapper::core::LauncherError;
use bootstrapper::planner::UpdateDecision;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::Workspace;

fn options(ws: &Workspace, manifest_url: &str) -> BootstrapOptions {
    BootstrapOptions::new(manifest_url, ws.state_file()).install_dir(ws.install_dir())
}

#[tokio::test]
async fn test_unreachable_manifest_targets_cached_artifact() {
    let ws = Workspace::new();
    ws.write_state(r#"{"installedVersion":"1","installedProduct":"App"}"#);
    let missing = ws.manifest_path();

    let mut bootstrapper =
        Bootstrapper::init(options(&ws, &missing.display().to_string()), ws.script_config()).await.unwrap();

    assert!(bootstrapper.is_offline());
    assert!(bootstrapper.is_latest());
    assert_eq!(bootstrapper.executable_url(), None);
    assert_eq!(bootstrapper.executable_path(), ws.cache_file("App-v1.sh"));
    assert_eq!(
        bootstrapper.try_update().await.unwrap(),
        UpdateOutcome::Skipped(UpdateDecision::Offline)
    );
}

#[tokio::test]
async fn test_malformed_manifests_mean_offline() {
    let server = MockServer::start().await;
    let bodies = [
        "",
        "not json",
        "[1, 2, 3]",
        "\"App\"",
        "null",
        r#"{"name":"../outside","version":"2","downloadUrl":"http://127.0.0.1:9/app"}"#,
    ];
    for (index, body) in bodies.iter().enumerate() {
        Mock::given(method("GET"))
            .and(wiremock::matchers::path(format!("/meta-{index}.json")))
            .respond_with(ResponseTemplate::new(200).set_body_string(*body))
            .mount(&server)
            .await;
    }

    for index in 0..bodies.len() {
        let ws = Workspace::new();
        ws.write_state(r#"{"installedVersion":"1","forceUpdate":true}"#);
        let url = format!("{}/meta-{index}.json", server.uri());

        let mut bootstrapper = Bootstrapper::init(options(&ws, &url), ws.script_config()).await.unwrap();
        assert!(bootstrapper.is_offline(), "body {:?} should be rejected", bodies[index]);
        assert!(!bootstrapper.update().await);
    }
}

#[tokio::test]
async fn test_server_error_means_offline() {
    let ws = Workspace::new();
    ws.write_state(r#"{"installedVersion":"1"}"#);
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let bootstrapper = Bootstrapper::init(options(&ws, &format!("{}/meta.json", server.uri())), ws.script_config())
        .await
        .unwrap();
    assert!(bootstrapper.is_offline());
    assert_eq!(bootstrapper.raw_manifest(), "{}");
}

#[tokio::test]
async fn test_first_run_offline_is_refused() {
    let ws = Workspace::new();
    let missing = ws.manifest_path();

    let result = Bootstrapper::init(options(&ws, &missing.display().to_string()), ws.script_config()).await;
    let Err(err) = result else {
        panic!("first run without a manifest must fail");
    };

    assert!(matches!(err, LauncherError::FirstRunOffline { .. }));
    assert!(err.to_string().contains("internet connection is required"));
}

#[tokio::test]
async fn test_corrupt_state_file_still_counts_as_existing() {
    let ws = Workspace::new();
    ws.write_state("{ this is not json");
    let missing = ws.manifest_path();

    let bootstrapper =
        Bootstrapper::init(options(&ws, &missing.display().to_string()), ws.script_config()).await.unwrap();
    assert_eq!(bootstrapper.current_version(), "0");
    assert_eq!(bootstrapper.name(), "application");
}
