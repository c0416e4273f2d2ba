//! Update decisions and their effects on the cache and the state file.

use bootstrapper::bootstrapper::{BootstrapOptions, Bootstrapper, UpdateOutcome};
use bootstrapper::planner::UpdateDecision;
use bootstrapper::test_utils::ManifestFixture;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::Workspace;

fn options(ws: &Workspace, manifest_url: String) -> BootstrapOptions {
    BootstrapOptions::new(manifest_url, ws.state_file()).install_dir(ws.install_dir())
}

#[tokio::test]
async fn test_first_install_over_http() {
    let ws = Workspace::new();
    let server = MockServer::start().await;
    let manifest = ManifestFixture::new("App", "2").download_url(format!("{}/app.bin", server.uri()));
    Mock::given(method("GET"))
        .and(path("/meta.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(manifest.to_json()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/app.bin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 64 * 1024]))
        .expect(1)
        .mount(&server)
        .await;

    let mut bootstrapper = Bootstrapper::init(options(&ws, format!("{}/meta.json", server.uri())), ws.script_config())
        .await
        .unwrap();
    assert!(bootstrapper.update().await);

    assert_eq!(
        ws.state(),
        json!({"installedVersion": "2", "installedProduct": "App", "autoUpdate": true, "forceUpdate": false})
    );
    let artifact = ws.cache_file("App-v2.sh");
    assert_eq!(std::fs::metadata(&artifact).unwrap().len(), 64 * 1024);
    assert_eq!(bootstrapper.executable_path(), artifact);
}

#[tokio::test]
async fn test_new_version_replaces_cached_artifact() {
    let ws = Workspace::new();
    let v1 = ws.publish_release("1", 0);
    let v2 = ws.publish_release("2", 0);

    let url = ws.write_manifest(&ManifestFixture::new("App", "1").download_url(v1));
    let mut first = Bootstrapper::init(options(&ws, url.clone()), ws.script_config()).await.unwrap();
    assert!(first.update().await);
    assert!(ws.cache_file("App-v1.sh").exists());

    ws.write_manifest(&ManifestFixture::new("App", "2").download_url(v2));
    let mut second = Bootstrapper::init(options(&ws, url), ws.script_config()).await.unwrap();
    assert_eq!(second.current_version(), "1");
    assert!(!second.is_latest());

    let outcome = second.try_update().await.unwrap();
    assert_eq!(
        outcome,
        UpdateOutcome::Updated {
            version: "2".to_string(),
            artifact: ws.cache_file("App-v2.sh"),
        }
    );
    assert!(!ws.cache_file("App-v1.sh").exists());
    assert_eq!(ws.state()["installedVersion"], "2");
}

#[tokio::test]
async fn test_older_version_string_is_still_an_update() {
    let ws = Workspace::new();
    let release = ws.publish_release("1.9", 0);
    ws.write_state(r#"{"installedVersion":"2.0","installedProduct":"App"}"#);
    std::fs::create_dir_all(ws.install_dir().join("cache")).unwrap();
    std::fs::write(ws.cache_file("App-v2.0.sh"), "exit 0").unwrap();

    let url = ws.write_manifest(&ManifestFixture::new("App", "1.9").download_url(release));
    let mut bootstrapper = Bootstrapper::init(options(&ws, url), ws.script_config()).await.unwrap();

    assert!(bootstrapper.update().await);
    assert_eq!(bootstrapper.current_version(), "1.9");
    assert!(!ws.cache_file("App-v2.0.sh").exists());
}

#[tokio::test]
async fn test_forced_reinstall_of_same_version() {
    let ws = Workspace::new();
    let release = ws.publish_raw("3", "#!/bin/sh\nexit 0\n");
    ws.write_state(r#"{"installedVersion":"3","installedProduct":"App","forceUpdate":true}"#);
    std::fs::create_dir_all(ws.install_dir().join("cache")).unwrap();
    std::fs::write(ws.cache_file("App-v3.sh"), "corrupted").unwrap();

    let url = ws.write_manifest(&ManifestFixture::new("App", "3").download_url(release));
    let mut bootstrapper = Bootstrapper::init(options(&ws, url.clone()), ws.script_config()).await.unwrap();
    assert!(bootstrapper.update().await);

    assert_eq!(std::fs::read_to_string(ws.cache_file("App-v3.sh")).unwrap(), "#!/bin/sh\nexit 0\n");
    assert_eq!(ws.state()["forceUpdate"], false);

    // The flag is one-shot
    let mut next = Bootstrapper::init(options(&ws, url), ws.script_config()).await.unwrap();
    assert_eq!(next.try_update().await.unwrap(), UpdateOutcome::Skipped(UpdateDecision::UpToDate));
}

#[tokio::test]
async fn test_deleted_artifact_is_downloaded_again() {
    let ws = Workspace::new();
    let release = ws.publish_release("4", 0);
    ws.write_state(r#"{"installedVersion":"4","installedProduct":"App","autoUpdate":false}"#);

    let url = ws.write_manifest(&ManifestFixture::new("App", "4").download_url(release));
    let mut bootstrapper = Bootstrapper::init(options(&ws, url), ws.script_config()).await.unwrap();

    let outcome = bootstrapper.try_update().await.unwrap();
    assert!(outcome.is_updated());
    assert!(ws.cache_file("App-v4.sh").exists());
    assert_eq!(ws.state()["autoUpdate"], false);
}

#[tokio::test]
async fn test_unknown_state_fields_are_dropped_on_save() {
    let ws = Workspace::new();
    let release = ws.publish_release("2", 0);
    ws.write_state(r#"{"installedVersion":"1","installedProduct":"App","channel":"beta"}"#);

    let url = ws.write_manifest(&ManifestFixture::new("App", "2").download_url(release));
    let mut bootstrapper = Bootstrapper::init(options(&ws, url), ws.script_config()).await.unwrap();
    assert!(bootstrapper.update().await);

    assert_eq!(
        ws.state(),
        json!({"installedVersion": "2", "installedProduct": "App", "autoUpdate": true, "forceUpdate": false})
    );
}

#[tokio::test]
async fn test_failed_download_leaves_state_for_retry() {
    let ws = Workspace::new();
    let state = r#"{"installedVersion":"1","installedProduct":"App"}"#;
    ws.write_state(state);
    std::fs::create_dir_all(ws.install_dir().join("cache")).unwrap();
    std::fs::write(ws.cache_file("App-v1.sh"), "exit 0").unwrap();

    let missing = ws.root().join("releases").join("missing.sh");
    let url = ws.write_manifest(&ManifestFixture::new("App", "2").download_url(missing.display().to_string()));
    let mut bootstrapper = Bootstrapper::init(options(&ws, url.clone()), ws.script_config()).await.unwrap();

    assert!(!bootstrapper.update().await);
    assert_eq!(bootstrapper.current_version(), "1");
    assert_eq!(std::fs::read_to_string(ws.state_file()).unwrap(), state);
    assert!(!ws.cache_file("App-v2.sh").exists());

    // Stale versions were evicted before the download, so the next run
    // retries because the artifact is missing
    let release = ws.publish_release("2", 0);
    ws.write_manifest(&ManifestFixture::new("App", "2").download_url(release));
    let mut retry = Bootstrapper::init(options(&ws, url), ws.script_config()).await.unwrap();
    assert_eq!(
        retry.try_update().await.unwrap(),
        UpdateOutcome::Updated {
            version: "2".to_string(),
            artifact: ws.cache_file("App-v2.sh"),
        }
    );
}
