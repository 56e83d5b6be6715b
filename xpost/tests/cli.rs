//! CLI integration tests for xpost

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CREDENTIAL_VARS: [&str; 4] = [
    "X_API_KEY",
    "X_API_SECRET",
    "X_ACCESS_TOKEN",
    "X_ACCESS_TOKEN_SECRET",
];

/// Write a config file pointing every endpoint at `base`
fn write_config(dir: &Path, base: &str) -> PathBuf {
    let config_path = dir.join("config.toml");
    fs::write(
        &config_path,
        format!(
            r#"
[api]
post_endpoint = "{base}/2/tweets"
upload_endpoint = "{base}/2/media/upload"
site_root = "{base}"
timeout_secs = 5
"#
        ),
    )
    .unwrap();
    config_path
}

/// xpost with a clean environment, all credentials set and the given config
fn xpost(config_path: &Path) -> Command {
    let mut cmd = Command::cargo_bin("xpost").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("XPOST_LOG_FORMAT")
        .env_remove("XPOST_LOG_LEVEL")
        .env("XPOST_CONFIG", config_path);
    for var in CREDENTIAL_VARS {
        cmd.env(var, format!("test-{}", var.to_lowercase()));
    }
    cmd
}

#[test]
fn test_help_flag_output() {
    let mut cmd = Command::cargo_bin("xpost").unwrap();

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Publish a post to X"))
        .stdout(predicate::str::contains("--strategy"))
        .stdout(predicate::str::contains("--format"))
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("X_ACCESS_TOKEN_SECRET"));
}

#[test]
fn test_missing_text_is_usage_error() {
    let mut cmd = Command::cargo_bin("xpost").unwrap();

    cmd.assert().failure().code(2);
}

#[test]
fn test_invalid_strategy_is_usage_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(temp_dir.path(), "http://127.0.0.1:9");

    xpost(&config_path)
        .args(["hello", "--strategy", "chunked"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Invalid upload strategy"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_missing_credential_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(temp_dir.path(), &server.uri());

    xpost(&config_path)
        .env_remove("X_ACCESS_TOKEN_SECRET")
        .arg("hello world")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("X_ACCESS_TOKEN_SECRET"))
        .stderr(predicate::str::contains("X_API_KEY").not());

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[test]
fn test_all_credentials_missing_are_listed() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(temp_dir.path(), "http://127.0.0.1:9");

    let mut cmd = xpost(&config_path);
    for var in CREDENTIAL_VARS {
        cmd.env_remove(var);
    }

    let output = cmd.arg("hello").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    for var in CREDENTIAL_VARS {
        assert!(stderr.contains(var), "{var} missing from: {stderr}");
    }
}

#[test]
fn test_empty_text_exits_3() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(temp_dir.path(), "http://127.0.0.1:9");

    let output = xpost(&config_path).arg("   ").output().unwrap();

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Error:"));
    assert!(stderr.contains("cannot be empty"));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_malformed_config_exits_1() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "[api\npost_endpoint = ").unwrap();

    xpost(&config_path)
        .arg("hello")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_text_post_prints_permalink() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(body_json(json!({"text": "hello world"})))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"data": {"id": "42", "text": "hello world"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(temp_dir.path(), &server.uri());

    xpost(&config_path)
        .arg("hello world")
        .assert()
        .success()
        .stdout(predicate::str::contains("Post ID: 42"))
        .stdout(predicate::str::contains(format!(
            "URL: {}/i/web/status/42",
            server.uri()
        )));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_explicit_config_flag_overrides_env() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": "50"}})))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let unreachable = write_config(temp_dir.path(), "http://127.0.0.1:9");
    let explicit_dir = TempDir::new().unwrap();
    let explicit = write_config(explicit_dir.path(), &server.uri());

    xpost(&unreachable)
        .arg("hello")
        .arg("--config")
        .arg(&explicit)
        .assert()
        .success()
        .stdout(predicate::str::contains("Post ID: 50"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_upload_rejection_still_succeeds_with_warning() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/media/upload"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(body_json(json!({"text": "with photo"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": "45"}})))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(temp_dir.path(), &server.uri());
    let image = temp_dir.path().join("photo.jpg");
    fs::write(&image, b"\xff\xd8\xff\xe0jpeg").unwrap();

    let output = xpost(&config_path)
        .arg("with photo")
        .arg(&image)
        .args(["--format", "json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Warning:"));
    assert!(stderr.contains("401"));

    let result: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["post_id"], "45");
    assert_eq!(result["url"], format!("{}/i/web/status/45", server.uri()));
    assert_eq!(result["media_ids"], json!([]));
    assert!(result["attachment_error"].as_str().unwrap().contains("HTTP 401"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_attachment_json_output_lists_media() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/media/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"id": "9001"}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(body_json(json!({"text": "pic", "media": {"media_ids": ["9001"]}})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": "46"}})))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(temp_dir.path(), &server.uri());
    let image = temp_dir.path().join("photo.png");
    fs::write(&image, b"\x89PNG").unwrap();

    let output = xpost(&config_path)
        .arg("pic")
        .arg(&image)
        .args(["--format", "json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let result: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["media_ids"], json!(["9001"]));
    assert_eq!(result["attachment_error"], Value::Null);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_legacy_strategy_flag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/media/upload"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"media_id": 77, "media_id_string": "77"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(body_json(json!({"text": "old api", "media": {"media_ids": ["77"]}})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": "47"}})))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(temp_dir.path(), &server.uri());
    let image = temp_dir.path().join("photo.gif");
    fs::write(&image, b"GIF89a").unwrap();

    xpost(&config_path)
        .arg("old api")
        .arg(&image)
        .args(["--strategy", "legacy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Media ID: 77"));

    let received = server.received_requests().await.unwrap();
    let upload_body = String::from_utf8_lossy(&received[0].body).into_owned();
    assert!(!upload_body.contains("media_category"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_missing_attachment_posts_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(body_json(json!({"text": "no file"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": "48"}})))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(temp_dir.path(), &server.uri());

    xpost(&config_path)
        .arg("no file")
        .arg(temp_dir.path().join("absent.png"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Post ID: 48"))
        .stderr(predicate::str::contains("Warning:").not());

    // A nonexistent attachment path is ignored, so the only request is the post
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_post_rejection_exits_1() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(temp_dir.path(), &server.uri());

    xpost(&config_path)
        .arg("hello")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Error:"))
        .stderr(predicate::str::contains("HTTP 403"))
        .stderr(predicate::str::contains("Forbidden"));
}
