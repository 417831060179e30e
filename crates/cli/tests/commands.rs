//! Command execution with a scripted c2patool.

#![cfg(unix)]

use c2pa_verifier_cli::cli::{Cli, CliError, EXIT_FAILED, EXIT_OK};
use clap::Parser;
use serde_json::Value;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("c2patool");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn input(dir: &Path) -> PathBuf {
    let path = dir.join("upload.jpg");
    std::fs::write(&path, b"jpeg bytes").unwrap();
    path
}

fn cli(args: &[&str]) -> Cli {
    let mut argv = vec!["c2pa-verify"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

async fn verify(tool_body: &str) -> (Value, i32, TempDir) {
    let temp = TempDir::new().unwrap();
    let tool = script(temp.path(), tool_body);
    let file = input(temp.path());

    let output = c2pa_verifier_cli::run(cli(&[
        "verify",
        file.to_str().unwrap(),
        "--tool-path",
        tool.to_str().unwrap(),
        "--install-dir",
        temp.path().to_str().unwrap(),
    ]))
    .await
    .unwrap();

    let envelope = serde_json::from_str(&output.stdout).unwrap();
    (envelope, output.exit_code, temp)
}

#[tokio::test]
async fn verify_prints_success_envelope() {
    let (envelope, code, _temp) = verify(r#"echo '{"status":"ok","active_manifest":"urn:1"}'"#).await;

    assert_eq!(code, EXIT_OK);
    assert_eq!(envelope["success"], true);
    assert_eq!(envelope["data"]["status"], "ok");
    assert_eq!(envelope["data"]["active_manifest"], "urn:1");
    assert_eq!(envelope["data"]["hasProvenanceData"], true);
    assert!(envelope["timestamp"].is_string());
}

#[tokio::test]
async fn verify_reports_absent_as_success() {
    let (envelope, code, _temp) = verify("echo 'No claim found' >&2; exit 1").await;

    assert_eq!(code, EXIT_OK);
    assert_eq!(envelope["success"], true);
    assert_eq!(envelope["data"]["hasProvenanceData"], false);
    assert_eq!(envelope["data"]["status"], "No provenance metadata detected");
}

#[tokio::test]
async fn verify_failure_uses_public_message() {
    let (envelope, code, temp) = verify(r#"printf '{"manifest"'"#).await;

    assert_eq!(code, EXIT_FAILED);
    assert_eq!(envelope["success"], false);
    assert_eq!(envelope["error"], "Invalid output from verification tool");
    assert!(envelope.get("data").is_none());
    assert!(temp.path().join("upload.jpg").is_file());
}

#[tokio::test]
async fn verify_missing_input_hides_path() {
    let temp = TempDir::new().unwrap();
    let tool = script(temp.path(), r#"echo '{}'"#);
    let missing = temp.path().join("secret-name.jpg");

    let output = c2pa_verifier_cli::run(cli(&[
        "verify",
        missing.to_str().unwrap(),
        "--tool-path",
        tool.to_str().unwrap(),
    ]))
    .await
    .unwrap();

    assert_eq!(output.exit_code, EXIT_FAILED);
    assert!(!output.stdout.contains("secret-name"));
}

#[tokio::test]
async fn locate_marks_override() {
    let temp = TempDir::new().unwrap();
    let tool = script(temp.path(), "exit 0");

    let output = c2pa_verifier_cli::run(cli(&["locate", "--tool-path", tool.to_str().unwrap()]))
        .await
        .unwrap();

    let first = output.stdout.lines().next().unwrap();
    assert!(first.starts_with("* env-override"));
    assert!(first.ends_with(tool.to_str().unwrap()));
}

#[tokio::test]
async fn invalid_timeout_is_config_error() {
    let err = c2pa_verifier_cli::run(cli(&["locate", "--timeout", "0"]))
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::Config { .. }));
}
