//! Installer tests against a mock release feed.

#![cfg(unix)]

use c2pa_verifier_core::{Error, InstallStage, Platform, ToolContext, VerifierConfig};
use c2pa_verifier_tools_c2patool::{Installer, ReleaseInstaller, ToolRunner, is_executable};
use flate2::Compression;
use flate2::write::GzEncoder;
use serde_json::json;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RELEASE_PATH: &str = "/repos/contentauth/c2pa-rs/releases/latest";

const WORKING_TOOL: &str = "#!/bin/sh
if [ \"$1\" = \"--version\" ]; then
  echo 'c2patool 0.9.0'
  exit 0
fi
echo '{\"active_manifest\":\"urn:uuid:1\"}'
";

const BROKEN_TOOL: &str = "#!/bin/sh
echo \"c2patool: /lib/x86_64-linux-gnu/libc.so.6: version 'GLIBC_2.39' not found\" >&2
exit 1
";

fn tarball(files: &[(&str, &str)]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_path(name).unwrap();
        header.set_size(content.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append(&header, content.as_bytes()).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

fn asset_name() -> String {
    let platform = Platform::current().unwrap();
    format!("c2patool-v0.9.0-{}.tar.gz", platform.target_identifiers()[0])
}

fn config(temp: &TempDir, server: &MockServer) -> VerifierConfig {
    VerifierConfig {
        working_dir: Some(temp.path().join("work")),
        install_dir: Some(temp.path().join("tools")),
        scratch_dir: Some(temp.path().join("scratch")),
        releases_url: format!("{}{RELEASE_PATH}", server.uri()),
        run_timeout_secs: 10,
        http_timeout_secs: 10,
        ..Default::default()
    }
}

async fn mount_release(server: &MockServer, assets: &[String], expected_calls: Option<u64>) {
    let assets: Vec<_> = assets
        .iter()
        .map(|name| {
            json!({
                "name": name,
                "browser_download_url": format!("{}/download/{name}", server.uri()),
            })
        })
        .collect();

    let mock = Mock::given(method("GET"))
        .and(path(RELEASE_PATH))
        .and(header("user-agent", "c2pa-verifier-installer"))
        .and(header("accept", "application/vnd.github+json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"tag_name": "c2patool-v0.9.0", "assets": assets})),
        );
    match expected_calls {
        Some(n) => mock.expect(n).mount(server).await,
        None => mock.mount(server).await,
    }
}

async fn mount_download(server: &MockServer, name: &str, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(format!("/download/{name}")))
        .and(header("accept", "application/octet-stream"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .mount(server)
        .await;
}

fn write_script(path: &Path, body: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

#[tokio::test]
async fn installs_latest_release_and_records_context() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let name = asset_name();

    mount_release(
        &server,
        &["c2pa-v0.9.0-docs.tar.gz".to_string(), name.clone()],
        Some(1),
    )
    .await;
    mount_download(
        &server,
        &name,
        tarball(&[("c2patool/README.md", "docs"), ("c2patool/c2patool", WORKING_TOOL)]),
    )
    .await;

    let ctx = ToolContext::default();
    let installer = ReleaseInstaller::new(&config(&temp, &server), ctx.clone()).unwrap();
    let installed = installer.ensure_available().await.unwrap();

    assert_eq!(installed, temp.path().join("tools").join("c2patool"));
    assert!(is_executable(&installed));
    assert_eq!(ctx.tool_path(), Some(installed.clone()));

    let version = ToolRunner::new(Duration::from_secs(10))
        .probe(&installed)
        .await
        .unwrap();
    assert_eq!(version, "c2patool 0.9.0");
}

#[tokio::test]
async fn second_call_skips_network() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let name = asset_name();

    // The release feed must be queried exactly once across both calls.
    mount_release(&server, &[name.clone()], Some(1)).await;
    mount_download(&server, &name, tarball(&[("c2patool", WORKING_TOOL)])).await;

    let installer =
        ReleaseInstaller::new(&config(&temp, &server), ToolContext::default()).unwrap();
    let first = installer.ensure_available().await.unwrap();
    let second = installer.ensure_available().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn existing_healthy_install_needs_no_network() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_release(&server, &[asset_name()], Some(0)).await;

    let target = temp.path().join("tools").join("c2patool");
    write_script(&target, WORKING_TOOL);
    // Lost its executable bit; the fast path restores it.
    std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o644)).unwrap();

    let ctx = ToolContext::default();
    let installer = ReleaseInstaller::new(&config(&temp, &server), ctx.clone()).unwrap();
    assert_eq!(installer.ensure_available().await.unwrap(), target);
    assert!(is_executable(&target));
    assert_eq!(ctx.tool_path(), Some(target));
}

#[tokio::test]
async fn broken_install_is_replaced() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let name = asset_name();
    mount_release(&server, &[name.clone()], Some(1)).await;
    mount_download(&server, &name, tarball(&[("c2patool", WORKING_TOOL)])).await;

    let target = temp.path().join("tools").join("c2patool");
    write_script(&target, BROKEN_TOOL);

    let installer =
        ReleaseInstaller::new(&config(&temp, &server), ToolContext::default()).unwrap();
    installer.ensure_available().await.unwrap();

    assert_eq!(std::fs::read_to_string(&target).unwrap(), WORKING_TOOL);
}

#[tokio::test]
async fn no_matching_asset_fails_resolution() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    mount_release(&server, &["c2patool-v0.9.0-riscv64-plan9.zip".to_string()], None).await;

    let ctx = ToolContext::default();
    let installer = ReleaseInstaller::new(&config(&temp, &server), ctx.clone()).unwrap();
    let err = installer.ensure_available().await.unwrap_err();

    assert!(matches!(err, Error::ToolResolution { .. }), "got {err:?}");
    assert!(!installer.install_target().exists());
    assert!(ctx.tool_path().is_none());
}

#[tokio::test]
async fn archive_without_binary_fails() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let name = asset_name();
    mount_release(&server, &[name.clone()], None).await;
    mount_download(&server, &name, tarball(&[("docs/manual.txt", "manual")])).await;

    let ctx = ToolContext::default();
    let installer = ReleaseInstaller::new(&config(&temp, &server), ctx.clone()).unwrap();
    let err = installer.ensure_available().await.unwrap_err();

    assert_eq!(err.install_stage(), Some(InstallStage::MissingBinary));
    assert!(!installer.install_target().exists());
    assert!(ctx.tool_path().is_none());
}

#[tokio::test]
async fn failed_probe_leaves_no_install() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let name = asset_name();
    mount_release(&server, &[name.clone()], None).await;
    mount_download(&server, &name, tarball(&[("c2patool", BROKEN_TOOL)])).await;

    let ctx = ToolContext::default();
    let installer = ReleaseInstaller::new(&config(&temp, &server), ctx.clone()).unwrap();
    let err = installer.ensure_available().await.unwrap_err();

    assert_eq!(err.install_stage(), Some(InstallStage::Probe));
    assert!(err.to_string().contains("GLIBC_2.39"));
    assert!(!installer.install_target().exists());
    assert!(ctx.tool_path().is_none());

    // No staged copy is left beside the install target
    let leftovers: Vec<_> = std::fs::read_dir(temp.path().join("tools"))
        .unwrap()
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn release_feed_error_is_fetch_stage() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path(RELEASE_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let installer =
        ReleaseInstaller::new(&config(&temp, &server), ToolContext::default()).unwrap();
    let err = installer.ensure_available().await.unwrap_err();
    assert_eq!(err.install_stage(), Some(InstallStage::FetchRelease));
    assert!(err.to_string().contains("503"));
}

#[tokio::test]
async fn download_error_is_download_stage() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    // Asset listed but the download endpoint is not mounted: wiremock answers 404.
    mount_release(&server, &[asset_name()], None).await;

    let installer =
        ReleaseInstaller::new(&config(&temp, &server), ToolContext::default()).unwrap();
    let err = installer.ensure_available().await.unwrap_err();
    assert_eq!(err.install_stage(), Some(InstallStage::Download));
}

#[tokio::test]
async fn sends_token_when_configured() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let name = asset_name();
    Mock::given(method("GET"))
        .and(path(RELEASE_PATH))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tag_name": "c2patool-v0.9.0",
            "assets": [{
                "name": name,
                "browser_download_url": format!("{}/download/{name}", server.uri()),
            }],
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_download(&server, &name, tarball(&[("c2patool", WORKING_TOOL)])).await;

    let config = VerifierConfig {
        github_token: Some("test-token".to_string()),
        ..config(&temp, &server)
    };
    let installer = ReleaseInstaller::new(&config, ToolContext::default()).unwrap();
    installer.ensure_available().await.unwrap();
}

#[tokio::test]
async fn concurrent_first_installs_converge() {
    let server = MockServer::start().await;
    let temp = TempDir::new().unwrap();
    let name = asset_name();
    mount_release(&server, &[name.clone()], None).await;
    mount_download(&server, &name, tarball(&[("c2patool", WORKING_TOOL)])).await;

    let config = config(&temp, &server);
    let first = ReleaseInstaller::new(&config, ToolContext::default()).unwrap();
    let second = ReleaseInstaller::new(&config, ToolContext::default()).unwrap();

    let (a, b) = tokio::join!(first.ensure_available(), second.ensure_available());
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a, b);
    assert_eq!(std::fs::read_to_string(&a).unwrap(), WORKING_TOOL);
}
