//! Release feed client and asset selection.

use c2pa_verifier_core::{Error, InstallStage, Platform, Result, TOOL_NAME, VerifierConfig};
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use tracing::{debug, info};

const RELEASE_ACCEPT: &str = "application/vnd.github+json";
const ASSET_ACCEPT: &str = "application/octet-stream";

/// Release metadata from the feed.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// A downloadable release asset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    #[serde(rename = "browser_download_url")]
    pub download_url: String,
}

/// Pick the asset for `platform`.
///
/// Tries each target identifier in priority order, then falls back to any
/// tool asset mentioning the platform name. Never invents a fallback.
///
/// # Errors
///
/// Returns [`Error::ToolResolution`] when no asset matches.
pub fn select_asset<'a>(assets: &'a [ReleaseAsset], platform: &Platform) -> Result<&'a ReleaseAsset> {
    let tool_assets = || assets.iter().filter(|a| a.name.contains(TOOL_NAME));

    for target in platform.target_identifiers() {
        if let Some(asset) = tool_assets().find(|a| a.name.contains(&target)) {
            debug!(asset = %asset.name, %target, "Matched release asset by target");
            return Ok(asset);
        }
    }

    let hint = platform.platform_hint();
    if let Some(asset) = tool_assets().find(|a| a.name.contains(hint)) {
        debug!(asset = %asset.name, %hint, "Matched release asset by platform hint");
        return Ok(asset);
    }

    let available: Vec<_> = assets.iter().map(|a| a.name.as_str()).collect();
    Err(Error::tool_resolution(format!(
        "No suitable {TOOL_NAME} asset found in latest release for {platform}. Available: {available:?}"
    )))
}

/// HTTP client for the release feed.
#[derive(Clone)]
pub struct ReleaseClient {
    client: Client,
    releases_url: String,
    token: Option<String>,
}

impl std::fmt::Debug for ReleaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReleaseClient")
            .field("releases_url", &self.releases_url)
            .field("authenticated", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

impl ReleaseClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &VerifierConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(config.http_timeout())
            .timeout(config.http_timeout())
            .build()
            .map_err(|e| {
                Error::configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            releases_url: config.releases_url.clone(),
            token: config.github_token.clone(),
        })
    }

    fn get(&self, url: &str, accept: &'static str) -> reqwest::RequestBuilder {
        let request = self.client.get(url).header(ACCEPT, accept);
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    /// Fetch the latest release metadata.
    ///
    /// # Errors
    ///
    /// Returns an install error if the request fails, the feed answers with a
    /// non-success status, or the body is not release metadata.
    pub async fn fetch_latest(&self) -> Result<Release> {
        debug!(url = %self.releases_url, "Fetching latest release");

        let response = self
            .get(&self.releases_url, RELEASE_ACCEPT)
            .send()
            .await
            .map_err(|e| {
                Error::install(
                    InstallStage::FetchRelease,
                    format!("Failed to fetch latest release: {e}"),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::install(
                InstallStage::FetchRelease,
                format!("Failed to fetch latest release: HTTP {status}"),
            ));
        }

        let release: Release = response.json().await.map_err(|e| {
            Error::install(
                InstallStage::FetchRelease,
                format!("Failed to parse release metadata: {e}"),
            )
        })?;

        info!(tag = %release.tag_name, assets = release.assets.len(), "Fetched latest release");
        Ok(release)
    }

    /// Download an asset's content.
    ///
    /// # Errors
    ///
    /// Returns an install error if the request fails or the server answers
    /// with a non-success status.
    pub async fn download(&self, asset: &ReleaseAsset) -> Result<Vec<u8>> {
        debug!(asset = %asset.name, url = %asset.download_url, "Downloading release asset");

        let response = self
            .get(&asset.download_url, ASSET_ACCEPT)
            .send()
            .await
            .map_err(|e| {
                Error::install(
                    InstallStage::Download,
                    format!("Failed to download asset: {e}"),
                )
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::install(
                InstallStage::Download,
                format!("Failed to download asset {}: HTTP {status}", asset.name),
            ));
        }

        response.bytes().await.map(|b| b.to_vec()).map_err(|e| {
            Error::install(
                InstallStage::Download,
                format!("Failed to read asset: {e}"),
            )
        })
    }
}
