//! GitHub Releases API feed implementation

use tracing::{debug, warn};

use crate::config::FeedConfig;
use crate::server::error::FeedError;
use crate::server::feed::ReleaseFeed;
use crate::server::types::{ReleaseAsset, ReleaseMetadata};

/// Feed reading `repos/{owner}/{repo}/releases/latest` from the GitHub API
pub struct GitHubFeed {
    client: reqwest::Client,
    latest_release_url: String,
}

impl GitHubFeed {
    /// Creates a new GitHubFeed with a custom API base URL
    pub fn new(base_url: &str, owner: &str, repo: &str, user_agent: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(user_agent)
                .build()
                .expect("Failed to create HTTP client"),
            latest_release_url: format!(
                "{}/repos/{}/{}/releases/latest",
                base_url.trim_end_matches('/'),
                owner,
                repo
            ),
        }
    }

    pub fn from_config(config: &FeedConfig) -> Self {
        Self::new(
            &config.api_url,
            &config.repo_owner,
            &config.repo_name,
            &config.user_agent,
        )
    }
}

impl Default for GitHubFeed {
    fn default() -> Self {
        Self::from_config(&FeedConfig::default())
    }
}

#[async_trait::async_trait]
impl ReleaseFeed for GitHubFeed {
    async fn fetch_latest_release(&self) -> Result<ReleaseMetadata, FeedError> {
        let url = &self.latest_release_url;
        debug!("Fetching latest release from {}", url);

        let response = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| FeedError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("GitHub API returned status {}: {}", status, url);
            return Err(FeedError::Unavailable(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FeedError::Unavailable(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| {
            warn!("Failed to parse latest release response: {}", e);
            FeedError::Malformed(e.to_string())
        })
    }

    async fn fetch_asset(&self, asset: &ReleaseAsset) -> Result<Vec<u8>, FeedError> {
        debug!("Downloading asset {} from {}", asset.name, asset.url);

        let unavailable = |reason: String| FeedError::AssetUnavailable {
            name: asset.name.clone(),
            reason,
        };

        let response = self
            .client
            .get(&asset.url)
            .header("Accept", "application/octet-stream")
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Asset download returned status {}: {}", status, asset.url);
            return Err(unavailable(format!("Unexpected status: {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        debug!("Downloaded {} bytes for {}", bytes.len(), asset.name);
        Ok(bytes.to_vec())
    }
}
