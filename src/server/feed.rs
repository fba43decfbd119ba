//! Release feed trait for fetching published server releases

#[cfg(test)]
use mockall::automock;

use crate::server::error::{FeedError, ResolveError};
use crate::server::platform::Platform;
use crate::server::types::{ReleaseAsset, ReleaseMetadata};

/// Trait for fetching release metadata and asset content from a remote feed
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseFeed: Send + Sync {
    /// Fetches the latest published release
    ///
    /// # Returns
    /// * `Ok(ReleaseMetadata)` - Tag name and the assets attached to it
    /// * `Err(FeedError::Unavailable)` - Network failure or non-success status
    /// * `Err(FeedError::Malformed)` - Response is not a release document
    async fn fetch_latest_release(&self) -> Result<ReleaseMetadata, FeedError>;

    /// Downloads the raw bytes of a release asset
    async fn fetch_asset(&self, asset: &ReleaseAsset) -> Result<Vec<u8>, FeedError>;
}

/// Pick the asset named `<binary_name>.<triple>` for `platform`
pub fn select_platform_asset<'a>(
    release: &'a ReleaseMetadata,
    binary_name: &str,
    platform: &Platform,
) -> Result<&'a ReleaseAsset, ResolveError> {
    let asset_name = platform.asset_name(binary_name);
    release
        .find_asset(&asset_name)
        .ok_or_else(|| ResolveError::NoAssetForPlatform {
            platform: platform.triple(),
            asset: asset_name,
        })
}
