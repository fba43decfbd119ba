//! Release feed test utilities

use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;

use ruulang_launcher::server::cache::BinaryCache;
use ruulang_launcher::server::error::FeedError;
use ruulang_launcher::server::feed::ReleaseFeed;
use ruulang_launcher::server::platform::{Arch, Os, Platform};
use ruulang_launcher::server::types::{ReleaseAsset, ReleaseMetadata};

pub const BINARY_NAME: &str = "server";

pub const PLATFORM: Platform = Platform {
    arch: Arch::Aarch64,
    os: Os::AppleDarwin,
};

/// Feed serving a fixed release and counting every request
pub struct CountingFeed {
    release: Option<ReleaseMetadata>,
    content: Vec<u8>,
    release_calls: AtomicUsize,
    asset_calls: AtomicUsize,
}

impl CountingFeed {
    pub fn new(tag: &str, asset_names: &[&str]) -> Self {
        let assets = asset_names
            .iter()
            .map(|name| ReleaseAsset {
                name: name.to_string(),
                url: format!("https://example.com/download/{name}"),
            })
            .collect();
        Self {
            release: Some(ReleaseMetadata::new(tag, assets)),
            content: format!("server {tag}").into_bytes(),
            release_calls: AtomicUsize::new(0),
            asset_calls: AtomicUsize::new(0),
        }
    }

    /// Feed that fails every request as unreachable
    pub fn unreachable() -> Self {
        Self {
            release: None,
            content: Vec::new(),
            release_calls: AtomicUsize::new(0),
            asset_calls: AtomicUsize::new(0),
        }
    }

    pub fn release_calls(&self) -> usize {
        self.release_calls.load(Ordering::SeqCst)
    }

    pub fn asset_calls(&self) -> usize {
        self.asset_calls.load(Ordering::SeqCst)
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

#[async_trait]
impl ReleaseFeed for CountingFeed {
    async fn fetch_latest_release(&self) -> Result<ReleaseMetadata, FeedError> {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
        self.release
            .clone()
            .ok_or_else(|| FeedError::Unavailable("connection refused".to_string()))
    }

    async fn fetch_asset(&self, asset: &ReleaseAsset) -> Result<Vec<u8>, FeedError> {
        self.asset_calls.fetch_add(1, Ordering::SeqCst);
        match &self.release {
            Some(_) => Ok(self.content.clone()),
            None => Err(FeedError::AssetUnavailable {
                name: asset.name.clone(),
                reason: "connection refused".to_string(),
            }),
        }
    }
}

/// Asset name the test platform downloads
pub fn platform_asset() -> String {
    PLATFORM.asset_name(BINARY_NAME)
}

/// Create a cache directory pre-populated with `files`
pub fn create_test_cache(files: &[&str]) -> (TempDir, BinaryCache) {
    let temp_dir = TempDir::new().unwrap();
    let cache = BinaryCache::new(temp_dir.path().join("bin"), BINARY_NAME);
    fs::create_dir_all(cache.dir()).unwrap();
    for name in files {
        fs::write(cache.dir().join(name), b"cached").unwrap();
    }
    (temp_dir, cache)
}

pub fn shared(feed: CountingFeed) -> Arc<CountingFeed> {
    Arc::new(feed)
}
