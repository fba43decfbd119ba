//! Server binary resolution policy
//!
//! `resolve` answers which executable to launch right now:
//! - debug override set: the local development build, nothing else happens
//! - cache has a binary: the newest one, returned without touching the
//!   network; a detached task checks the feed and stores anything newer for
//!   the next start
//! - cache is empty: block on the feed, download, store, return the new path

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::server::cache::BinaryCache;
use crate::server::error::ResolveError;
use crate::server::feed::{ReleaseFeed, select_platform_asset};
use crate::server::platform::Platform;
use crate::server::semver::ServerVersion;
use crate::server::types::CachedBinary;

/// Callback for user-visible progress on the blocking download path
pub type ProgressFn = Arc<dyn Fn(&str) + Send + Sync>;

/// Where a resolved path came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedFrom {
    DebugBuild,
    Cache(ServerVersion),
    Download(ServerVersion),
}

/// Result of a resolution call
#[derive(Debug)]
pub struct Resolution {
    pub path: PathBuf,
    pub source: ResolvedFrom,
    /// Background refresh started for a cached binary. Dropping the handle
    /// detaches the task; awaiting it never yields a refresh error.
    pub background_refresh: Option<JoinHandle<()>>,
}

/// Outcome of checking the feed against an installed version
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Downloaded(CachedBinary),
    UpToDate { latest: ServerVersion },
}

#[derive(Clone)]
pub struct Resolver {
    feed: Arc<dyn ReleaseFeed>,
    cache: BinaryCache,
    platform: Platform,
    debug_binary: Option<PathBuf>,
    progress: Option<ProgressFn>,
}

impl Resolver {
    pub fn new(feed: Arc<dyn ReleaseFeed>, cache: BinaryCache, platform: Platform) -> Self {
        Self {
            feed,
            cache,
            platform,
            debug_binary: None,
            progress: None,
        }
    }

    /// Short-circuit every resolution to a local build
    pub fn with_debug_binary(mut self, path: Option<PathBuf>) -> Self {
        self.debug_binary = path;
        self
    }

    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn cache(&self) -> &BinaryCache {
        &self.cache
    }

    /// Resolve the server executable to launch.
    ///
    /// Must be called within a tokio runtime; the background refresh is
    /// spawned onto it.
    pub async fn resolve(&self) -> Result<Resolution, ResolveError> {
        if let Some(path) = &self.debug_binary {
            info!("Debug mode: using local build {:?}", path);
            return Ok(Resolution {
                path: path.clone(),
                source: ResolvedFrom::DebugBuild,
                background_refresh: None,
            });
        }

        if let Some(current) = self.cache.latest()? {
            info!("Using cached server {} at {:?}", current.version, current.path);
            let handle = self.spawn_background_refresh(current.version.clone());
            return Ok(Resolution {
                path: current.path,
                source: ResolvedFrom::Cache(current.version),
                background_refresh: Some(handle),
            });
        }

        info!("No cached server in {:?}, downloading latest release", self.cache.dir());
        match self
            .refresh_with_progress(&ServerVersion::ZERO, self.progress.as_ref())
            .await?
        {
            RefreshOutcome::Downloaded(binary) => Ok(Resolution {
                path: binary.path,
                source: ResolvedFrom::Download(binary.version),
                background_refresh: None,
            }),
            RefreshOutcome::UpToDate { latest } => {
                Err(ResolveError::NoNewerRelease(latest.to_string()))
            }
        }
    }

    /// Download the latest release if it is strictly newer than `current`.
    ///
    /// Errors are returned as-is; the background path swallows them, the
    /// blocking path propagates them.
    pub async fn refresh(&self, current: &ServerVersion) -> Result<RefreshOutcome, ResolveError> {
        self.refresh_with_progress(current, None).await
    }

    async fn refresh_with_progress(
        &self,
        current: &ServerVersion,
        progress: Option<&ProgressFn>,
    ) -> Result<RefreshOutcome, ResolveError> {
        let release = self.feed.fetch_latest_release().await?;
        let latest = release
            .version()
            .ok_or_else(|| ResolveError::InvalidTag(release.tag_name.clone()))?;

        if !latest.is_newer_than(current) {
            debug!("Latest release {} is not newer than {}", latest, current);
            return Ok(RefreshOutcome::UpToDate { latest });
        }

        let asset = select_platform_asset(&release, self.cache.binary_name(), &self.platform)?;

        if let Some(progress) = progress {
            progress(&format!(
                "Downloading {} {}",
                self.cache.binary_name(),
                latest
            ));
        }

        info!("Downloading {} for release {}", asset.name, latest);
        let bytes = self.feed.fetch_asset(asset).await?;
        let path = self.cache.store_blocking(latest.clone(), bytes).await?;

        Ok(RefreshOutcome::Downloaded(CachedBinary {
            version: latest,
            path,
        }))
    }

    fn spawn_background_refresh(&self, current: ServerVersion) -> JoinHandle<()> {
        let resolver = self.clone();
        tokio::spawn(async move {
            match resolver.refresh(&current).await {
                Ok(RefreshOutcome::Downloaded(binary)) => info!(
                    "Downloaded server {} to {:?}; it will be used on next start",
                    binary.version, binary.path
                ),
                Ok(RefreshOutcome::UpToDate { latest }) => {
                    debug!("Cached server {} is up to date (latest {})", current, latest)
                }
                Err(e) => warn!("Background server refresh failed: {}", e),
            }
        })
    }
}

/// Wait for a background refresh, logging a panicked or cancelled task
pub async fn wait_for_refresh(handle: JoinHandle<()>) {
    if let Err(e) = handle.await {
        warn!("Background server refresh task did not complete: {}", e);
    }
}
