use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Release feed unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed release feed response: {0}")]
    Malformed(String),

    #[error("Asset {name} unavailable: {reason}")]
    AssetUnavailable { name: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Failed to read cache directory {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path:?}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("No release asset {asset} for platform {platform}")]
    NoAssetForPlatform { platform: String, asset: String },

    #[error("Release tag {0:?} is not a vMAJOR.MINOR.PATCH version")]
    InvalidTag(String),

    #[error("Latest release {0} is not newer than any installed server")]
    NoNewerRelease(String),
}
