use std::path::PathBuf;

use serde::Deserialize;

use crate::server::semver::ServerVersion;

/// One downloadable file attached to a release
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    /// Locator for the asset content (fetched as octet-stream)
    pub url: String,
}

/// Latest-release answer from the feed. Never cached.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseMetadata {
    pub tag_name: String,
    pub assets: Vec<ReleaseAsset>,
}

impl ReleaseMetadata {
    pub fn new(tag_name: impl Into<String>, assets: Vec<ReleaseAsset>) -> Self {
        Self {
            tag_name: tag_name.into(),
            assets,
        }
    }

    /// Tag parsed as a server version, `None` if it does not follow `vX.Y.Z`
    pub fn version(&self) -> Option<ServerVersion> {
        ServerVersion::parse(&self.tag_name)
    }

    pub fn find_asset(&self, name: &str) -> Option<&ReleaseAsset> {
        self.assets.iter().find(|asset| asset.name == name)
    }
}

/// A server binary found in the cache directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedBinary {
    pub version: ServerVersion,
    pub path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_metadata_deserializes_feed_document() {
        let release: ReleaseMetadata = serde_json::from_str(
            r#"{
                "tag_name": "v2.0.0",
                "name": "Release 2.0.0",
                "assets": [
                    {"url": "https://example.com/assets/1", "name": "ruulang-server.x86_64-unknown-linux-gnu", "size": 12}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(release.version(), Some(ServerVersion::new(2, 0, 0)));
        assert_eq!(
            release
                .find_asset("ruulang-server.x86_64-unknown-linux-gnu")
                .map(|a| a.url.as_str()),
            Some("https://example.com/assets/1")
        );
        assert_eq!(release.find_asset("ruulang-server.aarch64-apple-darwin"), None);
    }

    #[test]
    fn release_metadata_requires_tag_and_assets() {
        assert!(serde_json::from_str::<ReleaseMetadata>(r#"{"assets": []}"#).is_err());
        assert!(serde_json::from_str::<ReleaseMetadata>(r#"{"tag_name": "v1.0.0"}"#).is_err());
    }

    #[test]
    fn version_is_none_for_non_conforming_tag() {
        let release = ReleaseMetadata::new("nightly", vec![]);

        assert_eq!(release.version(), None);
    }
}
