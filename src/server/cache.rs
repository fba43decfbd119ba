//! On-disk cache of downloaded server binaries
//!
//! The directory listing is the index: every file named
//! `<binary-name>.v<major>.<minor>.<patch>` is a cached server, everything
//! else is ignored. Files are only ever created, never rewritten in place, so
//! a running server's executable is never touched by a later download.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::server::error::CacheError;
use crate::server::semver::ServerVersion;
use crate::server::types::CachedBinary;

#[derive(Debug, Clone)]
pub struct BinaryCache {
    dir: PathBuf,
    binary_name: String,
}

impl BinaryCache {
    pub fn new(dir: impl Into<PathBuf>, binary_name: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            binary_name: binary_name.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn binary_name(&self) -> &str {
        &self.binary_name
    }

    /// Path a binary of `version` is stored under
    pub fn path_for(&self, version: &ServerVersion) -> PathBuf {
        self.dir.join(format!("{}.{}", self.binary_name, version))
    }

    /// Parse a cache file name, `None` if it is not a cached server
    fn parse_file_name(&self, file_name: &str) -> Option<ServerVersion> {
        let tag = file_name
            .strip_prefix(self.binary_name.as_str())?
            .strip_prefix('.')?;
        ServerVersion::parse(tag)
    }

    fn ensure_dir(&self) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir).map_err(|source| CacheError::WriteFailed {
            path: self.dir.clone(),
            source,
        })
    }

    /// List cached binaries, creating the cache directory if needed.
    ///
    /// Order follows the directory listing and is unspecified.
    pub fn list(&self) -> Result<Vec<CachedBinary>, CacheError> {
        self.ensure_dir()?;

        let read_failed = |source: io::Error| CacheError::ReadFailed {
            path: self.dir.clone(),
            source,
        };

        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(read_failed)? {
            let entry = entry.map_err(read_failed)?;
            let file_name = entry.file_name();
            let Some(version) = file_name.to_str().and_then(|n| self.parse_file_name(n)) else {
                continue;
            };
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            entries.push(CachedBinary { version, path });
        }

        debug!("Found {} cached binaries in {:?}", entries.len(), self.dir);
        Ok(entries)
    }

    /// Newest cached binary, if any
    pub fn latest(&self) -> Result<Option<CachedBinary>, CacheError> {
        Ok(self.list()?.into_iter().max_by(|a, b| a.version.cmp(&b.version)))
    }

    /// Write `bytes` as the executable for `version` and return its path.
    ///
    /// The content is written to a temporary file in the cache directory and
    /// renamed into place without clobbering. When the version-named file
    /// already exists the existing path is returned and nothing is written.
    pub fn store(&self, version: &ServerVersion, bytes: &[u8]) -> Result<PathBuf, CacheError> {
        self.ensure_dir()?;
        let path = self.path_for(version);

        if path.exists() {
            debug!("{:?} already cached, keeping existing file", path);
            return Ok(path);
        }

        let write_failed = |source: io::Error| CacheError::WriteFailed {
            path: path.clone(),
            source,
        };

        let mut file = NamedTempFile::new_in(&self.dir).map_err(write_failed)?;
        file.write_all(bytes).map_err(write_failed)?;
        file.as_file().sync_all().map_err(write_failed)?;
        set_executable(file.path()).map_err(write_failed)?;

        match file.persist_noclobber(&path) {
            Ok(_) => {
                info!("Stored {} bytes at {:?}", bytes.len(), path);
                Ok(path)
            }
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                debug!("{:?} was stored concurrently, keeping existing file", path);
                Ok(path)
            }
            Err(e) => Err(write_failed(e.error)),
        }
    }

    /// `store` on the blocking thread pool, for use from async tasks
    pub async fn store_blocking(
        &self,
        version: ServerVersion,
        bytes: Vec<u8>,
    ) -> Result<PathBuf, CacheError> {
        let cache = self.clone();
        let path = self.path_for(&version);
        tokio::task::spawn_blocking(move || cache.store(&version, &bytes))
            .await
            .map_err(|e| CacheError::WriteFailed {
                path,
                source: io::Error::other(e),
            })?
    }
}

#[cfg(unix)]
fn set_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_cache() -> (TempDir, BinaryCache) {
        let temp_dir = TempDir::new().unwrap();
        let cache = BinaryCache::new(temp_dir.path().join("bin"), "server");
        (temp_dir, cache)
    }

    fn touch(cache: &BinaryCache, name: &str) {
        fs::create_dir_all(cache.dir()).unwrap();
        fs::write(cache.dir().join(name), b"x").unwrap();
    }

    #[test]
    fn list_creates_missing_directory() {
        let (_temp_dir, cache) = create_test_cache();
        assert!(!cache.dir().exists());

        let entries = cache.list().unwrap();

        assert!(entries.is_empty());
        assert!(cache.dir().is_dir());
    }

    #[test]
    fn list_ignores_files_not_following_naming_convention() {
        let (_temp_dir, cache) = create_test_cache();
        touch(&cache, "server.v1.2.0");
        touch(&cache, "server.v1.2");
        touch(&cache, "server.x86_64-unknown-linux-gnu");
        touch(&cache, "server.v1.2.0.old");
        touch(&cache, "other.v9.9.9");
        touch(&cache, "serverv1.0.0");
        touch(&cache, ".tmpAbc123");
        fs::create_dir_all(cache.dir().join("server.v5.0.0")).unwrap();

        let entries = cache.list().unwrap();

        assert_eq!(
            entries,
            vec![CachedBinary {
                version: ServerVersion::new(1, 2, 0),
                path: cache.dir().join("server.v1.2.0"),
            }]
        );
    }

    #[test]
    fn latest_selects_highest_version() {
        let (_temp_dir, cache) = create_test_cache();
        touch(&cache, "server.v1.2.0");
        touch(&cache, "server.v1.10.0");
        touch(&cache, "server.v1.3.0");

        let latest = cache.latest().unwrap().unwrap();

        assert_eq!(latest.version, ServerVersion::new(1, 10, 0));
        assert_eq!(latest.path, cache.dir().join("server.v1.10.0"));
    }

    #[test]
    fn latest_is_none_for_empty_cache() {
        let (_temp_dir, cache) = create_test_cache();

        assert_eq!(cache.latest().unwrap(), None);
    }

    #[test]
    fn store_writes_version_named_file() {
        let (_temp_dir, cache) = create_test_cache();

        let path = cache.store(&ServerVersion::new(2, 0, 0), b"binary").unwrap();

        assert_eq!(path, cache.dir().join("server.v2.0.0"));
        assert_eq!(fs::read(&path).unwrap(), b"binary");
        assert_eq!(cache.latest().unwrap().unwrap().path, path);
    }

    #[cfg(unix)]
    #[test]
    fn store_marks_file_executable() {
        use std::os::unix::fs::PermissionsExt;
        let (_temp_dir, cache) = create_test_cache();

        let path = cache.store(&ServerVersion::new(1, 0, 0), b"binary").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[tokio::test]
    async fn store_blocking_writes_version_named_file() {
        let (_temp_dir, cache) = create_test_cache();

        let path = cache
            .store_blocking(ServerVersion::new(3, 1, 0), b"binary".to_vec())
            .await
            .unwrap();

        assert_eq!(path, cache.dir().join("server.v3.1.0"));
        assert_eq!(fs::read(&path).unwrap(), b"binary");
    }

    #[test]
    fn store_never_overwrites_existing_version() {
        let (_temp_dir, cache) = create_test_cache();
        let version = ServerVersion::new(1, 0, 0);
        cache.store(&version, b"first").unwrap();

        let path = cache.store(&version, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"first");
    }

    #[test]
    fn store_leaves_no_temporary_files() {
        let (_temp_dir, cache) = create_test_cache();
        cache.store(&ServerVersion::new(1, 0, 0), b"binary").unwrap();

        let names: Vec<_> = fs::read_dir(cache.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();

        assert_eq!(names, vec!["server.v1.0.0".to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn store_reports_write_failed_for_read_only_directory() {
        use std::os::unix::fs::PermissionsExt;
        let (_temp_dir, cache) = create_test_cache();
        fs::create_dir_all(cache.dir()).unwrap();
        fs::set_permissions(cache.dir(), fs::Permissions::from_mode(0o555)).unwrap();

        // Permission bits are not enforced for privileged users
        let enforced = fs::File::create(cache.dir().join("probe")).is_err();
        let result = cache.store(&ServerVersion::new(1, 0, 0), b"binary");

        fs::set_permissions(cache.dir(), fs::Permissions::from_mode(0o755)).unwrap();
        if enforced {
            assert!(matches!(result, Err(CacheError::WriteFailed { .. })));
        }
    }
}
