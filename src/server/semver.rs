//! Server version identifiers
//!
//! Release tags and cached file names carry a strict `v<major>.<minor>.<patch>`
//! version. Anything else is not a server version and parses to `None`.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v(\d+)\.(\d+)\.(\d+)$").expect("valid version regex"));

/// A `v`-prefixed three-part version, ordered by major, minor, then patch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerVersion(Version);

impl ServerVersion {
    /// Sentinel for "no prior version". Every parsed version other than
    /// `v0.0.0` compares greater.
    pub const ZERO: ServerVersion = ServerVersion(Version::new(0, 0, 0));

    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(Version::new(major, minor, patch))
    }

    /// Parse a tag of exactly the form `v1.2.3`.
    ///
    /// Returns `None` for missing prefix, missing or extra components,
    /// non-numeric parts, surrounding text, or components overflowing `u64`.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = TAG_RE.captures(text)?;
        let major = caps[1].parse().ok()?;
        let minor = caps[2].parse().ok()?;
        let patch = caps[3].parse().ok()?;
        Some(Self::new(major, minor, patch))
    }

    pub fn major(&self) -> u64 {
        self.0.major
    }

    pub fn minor(&self) -> u64 {
        self.0.minor
    }

    pub fn patch(&self) -> u64 {
        self.0.patch
    }

    /// True when `self` is strictly newer than `other`
    pub fn is_newer_than(&self, other: &ServerVersion) -> bool {
        self > other
    }
}

impl Default for ServerVersion {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}
