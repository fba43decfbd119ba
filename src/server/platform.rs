//! Platform triple detection for release asset selection

use std::fmt;
use std::sync::LazyLock;

static CURRENT: LazyLock<Platform> = LazyLock::new(|| {
    Platform::new(
        Arch::from_std(std::env::consts::ARCH),
        Os::from_std(std::env::consts::OS),
    )
});

/// CPU architecture as it appears in release asset names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    Aarch64,
    X86_64,
    Unknown,
}

impl Arch {
    /// Map a `std::env::consts::ARCH` value
    pub fn from_std(arch: &str) -> Self {
        match arch {
            "aarch64" => Arch::Aarch64,
            "x86_64" => Arch::X86_64,
            _ => Arch::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::Aarch64 => "aarch64",
            Arch::X86_64 => "x86_64",
            Arch::Unknown => "unknown",
        }
    }
}

/// Operating system vendor and ABI part of the triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    AppleDarwin,
    UnknownLinuxGnu,
    Unknown,
}

impl Os {
    /// Map a `std::env::consts::OS` value
    pub fn from_std(os: &str) -> Self {
        match os {
            "macos" => Os::AppleDarwin,
            "linux" => Os::UnknownLinuxGnu,
            _ => Os::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Os::AppleDarwin => "apple-darwin",
            Os::UnknownLinuxGnu => "unknown-linux-gnu",
            Os::Unknown => "unknown",
        }
    }
}

/// `{arch}-{os}` key used to pick the release asset for this machine.
///
/// Unsupported machines still produce a triple (with `unknown` parts); it
/// simply never matches an asset, which surfaces as `NoAssetForPlatform`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub arch: Arch,
    pub os: Os,
}

impl Platform {
    pub fn new(arch: Arch, os: Os) -> Self {
        Self { arch, os }
    }

    /// Platform of the running process, derived once
    pub fn current() -> Self {
        *CURRENT
    }

    pub fn triple(&self) -> String {
        format!("{}-{}", self.arch.as_str(), self.os.as_str())
    }

    /// Release asset name for `binary_name` on this platform,
    /// e.g. `ruulang-server.aarch64-apple-darwin`
    pub fn asset_name(&self, binary_name: &str) -> String {
        format!("{}.{}", binary_name, self.triple())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.triple())
    }
}
