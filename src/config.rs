use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

// =============================================================================
// Defaults
// =============================================================================

/// Name of the server executable and prefix of its release assets
pub const DEFAULT_BINARY_NAME: &str = "ruulang-server";

/// Default base URL for GitHub API
pub const DEFAULT_API_URL: &str = "https://api.github.com";

pub const DEFAULT_REPO_OWNER: &str = "zwade";

pub const DEFAULT_REPO_NAME: &str = "ruulang";

pub const DEFAULT_USER_AGENT: &str = "ruulang-launcher";

/// Local development build used when debug mode is on.
/// Relative paths are anchored at the launcher executable's directory.
pub const DEFAULT_DEBUG_BINARY: &str = "../compiler/target/debug/ruulang-server";

/// Environment variable enabling debug mode when set to exactly `true`
pub const DEBUG_MODE_ENV: &str = "DEBUG_MODE";

/// Launcher configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LauncherConfig {
    pub binary_name: String,
    /// Overrides `<data_dir>/bin`
    pub cache_dir: Option<PathBuf>,
    pub debug_binary: PathBuf,
    pub feed: FeedConfig,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            binary_name: DEFAULT_BINARY_NAME.to_string(),
            cache_dir: None,
            debug_binary: PathBuf::from(DEFAULT_DEBUG_BINARY),
            feed: FeedConfig::default(),
        }
    }
}

/// Release feed configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FeedConfig {
    pub api_url: String,
    pub repo_owner: String,
    pub repo_name: String,
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            repo_owner: DEFAULT_REPO_OWNER.to_string(),
            repo_name: DEFAULT_REPO_NAME.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl LauncherConfig {
    /// Load configuration from a JSON file.
    ///
    /// A missing file yields the defaults; an unreadable or invalid one is an error.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {:?}", path))
    }

    /// Cache directory, falling back to `<data_dir>/bin`
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(default_cache_dir)
    }

    /// Debug build path if `DEBUG_MODE=true` is set in the environment
    pub fn debug_override(&self) -> Option<PathBuf> {
        debug_mode_enabled(std::env::var(DEBUG_MODE_ENV).ok().as_deref())
            .then(|| self.debug_binary_path())
    }

    /// Absolute path of the debug build, independent of the caller's cwd
    pub fn debug_binary_path(&self) -> PathBuf {
        let base = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("/"));
        anchor_path(&self.debug_binary, &base)
    }
}

/// Join a relative `path` onto `base`; absolute paths are kept as-is
fn anchor_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Debug mode is on only for the exact value `true`
pub fn debug_mode_enabled(value: Option<&str>) -> bool {
    value == Some("true")
}

/// Returns the path to the data directory for ruulang.
/// Uses $XDG_DATA_HOME/ruulang if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/ruulang,
/// or ./ruulang if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the default directory holding downloaded server binaries.
pub fn default_cache_dir() -> PathBuf {
    data_dir().join("bin")
}

/// Returns the path to the default config file.
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("ruulang-launcher.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("ruulang")
}
