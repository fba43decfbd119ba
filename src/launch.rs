//! Language server process handle
//!
//! One owned handle per launched server, passed explicitly to whoever needs
//! to wait on or stop it.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use anyhow::Context;
use tokio::process::{Child, Command};
use tracing::{info, warn};

/// Log level handed to the server through `RUST_LOG`
const SERVER_LOG_LEVEL: &str = "debug";

/// Spawn options for the server process
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Working directory, usually the workspace root
    pub cwd: PathBuf,
}

impl LaunchOptions {
    /// Use `workspace` if given, otherwise the home directory, otherwise `.`
    pub fn for_workspace(workspace: Option<PathBuf>) -> Self {
        let cwd = workspace
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        Self { cwd }
    }
}

/// A running server speaking the language protocol over inherited stdio
#[derive(Debug)]
pub struct ServerProcess {
    path: PathBuf,
    child: Child,
}

impl ServerProcess {
    pub fn spawn(path: &Path, options: &LaunchOptions) -> anyhow::Result<Self> {
        info!("Starting server {:?} in {:?}", path, options.cwd);

        let child = Command::new(path)
            .current_dir(&options.cwd)
            .env("RUST_LOG", SERVER_LOG_LEVEL)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start server {:?}", path))?;

        Ok(Self {
            path: path.to_path_buf(),
            child,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Wait for the server to exit on its own
    pub async fn wait(&mut self) -> anyhow::Result<ExitStatus> {
        let status = self
            .child
            .wait()
            .await
            .with_context(|| format!("Failed to wait for server {:?}", self.path))?;
        info!("Server {:?} exited with {}", self.path, status);
        Ok(status)
    }

    /// Kill the server and reap it
    pub async fn stop(mut self) -> anyhow::Result<()> {
        info!("Stopping server {:?}", self.path);
        if let Err(e) = self.child.kill().await {
            // already exited
            warn!("Failed to kill server {:?}: {}", self.path, e);
        }
        Ok(())
    }
}
