use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use ruulang_launcher::config::{self, LauncherConfig};
use ruulang_launcher::launch::{LaunchOptions, ServerProcess};
use ruulang_launcher::logging;
use ruulang_launcher::server::cache::BinaryCache;
use ruulang_launcher::server::feeds::github::GitHubFeed;
use ruulang_launcher::server::platform::Platform;
use ruulang_launcher::server::resolver::{RefreshOutcome, Resolver, wait_for_refresh};

#[derive(Parser)]
#[command(name = "ruulang-launcher")]
#[command(version, about = "Resolves, updates and launches the RuuLang language server")]
struct Cli {
    /// Configuration file (defaults to <data dir>/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding downloaded server binaries
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the server path to launch (default)
    ///
    /// The path is the first stdout line and is flushed as soon as it is
    /// known. Unless --detach is given the process then stays alive until the
    /// background refresh finishes, so callers should read that line rather
    /// than wait for exit.
    Resolve {
        /// Exit right after printing, abandoning the background refresh
        #[arg(long)]
        detach: bool,
    },
    /// List cached server binaries, newest first
    List,
    /// Download the latest release now if it is newer than the cache
    Update,
    /// Resolve and run the server over stdio
    Run {
        /// Working directory for the server
        #[arg(long)]
        workspace: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let _guard = logging::init(&config::log_path())?;

    let config_path = cli.config.clone().unwrap_or_else(config::config_path);
    let mut config = LauncherConfig::load(&config_path)?;
    if let Some(dir) = cli.cache_dir {
        config.cache_dir = Some(dir);
    }

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli.command.unwrap_or(Command::Resolve { detach: false }), config))
}

fn build_resolver(config: &LauncherConfig) -> Resolver {
    let cache = BinaryCache::new(config.cache_dir(), config.binary_name.clone());
    Resolver::new(
        Arc::new(GitHubFeed::from_config(&config.feed)),
        cache,
        Platform::current(),
    )
    .with_debug_binary(config.debug_override())
    .with_progress(Arc::new(|message: &str| eprintln!("{message}")))
}

async fn run(command: Command, config: LauncherConfig) -> anyhow::Result<ExitCode> {
    let resolver = build_resolver(&config);

    match command {
        Command::Resolve { detach } => {
            let resolution = resolver.resolve().await.inspect_err(|e| {
                error!("Failed to resolve server: {}", e);
            })?;
            println!("{}", resolution.path.display());
            std::io::stdout().flush()?;
            match resolution.background_refresh {
                Some(refresh) if !detach => wait_for_refresh(refresh).await,
                _ => {}
            }
        }
        Command::List => {
            let mut entries = resolver.cache().list()?;
            entries.sort_by(|a, b| b.version.cmp(&a.version));
            for entry in entries {
                println!("{}\t{}", entry.version, entry.path.display());
            }
        }
        Command::Update => {
            let current = resolver
                .cache()
                .latest()?
                .map(|binary| binary.version)
                .unwrap_or_default();
            match resolver.refresh(&current).await? {
                RefreshOutcome::Downloaded(binary) => {
                    println!("Downloaded {} to {}", binary.version, binary.path.display())
                }
                RefreshOutcome::UpToDate { latest } => {
                    println!("Already up to date (latest release {})", latest)
                }
            }
        }
        Command::Run { workspace } => {
            let resolution = resolver.resolve().await.inspect_err(|e| {
                error!("Failed to resolve server: {}", e);
            })?;
            let mut server =
                ServerProcess::spawn(&resolution.path, &LaunchOptions::for_workspace(workspace))?;

            tokio::select! {
                status = server.wait() => {
                    let status = status?;
                    if !status.success() {
                        let code = status.code().and_then(|c| u8::try_from(c).ok()).unwrap_or(1);
                        return Ok(ExitCode::from(code));
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, shutting down server");
                    server.stop().await?;
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
