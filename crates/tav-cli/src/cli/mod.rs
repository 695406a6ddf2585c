//! CLI entry and dispatch.

use std::fs;

use anyhow::{Context, Result};
use clap::Parser;
use tav_core::config::{Config, paths};
use tav_core::logging;

#[derive(Parser)]
#[command(name = "tav")]
#[command(version = "0.1")]
#[command(about = "Terminal viewer for assignment feedback reports")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override the backend base URL from config
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Search for this student ID on startup
    #[arg(long, value_name = "ID")]
    student: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let mut config = Config::load().context("load config")?;
    if let Some(url) = cli.base_url.as_deref() {
        let trimmed = url.trim();
        if !trimmed.is_empty() {
            config.base_url = trimmed.to_string();
        }
    }

    let Some(command) = cli.command else {
        // Default mode: run the TUI. Logs go to a file since the TUI owns
        // the terminal; the guard must outlive the UI to flush on exit.
        let logs_dir = paths::logs_dir();
        fs::create_dir_all(&logs_dir)
            .with_context(|| format!("create log directory {}", logs_dir.display()))?;
        let _guard = logging::init(&logs_dir).context("initialize logging")?;

        tracing::info!(base_url = config.base_url, "starting tav");
        return tav_tui::run(config, cli.student).await;
    };

    match command {
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                println!("{}", paths::config_path().display());
                Ok(())
            }
            ConfigCommands::Init => {
                let path = paths::config_path();
                Config::write_default(&path)?;
                println!("Wrote {}", path.display());
                Ok(())
            }
        },
    }
}
