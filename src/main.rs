//! version-guard: pre-commit check that the descriptor version was bumped
//!
//! Checks each given directory in turn and prints one line per directory.

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use version_guard::{check_target, CheckReport, GitService, GitTool, ProjectConfig};

/// Fail when a modified build descriptor still carries the committed version
#[derive(Parser, Debug)]
#[command(name = "version-guard")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directories to check
    #[arg(default_value = ".")]
    directories: Vec<PathBuf>,

    /// Print one JSON report per directory
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Clone this repository into the (single) target directory first
    #[arg(long, value_name = "URI")]
    clone: Option<String>,
}

/// Initialize logging with RUST_LOG environment variable support
fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

async fn clone_into(tool: Arc<GitTool>, uri: String, target: PathBuf) -> Result<()> {
    tokio::task::spawn_blocking(move || -> Result<()> {
        std::fs::create_dir_all(&target)
            .with_context(|| format!("Failed to create {}", target.display()))?;
        GitService::new(tool, target.clone())?.clone(&uri, &target)?;
        tracing::info!("Cloned {} into {}", uri, target.display());
        Ok(())
    })
    .await?
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let invocation_config = ProjectConfig::load_for(Path::new("."))
        .context("Failed to load configuration for the current directory")?;
    let tool = Arc::new(GitTool::from_config(&invocation_config.git));
    let version = tool.ensure_available().context("git is not usable")?;
    tracing::info!("Starting version-guard with {}", version);

    if let Some(uri) = cli.clone.clone() {
        anyhow::ensure!(
            cli.directories.len() == 1,
            "--clone takes exactly one target directory"
        );
        clone_into(Arc::clone(&tool), uri, cli.directories[0].clone()).await?;
    }

    let mut needs_attention = false;
    for directory in cli.directories {
        let tool = Arc::clone(&tool);
        let target = directory.clone();
        // A target whose own configuration is broken is reported, not fatal
        let task = tokio::task::spawn_blocking(move || check_target(tool, &target));

        // An interrupted check still runs to completion (and cleans up) on its blocking thread
        let outcome = tokio::select! {
            res = task => res.context("Check task failed")?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, shutting down gracefully");
                break;
            }
        };

        let report = CheckReport::new(directory, outcome);
        needs_attention |= report.outcome.needs_attention();

        if cli.json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!("{}", report.message());
        }
    }

    Ok(if needs_attention {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("version-guard: {:#}", e);
            ExitCode::from(2)
        }
    }
}
