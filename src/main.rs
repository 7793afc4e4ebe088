//! Commit Leaderboard
//!
//! Scores recent commits of a Git repository and writes per-period contributor
//! leaderboards as JSON.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tokio::runtime::Runtime;
use tracing::info;
use tracing_subscriber::EnvFilter;

use commit_leaderboard::analysis::{analyze_repo_async, select_estimator, AnalysisOptions};
use commit_leaderboard::{LeaderboardConfig, ManualContributions};

#[derive(Parser)]
#[command(name = "commit-leaderboard")]
#[command(about = "Rank contributors by the significance of their recent commits")]
#[command(version)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence when set)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the last 180 days of history and write the leaderboard report
    Analyze {
        /// Path to the Git repository
        #[arg(long, default_value = ".")]
        repo: PathBuf,

        /// Report output path
        #[arg(long, default_value = "leaderboard-data.json")]
        output: PathBuf,

        /// API key for remote impact scoring (falls back to config, then ANTHROPIC_API_KEY)
        #[arg(long)]
        api_key: Option<String>,

        /// Manual contribution dataset (overrides config file)
        #[arg(long)]
        manual: Option<PathBuf>,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Work with the manual contribution dataset
    Contributions {
        #[command(subcommand)]
        action: ContributionsAction,
    },
}

#[derive(Subcommand)]
enum ContributionsAction {
    /// Write the dataset back out in the dated-list shape
    Export {
        /// Manual contribution dataset (overrides config file)
        #[arg(long)]
        manual: Option<PathBuf>,

        /// Where to write the normalized dataset
        #[arg(long)]
        output: PathBuf,

        /// Path to config file (default: auto-discover)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose || cfg!(feature = "dev") {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<LeaderboardConfig> {
    LeaderboardConfig::discover(path).context("failed to load configuration")
}

fn run_analyze(
    repo: PathBuf,
    output: PathBuf,
    api_key: Option<String>,
    manual: Option<PathBuf>,
    config: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let estimator = select_estimator(&config.impact, config.resolve_api_key(api_key));
    let contributions = ManualContributions::load_or_empty(&config.manual_contributions_path(manual));

    let options = AnalysisOptions {
        repo_path: repo,
        workers: config.worker_count(),
    };

    let rt = Runtime::new().context("failed to start async runtime")?;
    let (report, summary) =
        rt.block_on(analyze_repo_async(options, estimator, &contributions, Utc::now()))?;

    report.write_to(&output)?;
    info!(
        "Processed {} commits: {} significant, {} simple",
        summary.total, summary.significant, summary.simple
    );
    info!("Leaderboard data written to {}", output.display());
    Ok(())
}

fn run_export(manual: Option<PathBuf>, output: PathBuf, config: Option<PathBuf>) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let source = config.manual_contributions_path(manual);
    let contributions = ManualContributions::load(&source)
        .with_context(|| format!("failed to read {}", source.display()))?;

    contributions
        .write_normalized(&output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!(
        authors = contributions.author_count(),
        "Exported manual contributions to {}",
        output.display()
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Analyze {
            repo,
            output,
            api_key,
            manual,
            config,
        } => run_analyze(repo, output, api_key, manual, config),
        Commands::Contributions { action } => match action {
            ContributionsAction::Export {
                manual,
                output,
                config,
            } => run_export(manual, output, config),
        },
    }
}
