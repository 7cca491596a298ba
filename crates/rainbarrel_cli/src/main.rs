//! rainbarrel CLI - mirror a Raindrop account into a local durable store.

mod commands;
mod config;
mod progress;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "rainbarrel")]
#[command(version)]
#[command(about = "Mirror Raindrop bookmarks into a local store with content enrichment")]
#[command(
    long_about = "rainbarrel syncs a Raindrop.io account (collections and saved links) into a \
local SQLite store, enriches each link with extracted page content and suggested tags, and \
exports a versioned JSON snapshot after every run."
)]
#[command(after_long_help = r#"EXAMPLES
    Incremental sync (default):
        $ rainbarrel sync

    Full resync of every collection:
        $ rainbarrel sync --full

    Preview a sync without writing anything:
        $ rainbarrel sync --dry-run

    Re-enrich a single link:
        $ rainbarrel reprocess 123456

    Show recent runs:
        $ rainbarrel runs --limit 10

CONFIGURATION
    rainbarrel reads configuration from:
      1. ~/.config/rainbarrel/config.toml (or $XDG_CONFIG_HOME/rainbarrel/config.toml)
      2. ./rainbarrel.toml
      3. Environment variables (RAINBARREL_* prefix)
      4. .env file in the current directory

ENVIRONMENT VARIABLES
    RAINBARREL_DATABASE_URL       Database connection string
    RAINBARREL_RAINDROP_TOKEN     Raindrop API token
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync collections and links from the remote account
    Sync(SyncArgs),
    /// Re-enrich a single link regardless of timestamps
    Reprocess(ReprocessArgs),
    /// Write a snapshot from the local store without touching the network
    Export(ExportArgs),
    /// List recorded sync runs
    Runs(RunsArgs),
    /// Manage the database schema
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Save the Raindrop API token to the config file
    Login {
        /// The API token to store
        token: String,
    },
}

#[derive(Debug, Clone, Args)]
struct SyncArgs {
    /// Treat every remote item as a candidate instead of using cursors
    #[arg(long)]
    full: bool,

    /// Compute counters without persisting or exporting
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Cursor override (RFC 3339), takes precedence over stored cursors
    #[arg(long, value_parser = parse_utc_timestamp)]
    since: Option<DateTime<Utc>>,

    /// Listing page size (default from config or 50)
    #[arg(long)]
    page_size: Option<u32>,

    /// Snapshot path (default from config)
    #[arg(long)]
    export: Option<PathBuf>,

    /// Disable proactive rate limiting (may cause API throttling)
    #[arg(short = 'R', long)]
    no_rate_limit: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Args)]
struct ReprocessArgs {
    /// Remote identifier of the link to re-enrich
    id: i64,

    /// Snapshot path (default from config)
    #[arg(long)]
    export: Option<PathBuf>,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Args)]
struct ExportArgs {
    /// Output path (default from config)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct RunsArgs {
    /// Maximum number of runs to list
    #[arg(short, long, default_value_t = 20)]
    limit: u64,
}

#[derive(Debug, Clone, Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Show migration status
    Status,
    /// Drop all tables and reapply migrations
    Fresh,
}

fn parse_utc_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| format!("invalid RFC 3339 timestamp {value:?}: {e}"))
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load();

    let code = match &cli.command {
        Commands::Sync(args) => commands::sync::run(&config, args).await,
        Commands::Reprocess(args) => commands::reprocess::run(&config, args).await,
        Commands::Export(args) => commands::export::run(&config, args).await,
        Commands::Runs(args) => commands::runs::run(&config, args).await,
        Commands::Migrate { action } => commands::migrate::run(&config, action).await,
        Commands::Login { token } => commands::login::run(token),
    };

    std::process::exit(code);
}
