// ABOUTME: CLI entry point for table-snapshot-sync
// ABOUTME: Parses the save/restore verbs and routes to command handlers

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use table_snapshot_sync::commands;
use table_snapshot_sync::config::{self, SyncConfig};

#[derive(Parser)]
#[command(name = "table-snapshot-sync")]
#[command(about = "Sync a wide-column table store to and from a local SQLite snapshot", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct StoreArgs {
    /// Table store state file (JSON)
    #[arg(long)]
    store: PathBuf,
    /// SQLite snapshot file (defaults to <store file stem>.db)
    #[arg(long)]
    db: Option<PathBuf>,
    /// Path to a TOML config file (batch_size, timeout_secs)
    #[arg(long = "config")]
    config_path: Option<PathBuf>,
    /// Mutations per bulk-apply call (overrides config)
    #[arg(long)]
    batch_size: Option<usize>,
    /// Abort the run once this many seconds have passed (overrides config)
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl StoreArgs {
    fn db_path(&self) -> PathBuf {
        self.db
            .clone()
            .unwrap_or_else(|| commands::default_db_path(&self.store))
    }

    fn load_config(&self) -> anyhow::Result<SyncConfig> {
        let config = match &self.config_path {
            Some(path) => config::load_config_from_file(path)?,
            None => SyncConfig::default(),
        }
        .with_overrides(self.batch_size, self.timeout_secs);
        config.validate()?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Save every table of the store into the snapshot file
    Save {
        #[command(flatten)]
        args: StoreArgs,
    },
    /// Replace the contents of the store with the snapshot file
    Restore {
        #[command(flatten)]
        args: StoreArgs,
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - default to INFO level if RUST_LOG not set
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Save { args } => {
            let config = args.load_config()?;
            commands::save(&args.store, &args.db_path(), &config).await
        }
        Commands::Restore { args, yes } => {
            let config = args.load_config()?;
            commands::restore(&args.store, &args.db_path(), &config, yes).await
        }
    }
}
