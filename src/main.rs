// ABOUTME: CLI entry point for ynab-sync
// ABOUTME: Parses commands, resolves configuration and drives sync runs

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use ynab_sync::config::{self, Config, FileConfig, Overrides};
use ynab_sync::store::{self, CursorStore};
use ynab_sync::{RunnerConfig, SyncRunner, SyncStats, YnabClient};

#[derive(Parser)]
#[command(name = "ynab-sync")]
#[command(about = "Incremental YNAB-to-SQLite synchronization CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Set the log level (error, warn, info, debug, trace)
    #[arg(long, env = "YNAB_SYNC_LOG", global = true, default_value = "info")]
    log: String,
    /// Path to a ynab-sync.toml file
    #[arg(long = "config", global = true)]
    config_path: Option<PathBuf>,
    /// YNAB personal access token
    #[arg(long = "api-key", env = "YNAB_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,
    /// Budget to mirror ("last-used" is accepted by the API)
    #[arg(long = "budget-id", env = "YNAB_BUDGET_ID", global = true)]
    budget_id: Option<String>,
    /// Base URL of the YNAB API
    #[arg(long = "api-url", env = "YNAB_API_URL", global = true)]
    api_url: Option<String>,
    /// SQLite database file (default: ~/.ynab-sync/ynab.db)
    #[arg(long = "database", env = "YNAB_SYNC_DB", global = true)]
    database: Option<PathBuf>,
    /// Maximum category-month lookups in flight
    #[arg(long, env = "YNAB_SYNC_CONCURRENCY", global = true)]
    concurrency: Option<usize>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pull every change since the last run into the local database
    Sync {
        /// Keep running, syncing every SECS seconds until Ctrl+C
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,
    },
    /// Show cursors and row counts of the local database
    Status,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            api_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            budget_id: self.budget_id.clone(),
            database: self.database.clone(),
            concurrency: self.concurrency,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG takes precedence over --log / YNAB_SYNC_LOG
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log.clone()));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let file = match &cli.config_path {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let overrides = cli.overrides();

    match cli.command {
        Commands::Sync { interval } => {
            let config = Config::resolve(overrides, file)?;
            sync(config, interval).await
        }
        Commands::Status => {
            let path = config::database_path(&overrides, &file)?;
            status(&path)
        }
    }
}

async fn sync(config: Config, interval: Option<u64>) -> anyhow::Result<()> {
    tracing::debug!("Resolved configuration: {:?}", config);

    let client = YnabClient::new(&config.api_url, config.api_key.clone(), config.budget_id.clone())
        .context("Failed to build YNAB client")?;
    let mut conn = store::open(&config.database)?;
    let runner = SyncRunner::new(
        client,
        RunnerConfig {
            concurrency: config.concurrency,
        },
    );

    tracing::info!(
        "Syncing budget {} into {}",
        runner.source().budget_id(),
        config.database.display()
    );

    match interval {
        None => {
            let stats = runner
                .run_once(&mut conn)
                .await
                .context("Sync run failed; no changes were committed")?;
            print_stats(&stats);
        }
        Some(secs) => {
            if secs == 0 {
                anyhow::bail!("--interval must be at least 1 second");
            }

            println!();
            println!("========================================");
            println!("Starting continuous YNAB sync");
            println!("========================================");
            println!("  Sync interval: {}s", secs);
            println!("  Press Ctrl+C to stop");
            println!();

            let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel::<()>(1);

            tokio::spawn(async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for Ctrl+C: {}", e);
                    return;
                }
                tracing::info!("Received shutdown signal");
                let _ = shutdown_tx.send(());
            });

            runner
                .run(&mut conn, Duration::from_secs(secs), shutdown_rx)
                .await?;
        }
    }

    Ok(())
}

fn print_stats(stats: &SyncStats) {
    println!();
    println!("========================================");
    println!("YNAB sync complete");
    println!("========================================");
    println!("  Category groups:  {}", stats.category_groups);
    println!("  Categories:       {}", stats.categories);
    println!("  Months:           {}", stats.months);
    println!("  Accounts:         {}", stats.accounts);
    println!("  Transactions:     {}", stats.transactions);
    println!("  Subtransactions:  {}", stats.subtransactions);
    println!("  Payees:           {}", stats.payees);
    println!(
        "  Category months:  {} ({} lookups)",
        stats.category_months, stats.lookups
    );
    if !stats.is_complete() {
        println!("  Skipped lookups:  {}", stats.skipped_lookups.len());
        for skipped in &stats.skipped_lookups {
            println!(
                "    - {}/{}: {}",
                skipped.month_id, skipped.category_id, skipped.reason
            );
        }
    }
    println!("  Duration:         {}ms", stats.duration_ms);
}

fn status(path: &std::path::Path) -> anyhow::Result<()> {
    if !path.exists() {
        println!("No database at {} yet. Run `ynab-sync sync` first.", path.display());
        return Ok(());
    }

    let conn = store::open_read_only(path)?;
    let entries = CursorStore::new(&conn)
        .entries()
        .context("Failed to read sync cursors")?;
    let counts = store::row_counts(&conn).context("Failed to count rows")?;

    println!("Database: {}", path.display());
    println!();
    println!("Server knowledge:");
    for entry in entries {
        let updated = entry
            .updated_at
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "never".to_string());
        println!("  {:<14} {:>10}  (last advanced: {})", entry.endpoint, entry.value, updated);
    }
    println!();
    println!("Rows:");
    for (table, count) in counts {
        println!("  {:<18} {:>10}", table, count);
    }

    Ok(())
}
