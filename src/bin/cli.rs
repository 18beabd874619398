//! Marquee Scraper CLI
//!
//! Local execution entry point. For AWS Lambda, use `marquee-lambda`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use marquee::{
    error::Result,
    models::{Config, StorageBackend},
    pipeline,
    storage::{LocalStore, ShowtimeStore},
};

/// Marquee - Hollywood Theatre Showtime Scraper
#[derive(Parser, Debug)]
#[command(name = "marquee", version, about = "Theater calendar showtime scraper")]
struct Cli {
    /// Path to storage directory containing config files
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape the calendar and store every valid showtime
    Run {
        /// Scrape and normalize only; skip all stores
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate configuration files
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("Marquee scraper starting...");

    // Load configuration
    let config_path = cli.storage_dir.join("config.toml");
    let config = Arc::new(Config::load_or_default(&config_path));

    match cli.command {
        Command::Run { dry_run } => {
            config.validate()?;

            let summary = if dry_run {
                pipeline::run_preview(Arc::clone(&config)).await?
            } else {
                let store = build_store(&config, &cli.storage_dir).await?;
                pipeline::run_pipeline(Arc::clone(&config), store.as_ref()).await?
            };

            log::info!(
                "Run complete: {} scraped, {} stored, {} rejected, {} store failures",
                summary.scraped,
                summary.stored,
                summary.rejected,
                summary.store_failures
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("Config OK (venue, selectors, normalization, and storage)");
        }
    }

    log::info!("Done!");

    Ok(())
}

/// Build the configured storage backend.
async fn build_store(config: &Config, storage_dir: &PathBuf) -> Result<Box<dyn ShowtimeStore>> {
    match config.storage.backend {
        StorageBackend::Local => {
            let path = storage_dir.join("showtimes.json");
            log::info!("Storing showtimes in {}", path.display());
            Ok(Box::new(LocalStore::new(path)))
        }

        #[cfg(feature = "dynamodb")]
        StorageBackend::Dynamodb => {
            log::info!("Storing showtimes in DynamoDB table {}", config.storage.table_name);
            Ok(Box::new(
                marquee::storage::DynamoStore::from_config(&config.storage).await,
            ))
        }

        #[cfg(not(feature = "dynamodb"))]
        StorageBackend::Dynamodb => Err(marquee::error::AppError::config(
            "storage.backend = \"dynamodb\" requires building with the `dynamodb` feature",
        )),
    }
}
