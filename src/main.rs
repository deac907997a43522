// src/main.rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rehome::config::RehomeConfig;
use rehome::store::{HttpContentStore, HttpResourceFetcher, S3ObjectStore, S3Options};
use rehome::{Migration, MigrationOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "rehome")]
#[command(author, version, about = "Migrate embedded resources out of content records into an object store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the migration against the configured stores
    Run {
        /// Configuration file path
        #[arg(short, long, default_value = "rehome.toml")]
        config: PathBuf,
        /// Disable the progress bar
        #[arg(long)]
        no_progress: bool,
    },
    /// List migratable references without changing anything
    Scan {
        /// Configuration file path
        #[arg(short, long, default_value = "rehome.toml")]
        config: PathBuf,
    },
}

/// Wire the configured stores into a ready-to-run pipeline
fn build_migration(config: &RehomeConfig) -> Result<Migration> {
    let store = Arc::new(HttpContentStore::new(
        &config.content_store.base_url,
        config.content_store.token.clone(),
        config.content_timeout()?,
    )?);
    let objects = Arc::new(S3ObjectStore::new(&S3Options {
        bucket: config.object_store.bucket.clone(),
        region: config.object_store.region.clone(),
        endpoint: config.object_store.endpoint.clone(),
        access_key: config.object_store.access_key.clone(),
        secret_key: config.object_store.secret_key.clone(),
        public_base_url: config.object_store.public_base_url.clone(),
    })?);
    let fetcher = Arc::new(HttpResourceFetcher::new(config.fetch_timeout()?)?);

    let migration = Migration::new(
        store,
        objects,
        fetcher,
        MigrationOptions {
            origin: config.fetch.origin.clone(),
            key_prefix: config.key_prefix(),
            path_prefixes: config.extract.path_prefixes.clone(),
            record_concurrency: config.migration.record_concurrency,
            resource_concurrency: config.migration.resource_concurrency,
        },
    )?;
    Ok(migration)
}

async fn run(config_path: &Path, no_progress: bool) -> Result<()> {
    let config = RehomeConfig::load(config_path)?;
    info!("Loaded configuration from {}", config_path.display());
    let migration = build_migration(&config)?;

    let progress = if no_progress {
        None
    } else {
        Some(record_progress_bar())
    };
    let report = migration.run(progress.as_ref()).await?;
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    println!("{report}");
    Ok(())
}

async fn scan(config_path: &Path) -> Result<()> {
    let config = RehomeConfig::load(config_path)?;
    info!("Loaded configuration from {}", config_path.display());
    let migration = build_migration(&config)?;

    let report = migration.scan().await?;
    for (id, found) in &report.details {
        println!("{id}: {found} resources");
    }
    println!("{report}");
    Ok(())
}

fn record_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} records {msg}",
            )
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    pb
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run {
            config,
            no_progress,
        }) => run(&config, no_progress).await,
        Some(Commands::Scan { config }) => scan(&config).await,
        None => {
            // No command provided, show help
            println!("Rehome Resource Migration v{}", env!("CARGO_PKG_VERSION"));
            println!("Run 'rehome --help' for usage information");
            Ok(())
        }
    }
}
