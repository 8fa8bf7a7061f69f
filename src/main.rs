//! Command-line interface for catalog-sync
//!
//! # Usage Examples
//!
//! ## Sync
//! ```bash
//! # One run: initial when the store is empty, incremental afterwards
//! catalog-sync sync \
//!   --space-id abc123 --access-token $TOKEN --content-type product \
//!   --database-url postgres://localhost/catalog
//!
//! # Hourly runs, cursor kept in a local file
//! catalog-sync watch --interval 1h --cursor-store filesystem --cursor-dir /var/lib/catalog-sync
//! ```
//!
//! ## Reading
//! ```bash
//! catalog-sync products --name lamp --price-min 10 --price-max 50 --page 1 --limit 5
//! catalog-sync report pricing
//! catalog-sync report active-created-between --from 2024-01-01 --to 2024-06-30
//! catalog-sync cursor
//! ```
//!
//! Every option can also be set through the environment variable named in
//! `--help`. Logs go to stderr, filtered by `RUST_LOG` (default `info`);
//! results are printed to stdout as JSON.

use std::time::Duration;

use anyhow::Context;
use catalog_sync::checkpoint::{CursorStore, FilesystemStore, PostgresStore};
use catalog_sync::config::{parse_datetime_arg, parse_duration_arg};
use catalog_sync::contentful::ContentfulClient;
use catalog_sync::product_store::{self, PostgresRecordStore, RecordStore};
use catalog_sync::reports::{self, DateRange, DEFAULT_TOP_LIMIT};
use catalog_sync::sync_core::{DeletedFilter, PageRequest, ProductFilter, SourceClient};
use catalog_sync::{watch, ContentfulOpts, CursorStoreKind, StoreOpts, SyncEngine};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "catalog-sync")]
#[command(about = "Synchronize a Contentful product catalog into PostgreSQL")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one sync to completion
    Sync {
        #[command(flatten)]
        contentful: ContentfulOpts,

        #[command(flatten)]
        store: StoreOpts,
    },

    /// Sync now and then on a fixed interval until interrupted
    Watch {
        #[command(flatten)]
        contentful: ContentfulOpts,

        #[command(flatten)]
        store: StoreOpts,

        /// Time between runs, e.g. "1h", "30m"
        #[arg(long, default_value = "1h", value_parser = parse_duration_arg)]
        interval: Duration,
    },

    /// List stored products
    Products {
        #[command(flatten)]
        store: StoreOpts,

        /// Page number, starting at 1
        #[arg(long, default_value = "1")]
        page: u32,

        /// Products per page
        #[arg(long, default_value = "5")]
        limit: u32,

        /// Case-insensitive name substring
        #[arg(long)]
        name: Option<String>,

        /// Category id
        #[arg(long)]
        category: Option<String>,

        /// Minimum price (inclusive)
        #[arg(long)]
        price_min: Option<Decimal>,

        /// Maximum price (inclusive)
        #[arg(long)]
        price_max: Option<Decimal>,

        /// Leave soft-deleted products out
        #[arg(long)]
        exclude_deleted: bool,
    },

    /// Aggregate reports
    Report {
        #[command(flatten)]
        store: StoreOpts,

        #[command(subcommand)]
        report: ReportCommand,
    },

    /// Print the stored resume cursor
    Cursor {
        #[command(flatten)]
        store: StoreOpts,
    },
}

#[derive(Subcommand)]
enum ReportCommand {
    /// Percentage of products that are deleted
    Deleted,
    /// Percentage of non-deleted products with and without a price
    Pricing,
    /// Most expensive products
    TopPriced {
        #[arg(long, default_value_t = DEFAULT_TOP_LIMIT)]
        limit: u32,
    },
    /// Products created in a date range (inclusive)
    CreatedBetween {
        #[arg(long, value_parser = parse_datetime_arg)]
        from: DateTime<Utc>,
        #[arg(long, value_parser = parse_datetime_arg)]
        to: DateTime<Utc>,
    },
    /// Non-deleted products created in a date range, as a share of all products
    ActiveCreatedBetween {
        #[arg(long, value_parser = parse_datetime_arg)]
        from: DateTime<Utc>,
        #[arg(long, value_parser = parse_datetime_arg)]
        to: DateTime<Utc>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sync { contentful, store } => {
            run_sync(&contentful, &store, None).await?;
        }
        Commands::Watch {
            contentful,
            store,
            interval,
        } => {
            run_sync(&contentful, &store, Some(interval)).await?;
        }
        Commands::Products {
            store,
            page,
            limit,
            name,
            category,
            price_min,
            price_max,
            exclude_deleted,
        } => {
            let records = open_records(&store).await?;
            let filter = ProductFilter {
                name,
                category,
                price_min,
                price_max,
                deleted: if exclude_deleted {
                    DeletedFilter::Exclude
                } else {
                    DeletedFilter::Include
                },
                ..ProductFilter::default()
            };
            let listing = records
                .list(&filter, &PageRequest::new(page, limit))
                .await
                .context("Failed to list products")?;
            print_json(&listing)?;
        }
        Commands::Report { store, report } => {
            let records = open_records(&store).await?;
            run_report(&records, report).await?;
        }
        Commands::Cursor { store } => {
            let cursors = open_cursors(&store).await?;
            match cursors.get().await.context("Failed to read sync cursor")? {
                Some(stored) => print_json(&stored)?,
                None => println!("No sync cursor stored"),
            }
        }
    }

    Ok(())
}

async fn open_records(store: &StoreOpts) -> anyhow::Result<PostgresRecordStore> {
    let client = product_store::connect(&store.database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;
    let records = PostgresRecordStore::new(client);
    records
        .ensure_schema()
        .await
        .context("Failed to create products table")?;
    Ok(records)
}

async fn open_cursors(store: &StoreOpts) -> anyhow::Result<Box<dyn CursorStore>> {
    match store.cursor_store {
        CursorStoreKind::Filesystem => Ok(Box::new(FilesystemStore::new(&store.cursor_dir))),
        CursorStoreKind::Postgres => {
            let client = product_store::connect(&store.database_url)
                .await
                .context("Failed to connect to PostgreSQL")?;
            let cursors = PostgresStore::new(client);
            cursors
                .ensure_schema()
                .await
                .context("Failed to create sync_state table")?;
            Ok(Box::new(cursors))
        }
    }
}

async fn run_sync(
    contentful: &ContentfulOpts,
    store: &StoreOpts,
    interval: Option<Duration>,
) -> anyhow::Result<()> {
    let source = ContentfulClient::new(contentful.into())
        .context("Invalid Contentful configuration")?;

    let client = product_store::connect(&store.database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;
    let records = PostgresRecordStore::new(client.clone());
    records
        .ensure_schema()
        .await
        .context("Failed to create products table")?;

    // Branch once on the cursor backend; everything below is monomorphized.
    match store.cursor_store {
        CursorStoreKind::Postgres => {
            let cursors = PostgresStore::new(client);
            cursors
                .ensure_schema()
                .await
                .context("Failed to create sync_state table")?;
            drive(SyncEngine::new(source, records, cursors), interval).await
        }
        CursorStoreKind::Filesystem => {
            tracing::info!("Using cursor directory {}", store.cursor_dir.display());
            let cursors = FilesystemStore::new(&store.cursor_dir);
            drive(SyncEngine::new(source, records, cursors), interval).await
        }
    }
}

async fn drive<S, R, C>(engine: SyncEngine<S, R, C>, interval: Option<Duration>) -> anyhow::Result<()>
where
    S: SourceClient,
    R: RecordStore,
    C: CursorStore,
{
    match interval {
        None => {
            let report = engine.run().await.context("Sync failed")?;
            print_json(&report)?;
        }
        Some(period) => {
            let shutdown = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for Ctrl-C: {e}");
                    std::future::pending::<()>().await;
                }
            };
            let summary = watch(&engine, period, shutdown)
                .await
                .context("Watch stopped")?;
            print_json(&summary)?;
        }
    }
    Ok(())
}

async fn run_report<R: RecordStore>(records: &R, report: ReportCommand) -> anyhow::Result<()> {
    match report {
        ReportCommand::Deleted => {
            print_json(&reports::deleted_percentage(records).await?)?;
        }
        ReportCommand::Pricing => {
            print_json(&reports::price_coverage(records).await?)?;
        }
        ReportCommand::TopPriced { limit } => {
            print_json(&reports::top_priced(records, limit).await?)?;
        }
        ReportCommand::CreatedBetween { from, to } => {
            let range = date_range(from, to)?;
            print_json(&reports::created_between(records, &range).await?)?;
        }
        ReportCommand::ActiveCreatedBetween { from, to } => {
            let range = date_range(from, to)?;
            print_json(&reports::active_created_between(records, &range).await?)?;
        }
    }
    Ok(())
}

fn date_range(from: DateTime<Utc>, to: DateTime<Utc>) -> anyhow::Result<DateRange> {
    if from > to {
        anyhow::bail!("--from ({from}) is after --to ({to})");
    }
    Ok(DateRange::new(from, to))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
