//! Command-line and environment configuration.

pub mod duration;

use std::path::PathBuf;
use std::time::Duration;

use catalog_sync_contentful_source::ContentfulConfig;
use clap::{Parser, ValueEnum};

pub use duration::{parse_datetime, parse_datetime_arg, parse_duration, parse_duration_arg};

/// Contentful connection options
#[derive(Parser, Clone, Debug)]
pub struct ContentfulOpts {
    /// Contentful space id
    #[arg(long, env = "CONTENTFUL_SPACE_ID")]
    pub space_id: String,

    /// Content Delivery API access token
    #[arg(long, env = "CONTENTFUL_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,

    /// Content type id of product entries
    #[arg(long, env = "CONTENTFUL_CONTENT_TYPE")]
    pub content_type: String,

    /// Environment id (defaults to the space's master environment)
    #[arg(long, env = "CONTENTFUL_ENVIRONMENT")]
    pub environment: Option<String>,

    /// Locale used to read localized fields
    #[arg(long, env = "CONTENTFUL_LOCALE", default_value = "en-US")]
    pub locale: String,

    /// Content Delivery API base URL
    #[arg(
        long,
        env = "CONTENTFUL_BASE_URL",
        default_value = "https://cdn.contentful.com"
    )]
    pub base_url: String,

    /// Per-request timeout, e.g. "30s" or "2m"
    #[arg(
        long,
        env = "CONTENTFUL_TIMEOUT",
        default_value = "30s",
        value_parser = parse_duration_arg
    )]
    pub timeout: Duration,
}

// CLI type → source library type conversion
impl From<&ContentfulOpts> for ContentfulConfig {
    fn from(opts: &ContentfulOpts) -> Self {
        let config = ContentfulConfig::new(
            opts.space_id.clone(),
            opts.access_token.clone(),
            opts.content_type.clone(),
        )
        .with_base_url(opts.base_url.clone())
        .with_locale(opts.locale.clone())
        .with_timeout(opts.timeout);
        match &opts.environment {
            Some(env) if !env.trim().is_empty() => config.with_environment(env.clone()),
            _ => config,
        }
    }
}

/// Where the resume cursor is kept
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CursorStoreKind {
    /// The `sync_state` table next to the products
    #[value(name = "postgres")]
    Postgres,
    /// A JSON file in `--cursor-dir`
    #[value(name = "filesystem")]
    Filesystem,
}

/// Local storage options
#[derive(Parser, Clone, Debug)]
pub struct StoreOpts {
    /// PostgreSQL connection string for the product store
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// Cursor store backend
    #[arg(
        long,
        value_enum,
        env = "CATALOG_SYNC_CURSOR_STORE",
        default_value = "postgres"
    )]
    pub cursor_store: CursorStoreKind,

    /// Directory for the filesystem cursor store
    #[arg(long, env = "CATALOG_SYNC_CURSOR_DIR", default_value = ".catalog-sync")]
    pub cursor_dir: PathBuf,
}
