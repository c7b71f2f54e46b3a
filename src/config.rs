//! # Run Configuration
//!
//! Everything a run needs is read from the environment (after `.env` has been
//! loaded by `dotenvy`). Every variable is optional; the defaults reproduce a
//! full harvest of kyou.id into `database/kyou_scraping.db`.
//!
//! | Variable | Default |
//! |---|---|
//! | `KYOU_BASE_URL` | `https://kyou.id` |
//! | `KYOU_SEARCH_QUERY` | empty (whole catalog) |
//! | `KYOU_TOTAL_PAGES` | `25` |
//! | `KYOU_SCROLLS_PER_PAGE` | `10` |
//! | `KYOU_PAGE_DELAY_MS` | `500` |
//! | `KYOU_SENTINEL_STATUS` | `Prototype Showcase` |
//! | `KYOU_OUTPUT_CSV` | `product_details.csv` (empty disables the file) |
//! | `KYOU_BASE_POLICY` | `replace` (or `accumulate`) |
//! | `DATABASE_URL` | `sqlite:database/kyou_scraping.db` |

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::database::BasePolicy;
use crate::scrapers::kyou;

/// Status of display-only listings, which carry no meaningful price.
pub const DEFAULT_SENTINEL_STATUS: &str = "Prototype Showcase";

const DEFAULT_PAGE_DELAY_MS: u64 = 500;

/// Settings for the catalog pipeline itself
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Search term substituted into the listing URL
    pub search_query: String,
    /// Listing pages 1..=total_pages are walked unless the catalog ends earlier
    pub total_pages: u32,
    /// Lazy-load triggers per listing page; identifiers are collected after each
    pub scrolls_per_page: u32,
    /// Pause between listing pages
    pub page_delay: Duration,
    /// Records with this status are dropped before persisting
    pub sentinel_status: String,
    /// Interchange file written before ingest; `None` hands records over in memory
    pub output_csv: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            search_query: String::new(),
            total_pages: 25,
            scrolls_per_page: 10,
            page_delay: Duration::from_millis(DEFAULT_PAGE_DELAY_MS),
            sentinel_status: DEFAULT_SENTINEL_STATUS.to_string(),
            output_csv: Some(PathBuf::from("product_details.csv")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub database_url: String,
    pub base_policy: BasePolicy,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Reads the configuration from environment variables.
    ///
    /// # Errors
    /// Fails when a numeric variable or `KYOU_BASE_POLICY` cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = PipelineConfig::default();

        let number = |key: &str, default: u64| -> Result<u64> {
            var(key).map_or(Ok(default), |v| {
                v.trim()
                    .parse()
                    .with_context(|| format!("{key} must be a non-negative integer, got {v:?}"))
            })
        };

        let base_policy = match var("KYOU_BASE_POLICY") {
            Some(v) => v.parse().map_err(anyhow::Error::msg)?,
            None => BasePolicy::default(),
        };

        let output_csv = match var("KYOU_OUTPUT_CSV") {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(PathBuf::from(v)),
            None => defaults.output_csv,
        };

        let pipeline = PipelineConfig {
            search_query: var("KYOU_SEARCH_QUERY").unwrap_or(defaults.search_query),
            total_pages: u32::try_from(number("KYOU_TOTAL_PAGES", defaults.total_pages.into())?)
                .context("KYOU_TOTAL_PAGES is too large")?,
            scrolls_per_page: u32::try_from(number(
                "KYOU_SCROLLS_PER_PAGE",
                defaults.scrolls_per_page.into(),
            )?)
            .context("KYOU_SCROLLS_PER_PAGE is too large")?,
            page_delay: Duration::from_millis(number("KYOU_PAGE_DELAY_MS", DEFAULT_PAGE_DELAY_MS)?),
            sentinel_status: var("KYOU_SENTINEL_STATUS").unwrap_or(defaults.sentinel_status),
            output_csv,
        };

        Ok(Self {
            base_url: var("KYOU_BASE_URL").unwrap_or_else(|| kyou::BASE_URL.to_string()),
            database_url: var("DATABASE_URL")
                .unwrap_or_else(|| "sqlite:database/kyou_scraping.db".to_string()),
            base_policy,
            pipeline,
        })
    }
}
