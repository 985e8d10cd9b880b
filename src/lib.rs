//! MixDB Scraper: a paginated, best-effort catalog harvester
//!
//! This crate walks the MixesDB Explorer listing for one or more genres,
//! heuristically extracts mixes and their tracklists from loosely structured
//! listing pages, and tracks accept/discard statistics across the crawl.

pub mod catalog;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod model;
pub mod output;

use thiserror::Error;

/// Main error type for scraper operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid time filter '{0}' (expected Fresh, a year like 2024, or a decade like 2010s)")]
    InvalidTimeFilter(String),

    #[error("Scrape task for {0} did not complete")]
    TaskFailed(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for scraper operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{Category, CategoryTable, TimeFilter};
pub use config::Config;
pub use crawler::{CancelFlag, CategoryScrape, Harvester, StopReason};
pub use model::{Item, Subentry};
pub use output::{PageStats, RunStatistics};
