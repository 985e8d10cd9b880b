//! Crawler module for walking the Explorer listing
//!
//! This module contains the scraping loop, including:
//! - Building Explorer listing queries
//! - HTTP fetching
//! - Per-category pagination, deduplication and stop conditions
//! - Running several categories concurrently

mod controller;
mod fetcher;
mod query;

pub use controller::{CancelFlag, CategoryScrape, Harvester, StopReason};
pub use fetcher::{build_http_client, fetch_page, FetchResult};
pub use query::{ExplorerQuery, EXPLORER_PATH};
