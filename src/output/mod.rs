//! Output module for scrape statistics and reports
//!
//! This module handles:
//! - Per-page and cumulative accept/discard statistics
//! - Writing and reading the JSON run report

mod json;
pub mod stats;

pub use json::{
    default_report_path, load_report, save_report, ScrapeReport, ScrapeSession, SessionStatus,
};
pub use stats::{print_statistics, PageStats, RunStatistics, StatTotals};
