//! JSON result persistence
//!
//! A scrape run is written as a single pretty-printed JSON document holding
//! the session record and every accepted item.

use crate::model::Item;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Lifecycle of a scrape session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Running,
    Completed,
    Interrupted,
    Failed,
}

/// Bookkeeping for one scrape run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeSession {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub categories_scraped: Vec<String>,
    pub total_items: usize,
    pub status: SessionStatus,
    pub config_hash: Option<String>,
}

impl ScrapeSession {
    /// Starts a new running session
    pub fn start(config_hash: Option<String>) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            finished_at: None,
            categories_scraped: Vec::new(),
            total_items: 0,
            status: SessionStatus::Running,
            config_hash,
        }
    }

    pub fn record_category(&mut self, category: &str, items: usize) {
        if !self.categories_scraped.iter().any(|c| c == category) {
            self.categories_scraped.push(category.to_string());
        }
        self.total_items += items;
    }

    /// Stamps the finish time and final status
    pub fn finish(&mut self, status: SessionStatus) {
        self.finished_at = Some(Utc::now());
        self.status = status;
    }
}

/// Document written at the end of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeReport {
    pub timestamp: DateTime<Utc>,
    pub total_items: usize,
    pub prefix: String,
    pub session: ScrapeSession,
    pub items: Vec<Item>,
}

impl ScrapeReport {
    /// Builds the report for the merged item list
    ///
    /// The session total is reset to the merged count, since items listed
    /// under several categories were tallied once per category while running.
    pub fn new(prefix: &str, mut session: ScrapeSession, items: Vec<Item>) -> Self {
        session.total_items = items.len();
        Self {
            timestamp: Utc::now(),
            total_items: items.len(),
            prefix: prefix.to_string(),
            session,
            items,
        }
    }
}

/// Default report location, `<dir>/<prefix>_<YYYYmmdd_HHMMSS>.json`
pub fn default_report_path(directory: &Path, prefix: &str) -> PathBuf {
    let stamp = Utc::now().format("%Y%m%d_%H%M%S");
    directory.join(format!("{}_{}.json", prefix, stamp))
}

/// Writes a report as pretty JSON, creating parent directories as needed
///
/// # Arguments
///
/// * `report` - The report to write
/// * `path` - Destination file
pub fn save_report(report: &ScrapeReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;

    tracing::info!("Saved {} items to {}", report.total_items, path.display());
    Ok(())
}

/// Reads a report previously written by [`save_report`]
pub fn load_report(path: &Path) -> Result<ScrapeReport> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
