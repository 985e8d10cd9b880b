//! Pagination controller - per-category scrape loop
//!
//! This module walks the Explorer listing for a category page by page:
//! - Building the query for each offset
//! - Fetching and extracting items
//! - Deduplicating by item id within the category
//! - Folding page statistics into the run statistics
//! - Deciding when to stop

use crate::catalog::{Category, CategoryTable, TimeFilter};
use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_page, FetchResult};
use crate::crawler::query::ExplorerQuery;
use crate::extract::{ItemExtractor, ListingPage};
use crate::model::Item;
use crate::output::RunStatistics;
use crate::{Result, ScrapeError};
use reqwest::Client;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Cooperative cancellation shared between the binary and running scrapes
///
/// Checked between pages, never mid-request.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Why a category scrape ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The requested number of items was collected
    LimitReached,
    /// A successful page produced no new items
    EndOfResults,
    /// The page carried no sign of a following page
    NoNextPage,
    /// The safety cap on pages was hit
    PageCap,
    Cancelled,
    /// Non-success status or network failure
    Transport(String),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::LimitReached => write!(f, "limit reached"),
            StopReason::EndOfResults => write!(f, "end of results"),
            StopReason::NoNextPage => write!(f, "no next page"),
            StopReason::PageCap => write!(f, "page cap reached"),
            StopReason::Cancelled => write!(f, "cancelled"),
            StopReason::Transport(error) => write!(f, "transport failure: {}", error),
        }
    }
}

/// Outcome of scraping one category
#[derive(Debug, Clone)]
pub struct CategoryScrape {
    pub category: Category,
    pub items: Vec<Item>,
    pub stats: RunStatistics,
    pub pages_fetched: u32,
    pub stop_reason: StopReason,
}

/// Drives category scrapes against the Explorer listing
///
/// Cloning is cheap; clones share the HTTP client, configuration, category
/// table and cancellation flag.
#[derive(Clone)]
pub struct Harvester {
    client: Client,
    config: Arc<Config>,
    table: Arc<CategoryTable>,
    extractor: Arc<ItemExtractor>,
    cancel: CancelFlag,
}

impl Harvester {
    /// Creates a harvester from a validated configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The scraper configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Ready to scrape
    /// * `Err(ScrapeError)` - The HTTP client could not be built
    pub fn new(config: Config) -> Result<Self> {
        let client = build_http_client(&config)?;
        let table = CategoryTable::from_config(&config);
        let extractor = ItemExtractor::with_window(config.scraper.window_chars);

        Ok(Self {
            client,
            config: Arc::new(config),
            table: Arc::new(table),
            extractor: Arc::new(extractor),
            cancel: CancelFlag::new(),
        })
    }

    /// Replaces the cancellation flag
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    /// Scrapes one category until a stop condition is met
    ///
    /// Transport failures end the scrape but are not errors: the items
    /// collected so far are returned with [`StopReason::Transport`].
    ///
    /// # Arguments
    ///
    /// * `name` - Category display name; unknown names fall back to free text
    /// * `limit` - Maximum number of items to return, `None` for no limit
    /// * `time_filter` - Listing time range
    /// * `require_subentries` - Discard items without a tracklist
    pub async fn scrape_category(
        &self,
        name: &str,
        limit: Option<usize>,
        time_filter: &TimeFilter,
        require_subentries: bool,
    ) -> Result<CategoryScrape> {
        let category = self.table.category(name);
        let scraper = &self.config.scraper;
        let page_size = scraper.page_size;
        let base_query =
            ExplorerQuery::for_category(&category, page_size).with_time_filter(time_filter);

        match &category.code {
            Some(code) => tracing::info!("Scraping {} (style {}), filter {}", name, code, time_filter),
            None => tracing::info!("Scraping {} (free-text category), filter {}", name, time_filter),
        }

        let mut stats = RunStatistics::new(name);
        let mut items: Vec<Item> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut offset = 0u32;
        let mut pages_fetched = 0u32;

        let stop_reason = loop {
            if limit.is_some_and(|limit| items.len() >= limit) {
                break StopReason::LimitReached;
            }
            if self.cancel.is_cancelled() {
                tracing::info!("Scrape of {} cancelled", name);
                break StopReason::Cancelled;
            }
            if pages_fetched >= scraper.max_pages {
                tracing::warn!("Reached page cap ({}) for {}", scraper.max_pages, name);
                break StopReason::PageCap;
            }

            let query = base_query.clone().with_offset(offset);
            let url = query.url(&scraper.base_url)?;
            pages_fetched += 1;
            tracing::info!("Scraping {} - page {}: {}", name, pages_fetched, url);

            let body = match fetch_page(&self.client, url.as_str()).await {
                FetchResult::Success { body, .. } => body,
                FetchResult::HttpError { status_code } => {
                    tracing::warn!("Failed to fetch {}: HTTP {}", url, status_code);
                    break StopReason::Transport(format!("HTTP {}", status_code));
                }
                FetchResult::NetworkError { error } => {
                    tracing::error!("Failed to fetch {}: {}", url, error);
                    break StopReason::Transport(error);
                }
            };

            let page = ListingPage::parse(&body, &url);
            let mut extraction = self
                .extractor
                .extract_items(&page, &category, require_subentries);
            extraction.stats.page = pages_fetched;
            extraction.stats.offset = offset;

            let mut fresh = Vec::with_capacity(extraction.items.len());
            for item in extraction.items {
                if seen.insert(item.id().to_string()) {
                    fresh.push(item);
                } else {
                    tracing::debug!("Duplicate item {} on page {}", item.id(), pages_fetched);
                    extraction.stats.reclassify_duplicate();
                }
            }

            stats.record_page(extraction.stats);
            if let Some(last) = stats.pages.last() {
                tracing::info!("{}", stats.format_progress(last));
            }

            if fresh.is_empty() {
                tracing::info!("No more results for {}", name);
                break StopReason::EndOfResults;
            }

            items.extend(fresh);
            if let Some(limit) = limit {
                if items.len() >= limit {
                    items.truncate(limit);
                    tracing::info!("Reached target of {} items for {}", limit, name);
                    break StopReason::LimitReached;
                }
            }

            let full_page = page.anchors().len() >= page_size as usize;
            if !page.has_next_control(offset) && !full_page {
                tracing::info!("No more pages for {}", name);
                break StopReason::NoNextPage;
            }

            offset += page_size;
            if scraper.request_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(scraper.request_delay_ms)).await;
            }
        };

        tracing::info!(
            "Finished {}: {} items from {} pages ({})",
            name,
            items.len(),
            pages_fetched,
            stop_reason
        );

        Ok(CategoryScrape {
            category,
            items,
            stats,
            pages_fetched,
            stop_reason,
        })
    }

    /// Scrapes several categories concurrently
    ///
    /// At most `max-concurrent-categories` scrapes run at once. Each
    /// category's `target` is clamped to its expected count when one is
    /// known. Results come back in the order of `names`, one per name.
    pub async fn scrape_categories(
        &self,
        names: &[String],
        target: Option<usize>,
        time_filter: &TimeFilter,
        require_subentries: bool,
    ) -> Vec<(String, Result<CategoryScrape>)> {
        let semaphore = Arc::new(Semaphore::new(self.config.scraper.max_concurrent_categories));
        let mut tasks = JoinSet::new();

        for (index, name) in names.iter().enumerate() {
            let harvester = self.clone();
            let semaphore = Arc::clone(&semaphore);
            let name = name.clone();
            let time_filter = time_filter.clone();
            let limit = target.map(|t| harvester.table.category(&name).clamp_target(t));

            tasks.spawn(async move {
                // The semaphore is never closed
                let _permit = semaphore.acquire_owned().await;
                let result = harvester
                    .scrape_category(&name, limit, &time_filter, require_subentries)
                    .await;
                (index, result)
            });
        }

        let mut slots: Vec<Option<Result<CategoryScrape>>> =
            names.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => tracing::error!("Category task failed: {}", e),
            }
        }

        pair_with_names(names, slots)
    }
}

/// Pairs each category name with its result, in input order
///
/// A missing slot means the task never reported back.
fn pair_with_names(
    names: &[String],
    slots: Vec<Option<Result<CategoryScrape>>>,
) -> Vec<(String, Result<CategoryScrape>)> {
    names
        .iter()
        .zip(slots)
        .map(|(name, slot)| {
            let result = slot.unwrap_or_else(|| Err(ScrapeError::TaskFailed(name.clone())));
            (name.clone(), result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_flag_is_shared() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        assert!(!clone.is_cancelled());
        flag.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_harvester_uses_configured_categories() {
        let mut config = Config::default();
        config.categories.push(crate::config::CategoryEntry {
            name: "Acid".to_string(),
            code: Some("AC".to_string()),
            aliases: Vec::new(),
            expected_count: None,
        });
        let harvester = Harvester::new(config).unwrap();
        assert_eq!(harvester.table().resolve_filter_code("Acid"), Some("AC"));
        assert_eq!(harvester.table().resolve_filter_code("Techno"), None);
    }

    #[test]
    fn test_lost_task_keeps_its_category() {
        let names = vec!["Techno".to_string(), "House".to_string()];
        let slots = vec![None, Some(Err(ScrapeError::InvalidTimeFilter("x".into())))];
        let results = pair_with_names(&names, slots);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "Techno");
        assert!(matches!(&results[0].1, Err(ScrapeError::TaskFailed(name)) if name == "Techno"));
        assert_eq!(results[1].0, "House");
        assert!(matches!(results[1].1, Err(ScrapeError::InvalidTimeFilter(_))));
    }

    #[test]
    fn test_stop_reason_display() {
        assert_eq!(
            StopReason::Transport("HTTP 503".to_string()).to_string(),
            "transport failure: HTTP 503"
        );
        assert_eq!(StopReason::PageCap.to_string(), "page cap reached");
    }
}
