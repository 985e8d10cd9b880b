//! Per-page and per-category extraction statistics
//!
//! Every anchor found on a page ends up either accepted or discarded, so for
//! each page `found == accepted + discarded`. Cumulative totals are a plain
//! sum over the recorded pages.

use crate::extract::DiscardReason;
use std::collections::BTreeMap;

/// Counts for one fetched listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageStats {
    /// 1-based page number within the category scrape
    pub page: u32,

    /// Listing offset the page was requested with
    pub offset: u32,

    /// Item anchors found on the page
    pub found: u64,

    /// Items that passed validation
    pub accepted: u64,

    /// Anchors that did not become items
    pub discarded: u64,

    /// Discard count per reason
    pub discard_reasons: BTreeMap<DiscardReason, u64>,
}

impl PageStats {
    pub fn new(page: u32, offset: u32) -> Self {
        Self {
            page,
            offset,
            ..Self::default()
        }
    }

    pub fn record_accepted(&mut self) {
        self.found += 1;
        self.accepted += 1;
    }

    pub fn record_discard(&mut self, reason: DiscardReason) {
        self.found += 1;
        self.discarded += 1;
        *self.discard_reasons.entry(reason).or_insert(0) += 1;
    }

    /// Moves one previously accepted item to the discarded column
    pub fn reclassify_duplicate(&mut self) {
        if self.accepted == 0 {
            return;
        }
        self.accepted -= 1;
        self.discarded += 1;
        *self
            .discard_reasons
            .entry(DiscardReason::Duplicate)
            .or_insert(0) += 1;
    }

    /// True if the page-level counts add up
    pub fn is_balanced(&self) -> bool {
        self.found == self.accepted + self.discarded
            && self.discard_reasons.values().sum::<u64>() == self.discarded
    }
}

/// Cumulative counts over all recorded pages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatTotals {
    pub pages: u32,
    pub found: u64,
    pub accepted: u64,
    pub discarded: u64,
    pub discard_reasons: BTreeMap<DiscardReason, u64>,
}

/// Statistics for one category scrape
#[derive(Debug, Clone, Default)]
pub struct RunStatistics {
    /// Display name the scrape was requested with
    pub category: String,

    /// Per-page counts in fetch order
    pub pages: Vec<PageStats>,

    totals: StatTotals,
}

impl RunStatistics {
    pub fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            ..Self::default()
        }
    }

    /// Folds a page into the totals
    ///
    /// Recording is purely additive; previously recorded counts are never
    /// revised.
    pub fn record_page(&mut self, page: PageStats) {
        self.totals.pages += 1;
        self.totals.found += page.found;
        self.totals.accepted += page.accepted;
        self.totals.discarded += page.discarded;
        for (reason, count) in &page.discard_reasons {
            *self.totals.discard_reasons.entry(*reason).or_insert(0) += count;
        }
        self.pages.push(page);
    }

    /// Current cumulative totals
    pub fn snapshot(&self) -> &StatTotals {
        &self.totals
    }

    /// True when no item was accepted across the whole scrape
    pub fn is_empty(&self) -> bool {
        self.totals.accepted == 0
    }

    /// One-line progress summary for a page and the running totals
    pub fn format_progress(&self, page: &PageStats) -> String {
        format!(
            "{} page {} (offset {}): found {}, accepted {}, discarded {} | total accepted {}, discarded {}",
            self.category,
            page.page,
            page.offset,
            page.found,
            page.accepted,
            page.discarded,
            self.totals.accepted,
            self.totals.discarded
        )
    }
}

/// Prints the end-of-run summary for each category to stdout
///
/// # Arguments
///
/// * `stats` - One entry per scraped category
pub fn print_statistics(stats: &[RunStatistics]) {
    println!("=== Scrape Statistics ===\n");

    let mut grand_accepted = 0;
    for run in stats {
        let totals = run.snapshot();
        grand_accepted += totals.accepted;

        println!("{}:", run.category);
        if run.is_empty() {
            println!("  No results ({} pages fetched)", totals.pages);
            println!();
            continue;
        }

        let rate = if totals.found > 0 {
            (totals.accepted as f64 / totals.found as f64) * 100.0
        } else {
            0.0
        };
        println!("  Pages fetched: {}", totals.pages);
        println!("  Anchors found: {}", totals.found);
        println!("  Accepted: {} ({:.1}%)", totals.accepted, rate);
        println!("  Discarded: {}", totals.discarded);

        let mut reasons: Vec<_> = totals.discard_reasons.iter().collect();
        reasons.sort_by(|a, b| b.1.cmp(a.1));
        for (reason, count) in reasons {
            println!("    {}: {}", reason, count);
        }
        println!();
    }

    println!("Total items: {}", grand_accepted);
}
