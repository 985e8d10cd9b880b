use crate::catalog::Category;
use crate::extract::document::ListingPage;
use crate::extract::fields::{self, LinkKind};
use crate::extract::locate::{TextLocator, TextWindowLocator};
use crate::extract::subentry::SubentryParser;
use crate::model::{derive_item_id, Item, Subentry};
use crate::output::PageStats;
use serde::Serialize;
use std::fmt;
use url::Url;

/// Why an anchor did not become an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardReason {
    EmptyTitle,
    EmptyHref,
    InvalidUrl,
    MissingIdentifier,
    NoSubentries,
    /// Same id already accepted earlier in the category scrape
    Duplicate,
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiscardReason::EmptyTitle => "empty title",
            DiscardReason::EmptyHref => "empty href",
            DiscardReason::InvalidUrl => "invalid url",
            DiscardReason::MissingIdentifier => "missing identifier",
            DiscardReason::NoSubentries => "no subentries",
            DiscardReason::Duplicate => "duplicate",
        };
        write!(f, "{}", s)
    }
}

/// Everything gathered for one anchor before validation
#[derive(Debug, Clone, Default)]
pub struct RawItem {
    pub title: String,
    pub href: String,
    pub url: Option<String>,
    pub duration: Option<String>,
    pub file_size: Option<String>,
    pub bitrate: Option<String>,
    pub platforms: Vec<String>,
    pub stream_links: Vec<String>,
    pub download_links: Vec<String>,
    pub subentries: Vec<Subentry>,
}

impl RawItem {
    /// Converts the bag into an [`Item`] labelled with `category`
    pub fn validate(self, category: &Category, require_subentries: bool) -> Result<Item, DiscardReason> {
        if self.title.trim().is_empty() {
            return Err(DiscardReason::EmptyTitle);
        }
        if self.href.trim().is_empty() {
            return Err(DiscardReason::EmptyHref);
        }
        let url = self
            .url
            .as_deref()
            .and_then(|u| Url::parse(u).ok())
            .ok_or(DiscardReason::InvalidUrl)?;
        if derive_item_id(&url).is_none() {
            return Err(DiscardReason::MissingIdentifier);
        }
        if require_subentries && self.subentries.is_empty() {
            return Err(DiscardReason::NoSubentries);
        }

        let subentry_count = self.subentries.len();
        let mut item = Item::new(&self.title, url.as_str())
            .ok_or(DiscardReason::MissingIdentifier)?
            .with_creator(fields::extract_creator(&self.title))
            .with_date(fields::extract_date(url.as_str(), &self.title))
            .with_duration(self.duration)
            .with_subentries(self.subentries);

        item.add_category(&category.name);
        for link in &self.stream_links {
            item.add_stream_link(link);
        }
        for link in &self.download_links {
            item.add_download_link(link);
        }

        if !self.platforms.is_empty() {
            item.set_metadata("platforms", self.platforms);
        }
        if let Some(size) = self.file_size {
            item.set_metadata("file_size", size);
        }
        if let Some(bitrate) = self.bitrate {
            item.set_metadata("bitrate", bitrate);
        }
        item.set_metadata("subentry_count", subentry_count);

        Ok(item)
    }
}

/// Items and counts extracted from one listing page
#[derive(Debug, Clone, Default)]
pub struct PageExtraction {
    pub items: Vec<Item>,
    pub stats: PageStats,
}

/// Turns listing pages into validated items
pub struct ItemExtractor {
    locator: Box<dyn TextLocator>,
    subentries: SubentryParser,
}

impl ItemExtractor {
    pub fn new(locator: Box<dyn TextLocator>, subentries: SubentryParser) -> Self {
        Self {
            locator,
            subentries,
        }
    }

    /// Default formats with a text window of `window_chars` characters
    pub fn with_window(window_chars: usize) -> Self {
        Self::new(
            Box::new(TextWindowLocator::new(window_chars)),
            SubentryParser::default(),
        )
    }

    /// Extracts every item on a listing page
    ///
    /// Failures are per anchor: an anchor that cannot become an item is
    /// counted as discarded with its reason and never aborts the page.
    ///
    /// # Arguments
    ///
    /// * `page` - The parsed listing page
    /// * `category` - Category label attached to every item
    /// * `require_subentries` - Discard items whose text has no tracklist
    pub fn extract_items(
        &self,
        page: &ListingPage,
        category: &Category,
        require_subentries: bool,
    ) -> PageExtraction {
        let mut extraction = PageExtraction::default();

        for index in 0..page.anchors().len() {
            let raw = self.gather(page, index);
            let href = raw.href.clone();

            match raw.validate(category, require_subentries) {
                Ok(item) => {
                    extraction.stats.record_accepted();
                    extraction.items.push(item);
                }
                Err(reason) => {
                    tracing::debug!(href = %href, reason = %reason, "Discarded anchor");
                    extraction.stats.record_discard(reason);
                }
            }
        }

        extraction
    }

    fn gather(&self, page: &ListingPage, index: usize) -> RawItem {
        let anchor = &page.anchors()[index];
        let window = self.locator.locate(page, index);

        let mut raw = RawItem {
            title: anchor.title.clone(),
            href: anchor.href.clone(),
            url: anchor.url.clone(),
            duration: fields::extract_duration(window.text),
            file_size: fields::extract_file_size(window.text),
            bitrate: fields::extract_bitrate(window.text),
            platforms: fields::extract_platforms(window.text),
            subentries: self.subentries.parse(window.text),
            ..RawItem::default()
        };

        for link in page.links_in(window.range.clone()) {
            match fields::classify_link(&link.href) {
                LinkKind::Stream(platform) => {
                    raw.stream_links.push(link.href.clone());
                    if !raw.platforms.iter().any(|p| p == platform) {
                        raw.platforms.push(platform.to_string());
                    }
                }
                LinkKind::Download => raw.download_links.push(link.href.clone()),
                LinkKind::Other => {}
            }
        }

        raw
    }
}

impl Default for ItemExtractor {
    fn default() -> Self {
        Self::with_window(TextWindowLocator::DEFAULT_WINDOW_CHARS)
    }
}
