//! Listing page extraction
//!
//! This module turns a fetched listing page into validated items:
//! - Flattening the HTML and locating item anchors ([`ListingPage`])
//! - Associating text with each anchor ([`TextLocator`])
//! - Pulling opportunistic fields out of that text
//! - Parsing tracklists into subentries ([`SubentryParser`])

mod document;
mod extractor;
pub mod fields;
mod locate;
mod subentry;

pub use document::{is_item_href, ItemAnchor, ListingPage, PageLink};
pub use extractor::{DiscardReason, ItemExtractor, PageExtraction, RawItem};
pub use locate::{TextLocator, TextWindow, TextWindowLocator};
pub use subentry::{
    parse_subentries, parse_subentry_text, Candidate, CreatorTitle, FullTimestamp, Numbered,
    SimpleTimestamp, SubentryMatcher, SubentryParser,
};
