//! Association of page text with item anchors
//!
//! Listing pages have no structural per-item boundary, so the text belonging
//! to an item is found by a [`TextLocator`] strategy. The default strategy
//! takes a bounded window of flattened text after the anchor.

use crate::extract::document::ListingPage;
use std::ops::Range;

/// Text associated with one item anchor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextWindow<'p> {
    /// The associated text
    pub text: &'p str,

    /// Byte range of `text` inside [`ListingPage::text`]
    pub range: Range<usize>,
}

/// Strategy for locating the text that belongs to an item anchor
pub trait TextLocator: Send + Sync {
    /// Returns the text associated with `page.anchors()[index]`
    fn locate<'p>(&self, page: &'p ListingPage, index: usize) -> TextWindow<'p>;
}

/// Fixed-size window of flattened text following the anchor
///
/// The window never extends past the start of the next anchor to a different
/// item, so one item's tracklist does not bleed into its predecessor. Further
/// anchors to the same item (thumbnails, repeated titles) stay inside it.
#[derive(Debug, Clone, Copy)]
pub struct TextWindowLocator {
    window_chars: usize,
}

impl TextWindowLocator {
    pub const DEFAULT_WINDOW_CHARS: usize = 2000;

    pub fn new(window_chars: usize) -> Self {
        Self { window_chars }
    }
}

impl Default for TextWindowLocator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW_CHARS)
    }
}

impl TextLocator for TextWindowLocator {
    fn locate<'p>(&self, page: &'p ListingPage, index: usize) -> TextWindow<'p> {
        let text = page.text();
        let anchors = page.anchors();

        let Some(anchor) = anchors.get(index) else {
            return TextWindow {
                text: "",
                range: text.len()..text.len(),
            };
        };

        let start = anchor.span.end;
        let next_anchor = anchors[index + 1..]
            .iter()
            .find(|next| next.href != anchor.href)
            .map(|next| next.span.start)
            .unwrap_or(text.len());
        let window_end = text[start..]
            .char_indices()
            .nth(self.window_chars)
            .map(|(i, _)| start + i)
            .unwrap_or(text.len());
        let end = window_end.min(next_anchor).max(start);

        TextWindow {
            text: &text[start..end],
            range: start..end,
        }
    }
}
