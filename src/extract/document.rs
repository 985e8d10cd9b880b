//! Listing page model
//!
//! A [`ListingPage`] is built once per fetched page. It flattens the HTML into
//! newline-separated text, records where each item anchor sits inside that
//! text, and keeps the remaining links for pagination and link harvesting.
//! The parsed `scraper::Html` is dropped before the page is returned, so the
//! page can be held across `.await` points.

use regex::Regex;
use scraper::{ElementRef, Html, Node};
use std::ops::Range;
use std::sync::LazyLock;
use url::Url;

/// Item links look like `/w/2024-03-01_-_Artist_@_Venue`
static ANCHOR_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|/)w/\d{4}-\d{2}-\d{2}_-_").expect("hardcoded regex pattern is valid")
});

static OFFSET_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[?&;]offset=(\d+)").expect("hardcoded regex pattern is valid")
});

static NEXT_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(next|»|more)").expect("hardcoded regex pattern is valid")
});

/// Elements whose text never belongs to an item
const SKIPPED_ELEMENTS: &[&str] = &["head", "script", "style", "noscript", "template"];

/// Elements that start a new line in the flattened text
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "footer", "form", "h1",
    "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav", "ol", "p", "pre",
    "section", "table", "tbody", "td", "th", "thead", "tr", "ul",
];

/// An item link found on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemAnchor {
    /// Anchor text with whitespace collapsed
    pub title: String,

    /// Raw `href` attribute
    pub href: String,

    /// `href` resolved against the page URL, if it resolves
    pub url: Option<String>,

    /// Byte range of the anchor text inside [`ListingPage::text`]
    pub span: Range<usize>,
}

/// Any other link on the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    /// `href` resolved against the page URL, or the raw value if it does not resolve
    pub href: String,

    /// Link text with whitespace collapsed
    pub label: String,

    /// Byte offset of the link inside [`ListingPage::text`]
    pub offset: usize,
}

/// A parsed listing page
#[derive(Debug, Clone)]
pub struct ListingPage {
    text: String,
    anchors: Vec<ItemAnchor>,
    links: Vec<PageLink>,
}

impl ListingPage {
    /// Parses a listing page
    ///
    /// # Arguments
    ///
    /// * `html` - The page body
    /// * `base_url` - URL the page was fetched from, used to resolve links
    pub fn parse(html: &str, base_url: &Url) -> Self {
        let document = Html::parse_document(html);

        let mut flattener = Flattener {
            base_url,
            text: String::with_capacity(html.len() / 2),
            anchors: Vec::new(),
            links: Vec::new(),
        };
        flattener.walk(document.root_element());

        Self {
            text: flattener.text,
            anchors: flattener.anchors,
            links: flattener.links,
        }
    }

    /// The document flattened to text, one block element per line
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Item anchors in document order
    pub fn anchors(&self) -> &[ItemAnchor] {
        &self.anchors
    }

    /// Non-item links in document order
    pub fn links(&self) -> &[PageLink] {
        &self.links
    }

    /// Links whose text starts inside the given byte range of [`Self::text`]
    pub fn links_in(&self, range: Range<usize>) -> impl Iterator<Item = &PageLink> {
        self.links
            .iter()
            .filter(move |link| range.contains(&link.offset))
    }

    /// Checks for an explicit pagination control pointing past `current_offset`
    ///
    /// A control is either any link carrying an `offset=` greater than the
    /// current one, or a "next"/"»"/"more" link carrying an `offset=`.
    pub fn has_next_control(&self, current_offset: u32) -> bool {
        self.links.iter().any(|link| {
            let Some(offset) = link_offset(&link.href) else {
                return false;
            };
            offset > current_offset || NEXT_LABEL.is_match(&link.label)
        })
    }
}

/// Returns true if an href has the shape of an item detail link
pub fn is_item_href(href: &str) -> bool {
    ANCHOR_SHAPE.is_match(href)
}

fn link_offset(href: &str) -> Option<u32> {
    OFFSET_PARAM
        .captures(href)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

struct Flattener<'a> {
    base_url: &'a Url,
    text: String,
    anchors: Vec<ItemAnchor>,
    links: Vec<PageLink>,
}

impl Flattener<'_> {
    fn walk(&mut self, element: ElementRef<'_>) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => self.push_text(text),
                Node::Element(el) => {
                    let name = el.name();
                    if SKIPPED_ELEMENTS.contains(&name) {
                        continue;
                    }
                    let Some(child_element) = ElementRef::wrap(child) else {
                        continue;
                    };

                    let block = BLOCK_ELEMENTS.contains(&name);
                    if block || name == "br" {
                        self.newline();
                    }

                    match el.attr("href").filter(|_| name == "a") {
                        Some(href) => self.walk_link(child_element, href),
                        None => self.walk(child_element),
                    }

                    if block {
                        self.newline();
                    }
                }
                _ => {}
            }
        }
    }

    fn walk_link(&mut self, link: ElementRef<'_>, href: &str) {
        let start = self.text.len();
        self.walk(link);
        let end = self.text.len();
        let label = collapse_whitespace(&self.text[start..end]);
        let href = href.trim();
        let resolved = self.base_url.join(href).ok().map(|u| u.to_string());

        if is_item_href(href) {
            self.anchors.push(ItemAnchor {
                title: label,
                href: href.to_string(),
                url: resolved,
                span: start..end,
            });
        } else if !href.is_empty() {
            self.links.push(PageLink {
                href: resolved.unwrap_or_else(|| href.to_string()),
                label,
                offset: start,
            });
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.trim().is_empty() {
            // Indentation between tags: keep line structure, drop the padding
            if text.contains('\n') {
                self.newline();
            } else if !text.is_empty() && !self.text.ends_with([' ', '\n']) {
                self.text.push(' ');
            }
            return;
        }
        self.text.push_str(text);
    }

    fn newline(&mut self) {
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push('\n');
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
