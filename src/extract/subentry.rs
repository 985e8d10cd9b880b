//! Tracklist parsing
//!
//! Tracklists on listing pages come in several loose formats. Each format is
//! a [`SubentryMatcher`]; the [`SubentryParser`] tries them in priority order
//! and keeps the output of the first one that yields at least one accepted
//! subentry. Results from different matchers are never merged.

use crate::model::{Subentry, UNKNOWN_CREATOR};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Text that is a placeholder rather than a real track or artist
const PLACEHOLDERS: &[&str] = &[
    "...", "?", "??", "???", "unknown", "n/a", "tba", "tbd", "---", "***", "id", "edit", "remix",
    "mix", "track", "untitled", "noname", "blank",
];

/// Creator-title lines are a weak signal, so only the first few are considered
const CREATOR_TITLE_LIMIT: usize = 20;

static FULL_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(\d{1,2}:\d{2}(?::\d{2})?)\]\s*([^\[\n]+)")
        .expect("hardcoded regex pattern is valid")
});

static SIMPLE_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([0-9?]+)\]\s*([^\[\n]+)").expect("hardcoded regex pattern is valid")
});

static NUMBERED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(\d{1,3})[.)][ \t]+(\S[^\n]*)$").expect("hardcoded regex pattern is valid")
});

static CREATOR_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*([A-Za-z0-9][^\n]*?)[ \t]+-[ \t]+([^\n]+)$")
        .expect("hardcoded regex pattern is valid")
});

static LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\[[^\]]+\]").expect("hardcoded regex pattern is valid")
});

/// A piece of text that may describe one subentry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'t> {
    pub text: Cow<'t, str>,
    pub timestamp: Option<&'t str>,
}

/// One tracklist format
pub trait SubentryMatcher: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// All candidates for this format, in source order
    fn candidates<'t>(&self, text: &'t str) -> Vec<Candidate<'t>>;
}

/// `[1:02:33] Artist - Title` or `[02:33] Artist - Title`
pub struct FullTimestamp;

/// `[000] Artist - Title` or `[0??] Artist - Title`
pub struct SimpleTimestamp;

/// `1. Artist - Title` or `1) Artist - Title`, one per line
pub struct Numbered;

/// Bare `Artist - Title` lines
pub struct CreatorTitle;

fn timestamped<'t>(pattern: &Regex, text: &'t str) -> Vec<Candidate<'t>> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| {
            let timestamp = caps.get(1)?.as_str();
            let body = caps.get(2)?.as_str();
            Some(Candidate {
                text: Cow::Borrowed(body.trim()),
                timestamp: Some(timestamp),
            })
        })
        .collect()
}

impl SubentryMatcher for FullTimestamp {
    fn name(&self) -> &'static str {
        "full-timestamp"
    }

    fn candidates<'t>(&self, text: &'t str) -> Vec<Candidate<'t>> {
        timestamped(&FULL_TIMESTAMP, text)
    }
}

impl SubentryMatcher for SimpleTimestamp {
    fn name(&self) -> &'static str {
        "simple-timestamp"
    }

    fn candidates<'t>(&self, text: &'t str) -> Vec<Candidate<'t>> {
        timestamped(&SIMPLE_TIMESTAMP, text)
    }
}

impl SubentryMatcher for Numbered {
    fn name(&self) -> &'static str {
        "numbered"
    }

    fn candidates<'t>(&self, text: &'t str) -> Vec<Candidate<'t>> {
        NUMBERED
            .captures_iter(text)
            .filter_map(|caps| caps.get(2))
            .map(|body| Candidate {
                text: Cow::Borrowed(body.as_str().trim()),
                timestamp: None,
            })
            .collect()
    }
}

impl SubentryMatcher for CreatorTitle {
    fn name(&self) -> &'static str {
        "creator-title"
    }

    fn candidates<'t>(&self, text: &'t str) -> Vec<Candidate<'t>> {
        CREATOR_TITLE
            .captures_iter(text)
            .take(CREATOR_TITLE_LIMIT)
            .filter_map(|caps| {
                let creator = caps.get(1)?.as_str().trim();
                let title = caps.get(2)?.as_str().trim();
                Some(Candidate {
                    text: Cow::Owned(format!("{} - {}", creator, title)),
                    timestamp: None,
                })
            })
            .collect()
    }
}

/// Ordered set of tracklist formats
pub struct SubentryParser {
    matchers: Vec<Box<dyn SubentryMatcher>>,
}

impl SubentryParser {
    /// Creates a parser trying `matchers` in the given order
    pub fn new(matchers: Vec<Box<dyn SubentryMatcher>>) -> Self {
        Self { matchers }
    }

    /// Parses the subentries found in an item's text
    ///
    /// # Arguments
    ///
    /// * `text` - Text associated with one item
    ///
    /// # Returns
    ///
    /// The accepted subentries of the highest-priority format that produced
    /// any, positioned 1..=n. Empty when no format matched.
    pub fn parse(&self, text: &str) -> Vec<Subentry> {
        for matcher in &self.matchers {
            let mut accepted = Vec::new();
            for candidate in matcher.candidates(text) {
                let position = accepted.len() as u32 + 1;
                if let Some(subentry) =
                    parse_subentry_text(&candidate.text, position, candidate.timestamp)
                {
                    accepted.push(subentry);
                }
            }

            if !accepted.is_empty() {
                tracing::trace!(
                    matcher = matcher.name(),
                    count = accepted.len(),
                    "Parsed subentries"
                );
                return accepted;
            }
        }
        Vec::new()
    }
}

impl Default for SubentryParser {
    fn default() -> Self {
        Self::new(vec![
            Box::new(FullTimestamp),
            Box::new(SimpleTimestamp),
            Box::new(Numbered),
            Box::new(CreatorTitle),
        ])
    }
}

/// Parses subentries with the default formats
pub fn parse_subentries(text: &str) -> Vec<Subentry> {
    SubentryParser::default().parse(text)
}

/// Validates one candidate line and turns it into a subentry
///
/// Text containing ` - ` is split into creator and title (bracketed label
/// segments are dropped from the title) and both halves must look real.
/// Other text is kept only when it reads as a plausible standalone title, in
/// which case the creator is [`UNKNOWN_CREATOR`].
pub fn parse_subentry_text(text: &str, position: u32, timestamp: Option<&str>) -> Option<Subentry> {
    let text = text.trim();

    if is_placeholder(text) || text.chars().count() < 3 || is_filler(text) {
        return None;
    }

    let (creator, title) = match text.split_once(" - ") {
        Some((creator, title)) => {
            let creator = creator.trim();
            let title = LABEL.replace_all(title, "");
            let title = title.trim();
            if !is_valid_component(creator) || !is_valid_component(title) {
                return None;
            }
            (creator.to_string(), title.to_string())
        }
        None => {
            if !is_valid_standalone_title(text) {
                return None;
            }
            (UNKNOWN_CREATOR.to_string(), text.to_string())
        }
    };

    let original_text = match timestamp {
        Some(ts) => format!("[{}] {}", ts, text),
        None => text.to_string(),
    };

    Some(Subentry::new(
        position,
        title,
        creator,
        timestamp.map(str::to_string),
        original_text,
    ))
}

fn is_placeholder(text: &str) -> bool {
    let lower = text.to_lowercase();
    PLACEHOLDERS.contains(&lower.as_str())
}

/// No letters at all, or one character repeated
fn is_filler(text: &str) -> bool {
    if !text.chars().any(char::is_alphabetic) {
        return true;
    }
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => chars.all(|c| c == first),
        None => true,
    }
}

fn is_valid_component(component: &str) -> bool {
    let component = component.trim();
    component.chars().count() >= 2 && !is_placeholder(component) && !is_filler(component)
}

fn is_valid_standalone_title(title: &str) -> bool {
    let length = title.chars().count();
    if length < 5 || !is_valid_component(title) {
        return false;
    }
    title.split_whitespace().count() > 1 || length >= 8
}
