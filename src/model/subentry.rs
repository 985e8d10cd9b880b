use serde::{Deserialize, Serialize};

/// Creator recorded when a subentry line carries no "Creator - Title" separator
pub const UNKNOWN_CREATOR: &str = "Unknown";

/// One constituent unit of an item, e.g. a track within a mix's tracklist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subentry {
    position: u32,
    title: String,
    creator: String,
    start_time: Option<String>,
    original_text: String,
}

impl Subentry {
    /// Only the subentry parser builds these, after the text passed validation.
    pub(crate) fn new(
        position: u32,
        title: String,
        creator: String,
        start_time: Option<String>,
        original_text: String,
    ) -> Self {
        Self {
            position,
            title,
            creator,
            start_time,
            original_text,
        }
    }

    /// 1-based position within the parent item
    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Creator name, or [`UNKNOWN_CREATOR`] when the source line had none
    pub fn creator(&self) -> &str {
        &self.creator
    }

    /// Timestamp exactly as it appeared in the source, e.g. `1:02:33` or `0??`
    pub fn start_time(&self) -> Option<&str> {
        self.start_time.as_deref()
    }

    /// Source text, prefixed with `[timestamp] ` when a timestamp was present
    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn has_known_creator(&self) -> bool {
        self.creator != UNKNOWN_CREATOR
    }
}
