//! Record model for harvested catalog entries
//!
//! Items and subentries are plain value objects. Construction of a
//! [`Subentry`] goes through the subentry parser, and construction of an
//! [`Item`] goes through the extractor's validation stage, so neither type is
//! ever observed half-populated.

mod item;
mod subentry;

pub use item::{derive_item_id, Item};
pub use subentry::{Subentry, UNKNOWN_CREATOR};
