//! Category resolution for listing queries
//!
//! This module maps human category names (genres) to the Explorer's internal
//! style codes, and models the optional time-range filter.

mod table;
mod time_filter;

pub use table::{Category, CategoryTable};
pub use time_filter::TimeFilter;
