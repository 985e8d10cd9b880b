//! Configuration module for the scraper
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; missing values fall back to the defaults that
//! match the live Explorer endpoint.
//!
//! # Example
//!
//! ```no_run
//! use mixdb_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scraper.toml")).unwrap();
//! println!("Page size: {}", config.scraper.page_size);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CategoryEntry, Config, OutputConfig, ScraperConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
