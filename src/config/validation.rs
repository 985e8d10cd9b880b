use crate::config::types::{CategoryEntry, Config, ScraperConfig, UserAgentConfig};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_categories(&config.categories)?;
    Ok(())
}

/// Validates listing traversal configuration
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            config.base_url
        )));
    }

    if config.page_size < 1 || config.page_size > 100 {
        return Err(ConfigError::Validation(format!(
            "page-size must be between 1 and 100, got {}",
            config.page_size
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.window_chars < 100 {
        return Err(ConfigError::Validation(format!(
            "window-chars must be >= 100, got {}",
            config.window_chars
        )));
    }

    if config.max_concurrent_categories < 1 || config.max_concurrent_categories > 16 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-categories must be between 1 and 16, got {}",
            config.max_concurrent_categories
        )));
    }

    Ok(())
}

fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.value.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent value cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_output_config(config: &crate::config::types::OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates the category alias table
///
/// Every name and alias must be non-empty and may appear only once across
/// the whole table, otherwise resolution would depend on declaration order.
fn validate_categories(categories: &[CategoryEntry]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for entry in categories {
        if entry.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category name cannot be empty".to_string(),
            ));
        }

        if let Some(code) = &entry.code {
            if code.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "category '{}' has an empty code",
                    entry.name
                )));
            }
        }

        for name in std::iter::once(&entry.name).chain(entry.aliases.iter()) {
            if name.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "category '{}' has an empty alias",
                    entry.name
                )));
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "category name or alias '{}' is declared more than once",
                    name
                )));
            }
        }
    }

    Ok(())
}
