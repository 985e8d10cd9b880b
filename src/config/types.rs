use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Category alias table; the built-in table is used when empty
    #[serde(rename = "category", default)]
    pub categories: Vec<CategoryEntry>,
}

/// Listing traversal configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Site root the Explorer path is appended to
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Items per listing page (the endpoint serves 25)
    #[serde(rename = "page-size")]
    pub page_size: u32,

    /// Delay between consecutive page requests (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Hard cap on pages fetched per category, independent of any item limit
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Characters of flattened text scanned after each item anchor
    #[serde(rename = "window-chars")]
    pub window_chars: usize,

    /// Maximum number of categories scraped at the same time
    #[serde(rename = "max-concurrent-categories")]
    pub max_concurrent_categories: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.mixesdb.com".to_string(),
            page_size: 25,
            request_delay_ms: 1000,
            max_pages: 50,
            timeout_secs: 30,
            window_chars: 2000,
            max_concurrent_categories: 2,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Full User-Agent header value
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                    (KHTML, like Gecko) Chrome/124.0 Safari/537.36"
                .to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory JSON reports are written to when no explicit path is given
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "output/data".to_string(),
        }
    }
}

/// One category in the alias table
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryEntry {
    /// Canonical display name
    pub name: String,

    /// Explorer style code
    #[serde(default)]
    pub code: Option<String>,

    /// Other display names mapping to the same code
    #[serde(default)]
    pub aliases: Vec<String>,

    /// Estimated number of available items
    #[serde(rename = "expected-count", default)]
    pub expected_count: Option<u64>,
}
