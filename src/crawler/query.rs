//! Explorer listing query builder
//!
//! The Explorer endpoint is picky about its query string, so every request
//! carries the full parameter list in a fixed order, with unused parameters
//! present but empty.

use crate::catalog::{Category, TimeFilter};
use crate::Result;
use url::form_urlencoded;
use url::Url;

/// Path of the Explorer listing relative to the site root
pub const EXPLORER_PATH: &str = "/w/MixesDB:Explorer/Mixes";

/// Query for one page of the Explorer listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerQuery {
    filter: CategoryFilter,
    year: Option<String>,
    count: u32,
    offset: u32,
}

/// Either a style code or a free-text category name, never both
#[derive(Debug, Clone, PartialEq, Eq)]
enum CategoryFilter {
    Style(String),
    FreeText(String),
}

impl ExplorerQuery {
    /// Query for the first page of a category
    ///
    /// Categories with a filter code use `style`; the rest fall back to the
    /// free-text `cat1` parameter.
    pub fn for_category(category: &Category, page_size: u32) -> Self {
        let filter = match &category.code {
            Some(code) => CategoryFilter::Style(code.clone()),
            None => CategoryFilter::FreeText(category.name.clone()),
        };
        Self {
            filter,
            year: None,
            count: page_size,
            offset: 0,
        }
    }

    pub fn with_time_filter(mut self, time_filter: &TimeFilter) -> Self {
        self.year = time_filter.year_param().map(str::to_string);
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// All parameters in request order
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let (cat1, style) = match &self.filter {
            CategoryFilter::Style(code) => (String::new(), code.clone()),
            CategoryFilter::FreeText(name) => (name.clone(), String::new()),
        };

        vec![
            ("do", "mx".to_string()),
            ("mode", String::new()),
            ("cat1", cat1),
            ("cat2", String::new()),
            ("jnC", String::new()),
            ("style", style),
            ("year", self.year.clone().unwrap_or_default()),
            ("tlC", "1".to_string()),
            ("tlI", "1".to_string()),
            ("so", String::new()),
            ("tmatch1", String::new()),
            ("tmatch2", String::new()),
            ("jnTm", String::new()),
            ("usesFile", String::new()),
            ("minHotnessLevel", String::new()),
            ("count", self.count.to_string()),
            ("order", "hotness".to_string()),
            ("sort", "desc".to_string()),
            ("offset", self.offset.to_string()),
        ]
    }

    /// Form-urlencoded query string
    pub fn query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.params() {
            serializer.append_pair(key, &value);
        }
        serializer.finish()
    }

    /// Full request URL against a site root such as `https://www.mixesdb.com`
    pub fn url(&self, base_url: &str) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", base_url.trim_end_matches('/'), EXPLORER_PATH))?;
        url.set_query(Some(&self.query_string()));
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coded() -> Category {
        Category {
            name: "Techno".to_string(),
            code: Some("TA".to_string()),
            expected_count: None,
            aliases: Vec::new(),
        }
    }

    #[test]
    fn test_parameter_order() {
        let query = ExplorerQuery::for_category(&coded(), 25).with_offset(50);
        assert_eq!(
            query.query_string(),
            "do=mx&mode=&cat1=&cat2=&jnC=&style=TA&year=&tlC=1&tlI=1&so=&tmatch1=&tmatch2=\
             &jnTm=&usesFile=&minHotnessLevel=&count=25&order=hotness&sort=desc&offset=50"
        );
    }

    #[test]
    fn test_uncoded_category_uses_cat1() {
        let query = ExplorerQuery::for_category(&Category::uncoded("Dubstep / Breakbeat"), 25);
        let params = query.params();
        let get = |key: &str| params.iter().find(|(k, _)| *k == key).map(|(_, v)| v.clone());
        assert_eq!(get("cat1").as_deref(), Some("Dubstep / Breakbeat"));
        assert_eq!(get("style").as_deref(), Some(""));
        assert!(query.query_string().contains("cat1=Dubstep+%2F+Breakbeat"));
    }

    #[test]
    fn test_style_and_cat1_are_exclusive() {
        let params = ExplorerQuery::for_category(&coded(), 25).params();
        let cat1 = params.iter().find(|(k, _)| *k == "cat1").unwrap();
        assert!(cat1.1.is_empty());
    }

    #[test]
    fn test_year_filter() {
        let period: TimeFilter = "2010s".parse().unwrap();
        let query = ExplorerQuery::for_category(&coded(), 25).with_time_filter(&period);
        assert!(query.query_string().contains("&year=2010s&"));

        let fresh = ExplorerQuery::for_category(&coded(), 25).with_time_filter(&TimeFilter::Fresh);
        assert!(fresh.query_string().contains("&year=&"));
    }

    #[test]
    fn test_url() {
        let url = ExplorerQuery::for_category(&coded(), 25)
            .url("https://www.mixesdb.com/")
            .unwrap();
        assert_eq!(url.path(), EXPLORER_PATH);
        assert_eq!(url.host_str(), Some("www.mixesdb.com"));
        assert!(url.query().unwrap().starts_with("do=mx&"));
    }
}
