use crate::model::Subentry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

/// A catalog entry extracted from a listing page (e.g. a DJ mix)
///
/// Items are value objects: they carry no reference to the page they came
/// from. The identifier is derived from the URL, so the same mix seen twice
/// always yields the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    id: String,
    title: String,
    url: String,
    creator: Option<String>,
    date: Option<String>,
    duration: Option<String>,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    subentries: Vec<Subentry>,
    #[serde(default)]
    download_links: Vec<String>,
    #[serde(default)]
    stream_links: Vec<String>,
    #[serde(default)]
    metadata: BTreeMap<String, Value>,
}

impl Item {
    /// Creates an item from its title and absolute URL
    ///
    /// Returns `None` when the title is blank, the URL is not absolute, or no
    /// identifier can be derived from the URL path.
    pub fn new(title: &str, url: &str) -> Option<Self> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        let parsed = Url::parse(url).ok()?;
        let id = derive_item_id(&parsed)?;

        Some(Self {
            id,
            title: title.to_string(),
            url: parsed.to_string(),
            creator: None,
            date: None,
            duration: None,
            categories: Vec::new(),
            subentries: Vec::new(),
            download_links: Vec::new(),
            stream_links: Vec::new(),
            metadata: BTreeMap::new(),
        })
    }

    pub fn with_creator(mut self, creator: Option<String>) -> Self {
        self.creator = creator.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn with_date(mut self, date: Option<String>) -> Self {
        self.date = date.filter(|d| !d.is_empty());
        self
    }

    pub fn with_duration(mut self, duration: Option<String>) -> Self {
        self.duration = duration;
        self
    }

    /// Replaces the subentries; positions must already be sequential from 1
    pub fn with_subentries(mut self, subentries: Vec<Subentry>) -> Self {
        debug_assert!(subentries
            .iter()
            .enumerate()
            .all(|(i, s)| s.position() as usize == i + 1));
        self.subentries = subentries;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn creator(&self) -> Option<&str> {
        self.creator.as_deref()
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn duration(&self) -> Option<&str> {
        self.duration.as_deref()
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn subentries(&self) -> &[Subentry] {
        &self.subentries
    }

    pub fn download_links(&self) -> &[String] {
        &self.download_links
    }

    pub fn stream_links(&self) -> &[String] {
        &self.stream_links
    }

    pub fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    /// Adds a category label unless it is blank or already present
    pub fn add_category(&mut self, category: &str) {
        push_unique(&mut self.categories, category);
    }

    pub fn add_download_link(&mut self, link: &str) {
        push_unique(&mut self.download_links, link);
    }

    pub fn add_stream_link(&mut self, link: &str) {
        push_unique(&mut self.stream_links, link);
    }

    pub fn set_metadata(&mut self, key: &str, value: impl Into<Value>) {
        self.metadata.insert(key.to_string(), value.into());
    }

    pub fn get_metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Required fields are present and the URL is absolute
    pub fn is_valid(&self) -> bool {
        !self.id.is_empty()
            && !self.title.trim().is_empty()
            && Url::parse(&self.url).is_ok()
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    let value = value.trim();
    if !value.is_empty() && !list.iter().any(|existing| existing == value) {
        list.push(value.to_string());
    }
}

/// Derives the stable item identifier from a detail-page URL
///
/// The identifier is the path segment following `/w/` (or the last path
/// segment when there is no `/w/` prefix) with any `.html` suffix removed.
pub fn derive_item_id(url: &Url) -> Option<String> {
    let path = url.path();
    let segment = match path.find("/w/") {
        Some(idx) => path[idx + 3..].split('/').next().unwrap_or(""),
        None => path.rsplit('/').find(|s| !s.is_empty()).unwrap_or(""),
    };

    let id = segment.strip_suffix(".html").unwrap_or(segment);
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}
