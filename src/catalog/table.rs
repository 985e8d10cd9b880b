use crate::config::{CategoryEntry, Config};
use std::collections::HashMap;

/// A named filter dimension used to scope listing queries (e.g. a genre)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Canonical display name
    pub name: String,

    /// Explorer style code; `None` means the free-text `cat1` fallback is used
    pub code: Option<String>,

    /// External estimate of available items, used for display and clamping only
    pub expected_count: Option<u64>,

    /// Alternative display names resolving to the same code
    pub aliases: Vec<String>,
}

impl Category {
    /// Creates a category with no filter code (free-text fallback)
    pub fn uncoded(name: &str) -> Self {
        Self {
            name: name.to_string(),
            code: None,
            expected_count: None,
            aliases: Vec::new(),
        }
    }

    /// Clamps a requested item target to the expected count, when one is known
    pub fn clamp_target(&self, target: usize) -> usize {
        match self.expected_count {
            Some(expected) if expected > 0 => target.min(expected as usize),
            _ => target,
        }
    }
}

impl From<&CategoryEntry> for Category {
    fn from(entry: &CategoryEntry) -> Self {
        Self {
            name: entry.name.clone(),
            code: entry.code.clone(),
            expected_count: entry.expected_count,
            aliases: entry.aliases.clone(),
        }
    }
}

/// Static, case-sensitive alias table from display names to categories
#[derive(Debug, Clone)]
pub struct CategoryTable {
    categories: Vec<Category>,
    index: HashMap<String, usize>,
}

/// (code, canonical name, aliases, expected count)
const BUILTIN: &[(&str, &str, &[&str], u64)] = &[
    ("HH", "Hip Hop", &["Hip Hop / R&B"], 2934),
    ("DH", "Deep House", &[], 16089),
    ("TA", "Techno", &["Techno / Acid"], 42933),
    ("PT", "Progressive / Trance", &["Progressive", "Trance"], 37651),
    ("PH", "Progressive House", &[], 35541),
    ("MH", "Minimal House", &[], 3138),
    ("TH", "Tech House", &["Tech House / Electro", "Electro"], 44431),
    ("PM", "Pure Minimal", &["Minimal"], 617),
    ("DB", "Drum & Bass", &["Drum & Bass / Jungle", "Jungle"], 2890),
    ("CA", "Chill Out / Ambient", &["Chill Out", "Ambient"], 5971),
    ("H", "House", &[], 0),
];

impl CategoryTable {
    /// Builds a table from explicit categories
    ///
    /// Later entries never shadow earlier ones: the first category claiming a
    /// name or alias keeps it.
    pub fn new(categories: Vec<Category>) -> Self {
        let mut index = HashMap::new();
        for (i, category) in categories.iter().enumerate() {
            index.entry(category.name.clone()).or_insert(i);
            for alias in &category.aliases {
                index.entry(alias.clone()).or_insert(i);
            }
        }
        Self { categories, index }
    }

    /// The built-in Explorer style-code table
    pub fn builtin() -> Self {
        let categories = BUILTIN
            .iter()
            .map(|(code, name, aliases, expected)| Category {
                name: name.to_string(),
                code: Some(code.to_string()),
                expected_count: (*expected > 0).then_some(*expected),
                aliases: aliases.iter().map(|a| a.to_string()).collect(),
            })
            .collect();
        Self::new(categories)
    }

    /// Uses the configured categories, or the built-in table when none are configured
    pub fn from_config(config: &Config) -> Self {
        if config.categories.is_empty() {
            Self::builtin()
        } else {
            Self::new(config.categories.iter().map(Category::from).collect())
        }
    }

    /// Resolves a display name to its internal filter code
    ///
    /// # Examples
    ///
    /// ```
    /// use mixdb_scraper::CategoryTable;
    ///
    /// let table = CategoryTable::builtin();
    /// assert_eq!(table.resolve_filter_code("Electro"), Some("TH"));
    /// assert_eq!(table.resolve_filter_code("Unknown Genre"), None);
    /// ```
    pub fn resolve_filter_code(&self, name: &str) -> Option<&str> {
        self.lookup(name).and_then(|c| c.code.as_deref())
    }

    /// Finds the category a display name belongs to
    pub fn lookup(&self, name: &str) -> Option<&Category> {
        self.index.get(name).map(|&i| &self.categories[i])
    }

    /// Returns the category for a name, falling back to an uncoded category
    ///
    /// The requested display name is kept so that items are labelled with
    /// what the caller asked for.
    pub fn category(&self, name: &str) -> Category {
        match self.lookup(name) {
            Some(found) => Category {
                name: name.to_string(),
                ..found.clone()
            },
            None => Category::uncoded(name),
        }
    }

    /// All categories, one per table entry
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::builtin()
    }
}
