use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesRef {
    pub name: String,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub url: String,
    #[serde(default)]
    pub series: Option<SeriesRef>,
}

impl CatalogEntry {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            series: None,
        }
    }

    pub fn in_series(mut self, name: impl Into<String>, order: u32) -> Self {
        self.series = Some(SeriesRef {
            name: name.into(),
            order,
        });
        self
    }
}

/// Ordered list of articles to mirror.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.url.as_str())
    }
}
