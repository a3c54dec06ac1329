use serde::{Deserialize, Serialize};

/// Header of a showdown list as captured by the collector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ShowdownSummary {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub showdown_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Long-form description, used as the collection summary when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
}

/// A single ranked film inside a showdown list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ShowdownEntry {
    pub rank: u32,
    pub film_name: String,
    #[serde(default)]
    pub film_slug: String,
    pub film_year: Option<u32>,
    #[serde(default)]
    pub film_url: String,
    /// Matchable identifier against the catalog; absent when the collector could not resolve it
    pub tmdb_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ShowdownDataset {
    pub summary: ShowdownSummary,
    pub published_at: Option<String>,
    #[serde(default)]
    pub entries: Vec<ShowdownEntry>,
}

impl ShowdownDataset {
    pub fn slug(&self) -> &str {
        &self.summary.slug
    }

    /// Display title, falling back to the slug when the collector stored an empty one
    pub fn display_title(&self) -> &str {
        let title = self.summary.title.trim();
        if title.is_empty() {
            self.summary.slug.as_str()
        } else {
            title
        }
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Catalog identifiers in list order, skipping entries without one
    pub fn tmdb_ids(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter_map(|entry| entry.tmdb_id.as_deref())
            .filter(|id| !id.is_empty())
    }
}
