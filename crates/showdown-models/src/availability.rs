use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How well one showdown list is covered by the target catalog
///
/// Recomputed on every run from the dataset and the availability index; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailabilityRecord {
    pub slug: String,
    pub title: String,
    pub source_url: String,
    pub total_entries: usize,
    pub available_entries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

impl AvailabilityRecord {
    /// Share of the list present in the catalog, 0.0 for an empty list
    pub fn match_ratio(&self) -> f64 {
        if self.total_entries == 0 {
            return 0.0;
        }
        self.available_entries as f64 / self.total_entries as f64
    }

    /// Rounded percentage of owned titles, as shown in collection summaries
    pub fn percent_owned(&self) -> u32 {
        (self.match_ratio() * 100.0).round() as u32
    }

    /// Publication time, or the minimum timestamp when absent or unparseable
    ///
    /// Undated lists therefore sort last under "most recent first".
    pub fn published_datetime(&self) -> DateTime<Utc> {
        self.published_at
            .as_deref()
            .and_then(parse_published_at)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

/// Parse the collector's ISO-8601 timestamps; naive values are taken as UTC
pub fn parse_published_at(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Identifiers currently present in the target catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilityIndex {
    ids: HashSet<String>,
}

impl AvailabilityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return false;
        }
        self.ids.insert(trimmed.to_string())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id.trim())
    }

    /// Count how many of the given identifiers are in the catalog (duplicates count each time)
    pub fn count_available<'a, I>(&self, ids: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        ids.into_iter().filter(|id| self.contains(id)).count()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Sorted copy of the identifiers, for stable serialization
    pub fn sorted_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.ids.iter().cloned().collect();
        ids.sort();
        ids
    }
}

impl<S: Into<String>> FromIterator<S> for AvailabilityIndex {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut index = AvailabilityIndex::new();
        for id in iter {
            index.insert(id);
        }
        index
    }
}

impl<S: Into<String>> Extend<S> for AvailabilityIndex {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        for id in iter {
            self.insert(id);
        }
    }
}
