use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::LifecycleStatus;

/// Trimmed title for `slug`, or the slug when no usable title is stored
pub fn title_or_slug<'a>(titles: &'a BTreeMap<String, String>, slug: &'a str) -> &'a str {
    match titles.get(slug).map(|title| title.trim()) {
        Some(title) if !title.is_empty() => title,
        _ => slug,
    }
}

/// Everything a rotation remembers between runs
///
/// Persisted as a single JSON document. Keys written by other tools (or older
/// versions) are kept in `extra` and written back untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RotationState {
    /// Rank of the next item to spotlight in the current ordered list
    #[serde(default)]
    pub window_position: usize,
    #[serde(default)]
    pub collection_lifecycles: BTreeMap<String, LifecycleStatus>,
    /// Last known display title per slug, so retired collections can still be named
    #[serde(default)]
    pub collection_titles: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_spotlight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl RotationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lifecycle(&self, slug: &str) -> Option<LifecycleStatus> {
        self.collection_lifecycles.get(slug).copied()
    }

    /// Title on record for a slug, falling back to the slug itself
    pub fn display_name<'a>(&'a self, slug: &'a str) -> &'a str {
        title_or_slug(&self.collection_titles, slug)
    }

    pub fn is_empty(&self) -> bool {
        self.window_position == 0
            && self.collection_lifecycles.is_empty()
            && self.collection_titles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallback() {
        let mut state = RotationState::new();
        state.collection_titles.insert("foo".to_string(), "Foo Showdown".to_string());
        state.collection_titles.insert("blank".to_string(), " ".to_string());
        state.collection_titles.insert("padded".to_string(), "  Padded Showdown ".to_string());
        assert_eq!(state.display_name("foo"), "Foo Showdown");
        assert_eq!(state.display_name("padded"), "Padded Showdown");
        assert_eq!(state.display_name("blank"), "blank");
        assert_eq!(state.display_name("bar"), "bar");
    }

    #[test]
    fn test_is_empty() {
        let mut state = RotationState::new();
        assert!(state.is_empty());

        state.extra.insert("notes".to_string(), serde_json::json!("kept"));
        assert!(state.is_empty());

        state.window_position = 1;
        assert!(!state.is_empty());
    }

    #[test]
    fn test_extra_keys_round_trip() {
        let json = r#"{"window_position":2,"collection_lifecycles":{"a":"library"},"collection_titles":{},"seen":["a"]}"#;
        let state: RotationState = serde_json::from_str(json).unwrap();
        assert_eq!(state.window_position, 2);
        assert_eq!(state.lifecycle("a"), Some(LifecycleStatus::Library));
        assert_eq!(state.extra.get("seen"), Some(&serde_json::json!(["a"])));

        let written = serde_json::to_value(&state).unwrap();
        assert_eq!(written["seen"], serde_json::json!(["a"]));
    }
}
