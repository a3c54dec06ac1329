use anyhow::{Context, Result};
use serde_json::Value;
use showdown_models::{ShowdownDataset, ShowdownEntry, ShowdownSummary};
use std::path::Path;
use tracing::{debug, info, warn};

const DATASETS_KEY: &str = "showdowns";

/// Load showdown datasets from the collector's cached JSON
///
/// A missing or unparseable file is an error; malformed items inside a readable
/// file are skipped.
pub fn load_datasets(path: &Path) -> Result<Vec<ShowdownDataset>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read showdown dataset {}", path.display()))?;
    let payload: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse showdown dataset {}", path.display()))?;

    let datasets = parse_datasets(&payload);
    info!("Loaded {} showdown datasets from {}", datasets.len(), path.display());
    Ok(datasets)
}

/// Accepts `{"showdowns": [...]}` or a bare list of datasets
pub fn parse_datasets(payload: &Value) -> Vec<ShowdownDataset> {
    let items = match payload {
        Value::Object(map) => map.get(DATASETS_KEY).and_then(|v| v.as_array()),
        Value::Array(items) => Some(items),
        _ => None,
    };

    let Some(items) = items else {
        warn!("Showdown dataset has an unexpected structure; expected a list of items");
        return Vec::new();
    };

    let mut datasets = Vec::with_capacity(items.len());
    let mut skipped = 0;
    for item in items {
        match parse_dataset(item) {
            Some(dataset) => datasets.push(dataset),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!("Skipped {} malformed showdown datasets", skipped);
    }
    datasets
}

/// Convert one dataset; `None` when the summary, slug or entry list is missing
pub fn parse_dataset(item: &Value) -> Option<ShowdownDataset> {
    let summary_value = item.get("summary")?.as_object()?;
    let slug = summary_value.get("slug").and_then(as_text)?;
    if slug.is_empty() {
        return None;
    }
    let entries = item.get("entries")?.as_array()?;

    let title = summary_value
        .get("title")
        .and_then(as_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| slug.clone());

    let summary = ShowdownSummary {
        slug,
        title,
        showdown_url: summary_value.get("showdown_url").and_then(as_text).unwrap_or_default(),
        logline: summary_value.get("logline").and_then(as_text),
        status: summary_value.get("status").and_then(as_text),
        description: summary_value.get("description").and_then(as_text).filter(|d| !d.is_empty()),
        background_image: summary_value.get("background_image").and_then(as_text),
    };

    let entries = entries
        .iter()
        .filter(|entry| entry.is_object())
        .enumerate()
        .map(|(position, entry)| parse_entry(entry, position))
        .collect();

    let published_at = item
        .get("published_at")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    Some(ShowdownDataset {
        summary,
        published_at,
        entries,
    })
}

fn parse_entry(entry: &Value, position: usize) -> ShowdownEntry {
    let rank = entry
        .get("rank")
        .and_then(as_u32)
        .unwrap_or(position as u32 + 1);

    ShowdownEntry {
        rank,
        film_name: entry.get("film_name").and_then(as_text).unwrap_or_default(),
        film_slug: entry.get("film_slug").and_then(as_text).unwrap_or_default(),
        film_year: entry.get("film_year").and_then(as_u32),
        film_url: entry.get("film_url").and_then(as_text).unwrap_or_default(),
        tmdb_id: entry.get("tmdb_id").and_then(as_identifier),
    }
}

fn as_text(value: &Value) -> Option<String> {
    value.as_str().map(|s| s.trim().to_string())
}

fn as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// The collector stores TMDB ids as strings, but older caches hold integers
pub(crate) fn as_identifier(value: &Value) -> Option<String> {
    let id = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn sample_payload() -> Value {
        json!({
            "showdowns": [
                {
                    "summary": {
                        "slug": "best-heist",
                        "title": "Best Heist Movie",
                        "showdown_url": "https://letterboxd.com/showdown/best-heist/",
                        "description": "  Who pulled it off best?  "
                    },
                    "published_at": "2024-02-01T10:00:00Z",
                    "entries": [
                        {"rank": 1, "film_name": "Heat", "tmdb_id": "949"},
                        {"rank": "2", "film_name": "Thief", "tmdb_id": 11524},
                        {"rank": 3, "film_name": "Unknown", "tmdb_id": null},
                        "not an entry"
                    ]
                },
                {"summary": {"slug": "no-entries", "title": "Broken"}},
                {"summary": {"slug": "bad-entries", "title": "Broken"}, "entries": {"rank": 1}},
                {"summary": {"title": "No Slug"}, "entries": []},
                {"summary": "nope", "entries": []},
                42
            ]
        })
    }

    #[test]
    fn test_parse_datasets_skips_malformed_items() {
        let datasets = parse_datasets(&sample_payload());
        assert_eq!(datasets.len(), 1);

        let dataset = &datasets[0];
        assert_eq!(dataset.slug(), "best-heist");
        assert_eq!(dataset.summary.description.as_deref(), Some("Who pulled it off best?"));
        assert_eq!(dataset.published_at.as_deref(), Some("2024-02-01T10:00:00Z"));
        assert_eq!(dataset.entry_count(), 3);
        assert_eq!(dataset.entries[1].rank, 2);
        assert_eq!(dataset.entries[1].tmdb_id.as_deref(), Some("11524"));
        assert_eq!(dataset.entries[2].tmdb_id, None);
    }

    #[test]
    fn test_parse_bare_list_and_title_fallback() {
        let payload = json!([
            {"summary": {"slug": "untitled", "title": ""}, "entries": [], "published_at": 17}
        ]);
        let datasets = parse_datasets(&payload);
        assert_eq!(datasets.len(), 1);
        assert_eq!(datasets[0].summary.title, "untitled");
        assert_eq!(datasets[0].published_at, None);
    }

    #[test]
    fn test_parse_unexpected_structure() {
        assert!(parse_datasets(&json!("text")).is_empty());
        assert!(parse_datasets(&json!({"lists": []})).is_empty());
    }

    #[test]
    fn test_load_datasets_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", sample_payload()).unwrap();
        let datasets = load_datasets(file.path()).unwrap();
        assert_eq!(datasets.len(), 1);
    }

    #[test]
    fn test_load_datasets_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_datasets(&dir.path().join("absent.json")).is_err());
    }
}
