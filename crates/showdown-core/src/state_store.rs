use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use showdown_models::{LifecycleStatus, RotationState};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const KNOWN_KEYS: [&str; 5] = [
    "window_position",
    "collection_lifecycles",
    "collection_titles",
    "last_spotlight",
    "updated_at",
];

/// Rotation state persisted as a single JSON document
///
/// Loading never fails: a missing, unreadable or malformed file yields the
/// default state. Saving writes a temp file next to the target and renames it
/// into place, so a crash mid-write leaves the previous state intact.
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> RotationState {
        if !self.path.exists() {
            debug!("Rotation state {:?} does not exist, starting fresh", self.path);
            return RotationState::new();
        }

        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read rotation state {:?}: {}. Starting fresh.", self.path, e);
                return RotationState::new();
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => {
                let state = state_from_map(map);
                debug!(
                    "Loaded rotation state: position {}, {} lifecycles, {} titles",
                    state.window_position,
                    state.collection_lifecycles.len(),
                    state.collection_titles.len()
                );
                state
            }
            Ok(_) => {
                warn!("Rotation state {:?} is not a JSON object. Starting fresh.", self.path);
                RotationState::new()
            }
            Err(e) => {
                warn!("Rotation state {:?} is corrupt: {}. Starting fresh.", self.path, e);
                RotationState::new()
            }
        }
    }

    pub fn save(&self, state: &RotationState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create state directory {:?}", parent))?;
            }
        }

        let json = serde_json::to_string_pretty(state).context("Failed to serialize rotation state")?;

        let temp_path = self.path.with_extension("tmp");
        std::fs::write(&temp_path, json)
            .with_context(|| format!("Failed to write rotation state to {:?}", temp_path))?;
        std::fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to move rotation state into {:?}", self.path))?;

        info!(
            "Saved rotation state to {:?} (next position {})",
            self.path, state.window_position
        );
        Ok(())
    }

    /// Remove the state file; returns whether there was anything to remove
    pub fn reset(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(&self.path)
            .with_context(|| format!("Failed to delete rotation state {:?}", self.path))?;
        info!("Deleted rotation state {:?}", self.path);
        Ok(true)
    }
}

/// Build a state from a parsed document, dropping fields that do not fit
pub fn state_from_value(value: Value) -> RotationState {
    match value {
        Value::Object(map) => state_from_map(map),
        _ => RotationState::new(),
    }
}

fn state_from_map(mut map: Map<String, Value>) -> RotationState {
    let window_position = map
        .get("window_position")
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);

    let mut collection_lifecycles = BTreeMap::new();
    if let Some(Value::Object(raw)) = map.get("collection_lifecycles") {
        for (slug, value) in raw {
            match value.as_str().and_then(LifecycleStatus::parse) {
                Some(status) => {
                    collection_lifecycles.insert(slug.clone(), status);
                }
                None => debug!("Dropping malformed lifecycle for {}: {}", slug, value),
            }
        }
    }

    let mut collection_titles = BTreeMap::new();
    if let Some(Value::Object(raw)) = map.get("collection_titles") {
        for (slug, value) in raw {
            if let Some(title) = value.as_str() {
                collection_titles.insert(slug.clone(), title.to_string());
            }
        }
    }

    let last_spotlight = map
        .get("last_spotlight")
        .and_then(Value::as_str)
        .map(str::to_string);

    let updated_at = map
        .get("updated_at")
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc));

    for key in KNOWN_KEYS {
        map.remove(key);
    }

    RotationState {
        window_position,
        collection_lifecycles,
        collection_titles,
        last_spotlight,
        updated_at,
        extra: map.into_iter().collect(),
    }
}
