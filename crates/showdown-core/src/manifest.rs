use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::materialize::{CollectionBuilder, CollectionView};

/// Comment block written above the collections
#[derive(Debug, Clone)]
pub struct ManifestHeader {
    pub generated_at: DateTime<Utc>,
    pub config_source: Option<PathBuf>,
    pub spotlight: Option<String>,
    pub window_size: usize,
    pub label: String,
}

impl ManifestHeader {
    fn render(&self) -> String {
        let config_source = self
            .config_source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "n/a".to_string());
        format!(
            "# Managed by showdown\n\
             # Generated on {}\n\
             # Source config: {}\n\
             # Spotlight: {}\n\
             # Window size: {} (label: {})\n\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S"),
            config_source,
            self.spotlight.as_deref().unwrap_or("n/a"),
            self.window_size,
            self.label
        )
    }
}

fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

/// Catalog ids are written as integers when they look like one
fn id_value(id: &str) -> Value {
    match id.parse::<u64>() {
        Ok(n) => Value::from(n),
        Err(_) => Value::String(id.to_string()),
    }
}

fn collection_mapping(view: &CollectionView) -> Mapping {
    let mut map = Mapping::new();
    match &view.builder {
        CollectionBuilder::TmdbMovie(ids) => {
            map.insert(key("tmdb_movie"), Value::Sequence(ids.iter().map(|id| id_value(id)).collect()));
        }
        CollectionBuilder::LetterboxdList(url) => {
            map.insert(key("letterboxd_list"), Value::String(url.clone()));
        }
    }
    map.insert(key("sort_title"), Value::String(view.sort_title.clone()));
    map.insert(key("sync_mode"), key("sync"));
    map.insert(key("summary"), Value::String(view.summary.clone()));
    map.insert(key("visible_library"), Value::Bool(view.visible_library));
    map.insert(key("visible_home"), Value::Bool(view.visible_home));
    map.insert(key("visible_shared"), Value::Bool(view.visible_shared));
    map.insert(key("label"), Value::String(view.label.clone()));
    if !view.delete_collections_named.is_empty() {
        map.insert(key("delete_collections_named"), names_value(&view.delete_collections_named));
    }
    map
}

fn names_value(names: &[String]) -> Value {
    Value::Sequence(names.iter().cloned().map(Value::String).collect())
}

/// Render the Kometa document: header comments, then collections in window order
pub fn render_manifest(
    header: &ManifestHeader,
    collections: &[CollectionView],
    retired: &[String],
) -> Result<String> {
    let mut collections_map = Mapping::new();
    for view in collections {
        let replaced = collections_map.insert(Value::String(view.name.clone()), Value::Mapping(collection_mapping(view)));
        if replaced.is_some() {
            warn!("Duplicate collection title '{}' in manifest; the later entry replaces the earlier one", view.name);
        }
    }

    let mut doc = Mapping::new();
    doc.insert(key("collections"), Value::Mapping(collections_map));
    if !retired.is_empty() {
        doc.insert(key("delete_collections_named"), names_value(retired));
    }

    let body = serde_yaml::to_string(&Value::Mapping(doc)).context("Failed to serialize manifest")?;
    Ok(format!("{}{}", header.render(), body))
}

/// Write the manifest next to its final path, then rename it into place
pub fn write_manifest(
    path: &Path,
    header: &ManifestHeader,
    collections: &[CollectionView],
    retired: &[String],
) -> Result<()> {
    let content = render_manifest(header, collections, retired)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)?;

    info!("Wrote {} collections to {:?}", collections.len(), path);
    Ok(())
}
