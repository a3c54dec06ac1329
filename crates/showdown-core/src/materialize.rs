use serde::Serialize;
use showdown_models::{AvailabilityIndex, AvailabilityRecord, LifecycleStatus, ShowdownDataset};
use std::collections::{HashMap, HashSet};

use crate::rotation::Rotation;

/// Where Kometa pulls the collection's items from
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionBuilder {
    /// Catalog ids already known to be in the library
    TmdbMovie(Vec<String>),
    /// Fall back to the source list itself
    LetterboxdList(String),
}

/// One collection to render for the current window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionView {
    pub name: String,
    pub slug: String,
    pub lifecycle: Option<LifecycleStatus>,
    pub sort_title: String,
    pub summary: String,
    pub builder: CollectionBuilder,
    pub visible_library: bool,
    pub visible_home: bool,
    pub visible_shared: bool,
    pub label: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub delete_collections_named: Vec<String>,
}

/// Build the collection views for a rotation's window, in window order
pub fn materialize(
    rotation: &Rotation,
    datasets: &[ShowdownDataset],
    index: &AvailabilityIndex,
    label: &str,
) -> Vec<CollectionView> {
    let mut by_slug: HashMap<&str, &ShowdownDataset> = HashMap::new();
    for dataset in datasets {
        by_slug.entry(dataset.slug()).or_insert(dataset);
    }

    let spotlight_slug = rotation.spotlight().map(|r| r.slug.as_str());
    let retired = dedupe(&rotation.retired_names);

    rotation
        .window()
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let dataset = by_slug.get(record.slug.as_str()).copied();
            let lifecycle = rotation.lifecycles().get(&record.slug).copied();
            let is_spotlight = spotlight_slug == Some(record.slug.as_str());
            let (visible_library, visible_home, visible_shared) = visibility(lifecycle, is_spotlight);

            CollectionView {
                name: record.title.clone(),
                slug: record.slug.clone(),
                lifecycle,
                sort_title: sort_title(i, record),
                summary: summary(record, dataset),
                builder: builder(record, dataset, index),
                visible_library,
                visible_home,
                visible_shared,
                label: label.to_string(),
                delete_collections_named: if i == 0 { retired.clone() } else { Vec::new() },
            }
        })
        .collect()
}

pub fn sort_title(position: usize, record: &AvailabilityRecord) -> String {
    format!(
        "+4 Showdown {:02} {:02}/{:02} {}",
        position, record.available_entries, record.total_entries, record.title
    )
}

fn summary(record: &AvailabilityRecord, dataset: Option<&ShowdownDataset>) -> String {
    let description = dataset
        .and_then(|d| d.summary.description.as_deref())
        .map(str::trim)
        .filter(|d| !d.is_empty());

    match description {
        Some(description) => format!("{}\n\n{}", description, record.source_url),
        None if record.total_entries == 0 => "No titles available in Plex.".to_string(),
        None => format!(
            "{}/{} titles owned ({}%).",
            record.available_entries,
            record.total_entries,
            record.percent_owned()
        ),
    }
}

/// (library, home, shared)
fn visibility(lifecycle: Option<LifecycleStatus>, is_spotlight: bool) -> (bool, bool, bool) {
    match lifecycle.unwrap_or(LifecycleStatus::Library) {
        LifecycleStatus::Spotlight => (true, true, true),
        LifecycleStatus::Library => (true, false, false),
        LifecycleStatus::Retire => (true, is_spotlight, is_spotlight),
    }
}

fn builder(
    record: &AvailabilityRecord,
    dataset: Option<&ShowdownDataset>,
    index: &AvailabilityIndex,
) -> CollectionBuilder {
    let mut seen = HashSet::new();
    let ids: Vec<String> = dataset
        .into_iter()
        .flat_map(|d| d.tmdb_ids())
        .filter(|id| index.contains(id) && seen.insert(*id))
        .map(str::to_string)
        .collect();

    if !ids.is_empty() {
        return CollectionBuilder::TmdbMovie(ids);
    }
    if record.source_url.trim().is_empty() {
        CollectionBuilder::LetterboxdList(format!("https://letterboxd.com/showdown/{}/", record.slug))
    } else {
        CollectionBuilder::LetterboxdList(record.source_url.clone())
    }
}

fn dedupe(names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect()
}
