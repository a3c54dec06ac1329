use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use showdown_config::{ConfigError, ShowdownConfig};
use showdown_models::{AvailabilityIndex, AvailabilityRecord, RotationState, ShowdownDataset, SortMode};
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing::info;

use crate::evaluate::evaluate;
use crate::lifecycle::{advance_lifecycles, retired_names, Lifecycles};
use crate::manifest::{write_manifest, ManifestHeader};
use crate::materialize::{materialize, CollectionView};
use crate::ordering::sort_records;
use crate::selector::{select_window, WindowSelection};
use crate::state_store::StateStore;

/// Knobs for one rotation, already validated
#[derive(Debug, Clone, PartialEq)]
pub struct RotationSettings {
    pub threshold: usize,
    pub window: NonZeroUsize,
    pub sort: SortMode,
    pub label: String,
}

impl RotationSettings {
    pub fn from_config(config: &ShowdownConfig) -> Result<Self, ConfigError> {
        let label = config.label.trim();
        if label.is_empty() {
            return Err(ConfigError::EmptyLabel);
        }
        Ok(Self {
            threshold: config.threshold,
            window: config.window_size()?,
            sort: config.sort_mode(),
            label: label.to_string(),
        })
    }
}

/// Result of a rotation that had at least one eligible list
#[derive(Debug, Clone, PartialEq)]
pub struct Rotation {
    /// State to persist for the next run
    pub state: RotationState,
    /// Every eligible record in rank order
    pub ordered: Vec<AvailabilityRecord>,
    pub selection: WindowSelection,
    pub retired_names: Vec<String>,
}

impl Rotation {
    pub fn window(&self) -> &[AvailabilityRecord] {
        self.selection.window(&self.ordered)
    }

    pub fn spotlight(&self) -> Option<&AvailabilityRecord> {
        self.selection.spotlight(&self.ordered)
    }

    pub fn lifecycles(&self) -> &Lifecycles {
        &self.state.collection_lifecycles
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RotationOutcome {
    /// Nothing met the threshold; the state is returned as it was loaded
    Idle { state: RotationState },
    Rotated(Rotation),
}

impl RotationOutcome {
    pub fn state(&self) -> &RotationState {
        match self {
            RotationOutcome::Idle { state } => state,
            RotationOutcome::Rotated(rotation) => &rotation.state,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, RotationOutcome::Idle { .. })
    }
}

/// Run one rotation step over the loaded inputs
///
/// Pure: the same state, datasets, index, settings and `now` always produce
/// the same outcome.
pub fn rotate(
    state: &RotationState,
    datasets: &[ShowdownDataset],
    index: &AvailabilityIndex,
    settings: &RotationSettings,
    now: DateTime<Utc>,
) -> RotationOutcome {
    let records = evaluate(datasets, index, settings.threshold);
    let ordered = sort_records(records, settings.sort);

    let selection = match select_window(ordered.len(), settings.window, state.window_position) {
        Some(selection) => selection,
        None => {
            info!(
                "No showdown meets the threshold of {} available titles; nothing to rotate",
                settings.threshold
            );
            return RotationOutcome::Idle { state: state.clone() };
        }
    };

    let mut next = state.clone();
    refresh_titles(&mut next, datasets);

    let ordered_slugs: Vec<&str> = ordered.iter().map(|r| r.slug.as_str()).collect();
    let window_slugs = selection.window(&ordered_slugs);
    let spotlight = selection.spotlight(&ordered_slugs).copied();

    next.collection_lifecycles =
        advance_lifecycles(&state.collection_lifecycles, &ordered_slugs, window_slugs, spotlight);
    let retired = retired_names(&next.collection_lifecycles, &next.collection_titles);

    next.window_position = selection.next_position;
    next.last_spotlight = spotlight.map(str::to_string);
    next.updated_at = Some(now);

    info!(
        "Rotation: {} eligible, window {}..{}, spotlight {}, {} retired",
        ordered.len(),
        selection.start,
        selection.end,
        spotlight.unwrap_or("none"),
        retired.len()
    );

    RotationOutcome::Rotated(Rotation {
        state: next,
        ordered,
        selection,
        retired_names: retired,
    })
}

/// Record the current title of every dataset, first occurrence per slug
fn refresh_titles(state: &mut RotationState, datasets: &[ShowdownDataset]) {
    let mut seen = HashSet::new();
    for dataset in datasets {
        let slug = dataset.slug();
        if slug.is_empty() || !seen.insert(slug) {
            continue;
        }
        state
            .collection_titles
            .insert(slug.to_string(), dataset.display_title().to_string());
    }
}

/// Summary of one job run, printed by the CLI
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub idle: bool,
    pub dry_run: bool,
    pub eligible: usize,
    pub spotlight: Option<String>,
    pub window: Vec<String>,
    pub next_position: usize,
    pub retired: Vec<String>,
    pub collections: Vec<CollectionView>,
    pub state_saved: bool,
    pub manifest_path: Option<PathBuf>,
}

/// Load state, rotate, write the manifest and persist the new state
pub struct RotationJob {
    pub state_path: PathBuf,
    pub manifest_path: Option<PathBuf>,
    pub settings: RotationSettings,
    pub dry_run: bool,
    /// Config file named in the manifest header
    pub config_source: Option<PathBuf>,
}

impl RotationJob {
    pub fn run(&self, datasets: &[ShowdownDataset], index: &AvailabilityIndex) -> Result<JobReport> {
        self.run_at(datasets, index, Utc::now())
    }

    pub fn run_at(
        &self,
        datasets: &[ShowdownDataset],
        index: &AvailabilityIndex,
        now: DateTime<Utc>,
    ) -> Result<JobReport> {
        let store = StateStore::new(&self.state_path);
        let state = store.load();

        let rotation = match rotate(&state, datasets, index, &self.settings, now) {
            RotationOutcome::Idle { state } => {
                return Ok(JobReport {
                    idle: true,
                    dry_run: self.dry_run,
                    eligible: 0,
                    spotlight: None,
                    window: Vec::new(),
                    next_position: state.window_position,
                    retired: Vec::new(),
                    collections: Vec::new(),
                    state_saved: false,
                    manifest_path: None,
                });
            }
            RotationOutcome::Rotated(rotation) => rotation,
        };

        let collections = materialize(&rotation, datasets, index, &self.settings.label);

        // Manifest goes first: if it fails, the stored position is not advanced
        let mut manifest_path = None;
        if let Some(path) = &self.manifest_path {
            if self.dry_run {
                info!("Dry run: not writing manifest {:?}", path);
            } else {
                let header = ManifestHeader {
                    generated_at: now,
                    config_source: self.config_source.clone(),
                    spotlight: rotation.spotlight().map(|r| r.title.clone()),
                    window_size: self.settings.window.get(),
                    label: self.settings.label.clone(),
                };
                write_manifest(path, &header, &collections, &rotation.retired_names)
                    .with_context(|| format!("Failed to write manifest {:?}", path))?;
                manifest_path = Some(path.clone());
            }
        }

        let state_saved = if self.dry_run {
            info!("Dry run: not saving rotation state {:?}", self.state_path);
            false
        } else {
            store.save(&rotation.state)?;
            true
        };

        Ok(JobReport {
            idle: false,
            dry_run: self.dry_run,
            eligible: rotation.ordered.len(),
            spotlight: rotation.spotlight().map(|r| r.title.clone()),
            window: rotation.window().iter().map(|r| r.title.clone()).collect(),
            next_position: rotation.state.window_position,
            retired: rotation.retired_names.clone(),
            collections,
            state_saved,
            manifest_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use showdown_models::{LifecycleStatus, ShowdownEntry, ShowdownSummary};
    use tempfile::TempDir;

    fn dataset(slug: &str, title: &str, available: usize, total: usize) -> ShowdownDataset {
        let entries = (0..total)
            .map(|i| ShowdownEntry {
                rank: i as u32 + 1,
                film_name: format!("{} film {}", slug, i),
                tmdb_id: Some(if i < available {
                    format!("{}-{}", slug, i)
                } else {
                    format!("missing-{}-{}", slug, i)
                }),
                ..ShowdownEntry::default()
            })
            .collect();
        ShowdownDataset {
            summary: ShowdownSummary {
                slug: slug.to_string(),
                title: title.to_string(),
                showdown_url: format!("https://letterboxd.com/showdown/{}/", slug),
                ..ShowdownSummary::default()
            },
            published_at: None,
            entries,
        }
    }

    fn index_for(datasets: &[ShowdownDataset]) -> AvailabilityIndex {
        datasets
            .iter()
            .flat_map(|d| d.tmdb_ids())
            .filter(|id| !id.starts_with("missing-"))
            .map(str::to_string)
            .collect()
    }

    fn settings(window: usize) -> RotationSettings {
        RotationSettings {
            threshold: 1,
            window: NonZeroUsize::new(window).unwrap(),
            sort: SortMode::MatchesDesc,
            label: "Showdown Spotlight".to_string(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap()
    }

    fn abc() -> Vec<ShowdownDataset> {
        vec![
            dataset("a", "A", 5, 5),
            dataset("b", "B", 4, 5),
            dataset("c", "C", 3, 5),
        ]
    }

    fn rotated(outcome: RotationOutcome) -> Rotation {
        match outcome {
            RotationOutcome::Rotated(rotation) => rotation,
            RotationOutcome::Idle { .. } => panic!("expected a rotation"),
        }
    }

    #[test]
    fn test_first_run_full_window() {
        let datasets = abc();
        let index = index_for(&datasets);
        let rotation = rotated(rotate(&RotationState::new(), &datasets, &index, &settings(3), now()));

        let window: Vec<&str> = rotation.window().iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(window, vec!["a", "b", "c"]);
        assert_eq!(rotation.spotlight().map(|r| r.slug.as_str()), Some("a"));
        assert_eq!(rotation.state.window_position, 1);
        assert_eq!(rotation.lifecycles().get("a"), Some(&LifecycleStatus::Spotlight));
        assert_eq!(rotation.lifecycles().get("b"), Some(&LifecycleStatus::Library));
        assert_eq!(rotation.lifecycles().get("c"), Some(&LifecycleStatus::Library));
        assert_eq!(rotation.state.last_spotlight.as_deref(), Some("a"));
        assert_eq!(rotation.state.updated_at, Some(now()));
    }

    #[test]
    fn test_single_slot_window() {
        let datasets = abc();
        let index = index_for(&datasets);
        let mut state = RotationState::new();
        state.window_position = 1;
        state.collection_lifecycles.insert("a".to_string(), LifecycleStatus::Spotlight);

        let rotation = rotated(rotate(&state, &datasets, &index, &settings(1), now()));
        assert_eq!(rotation.spotlight().map(|r| r.slug.as_str()), Some("b"));
        assert_eq!(rotation.state.window_position, 2);
        assert_eq!(rotation.lifecycles().get("a"), Some(&LifecycleStatus::Retire));
        assert_eq!(rotation.lifecycles().get("b"), Some(&LifecycleStatus::Spotlight));
        assert_eq!(rotation.retired_names, vec!["A".to_string()]);
    }

    #[test]
    fn test_wraps_at_last_index() {
        let datasets = abc();
        let index = index_for(&datasets);
        let mut state = RotationState::new();
        state.window_position = 2;

        let rotation = rotated(rotate(&state, &datasets, &index, &settings(3), now()));
        assert_eq!(rotation.spotlight().map(|r| r.slug.as_str()), Some("c"));
        assert_eq!(rotation.state.window_position, 0);
    }

    #[test]
    fn test_vanished_spotlight_retired_with_stored_title() {
        let datasets = vec![dataset("bar", "Bar Showdown", 4, 4)];
        let index = index_for(&datasets);
        let mut state = RotationState::new();
        state.collection_lifecycles.insert("foo".to_string(), LifecycleStatus::Spotlight);
        state.collection_titles.insert("foo".to_string(), "Foo Showdown".to_string());

        let rotation = rotated(rotate(&state, &datasets, &index, &settings(5), now()));
        assert_eq!(rotation.lifecycles().get("foo"), Some(&LifecycleStatus::Retire));
        assert_eq!(rotation.retired_names, vec!["Foo Showdown".to_string()]);
        assert_eq!(
            rotation.state.collection_titles.get("bar").map(String::as_str),
            Some("Bar Showdown")
        );
    }

    #[test]
    fn test_nothing_eligible_is_idle() {
        let datasets = vec![dataset("a", "A", 1, 5)];
        let index = index_for(&datasets);
        let mut state = RotationState::new();
        state.window_position = 3;
        let mut strict = settings(5);
        strict.threshold = 4;

        let outcome = rotate(&state, &datasets, &index, &strict, now());
        assert!(outcome.is_idle());
        assert_eq!(outcome.state(), &state);
    }

    #[test]
    fn test_rotate_is_deterministic() {
        let datasets = abc();
        let index = index_for(&datasets);
        let state = RotationState::new();
        let first = rotate(&state, &datasets, &index, &settings(2), now());
        let second = rotate(&state, &datasets, &index, &settings(2), now());
        assert_eq!(first, second);
    }

    #[test]
    fn test_titles_refreshed_for_ineligible_lists() {
        let datasets = vec![dataset("a", "A", 5, 5), dataset("z", "Zed", 0, 5)];
        let index = index_for(&datasets);
        let rotation = rotated(rotate(&RotationState::new(), &datasets, &index, &settings(5), now()));
        assert_eq!(rotation.state.collection_titles.get("z").map(String::as_str), Some("Zed"));
        assert!(!rotation.lifecycles().contains_key("z"));
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = ShowdownConfig::default();
        config.window = 0;
        assert!(matches!(
            RotationSettings::from_config(&config),
            Err(ConfigError::InvalidWindow(0))
        ));

        config.window = 3;
        config.sort = "matches_asc".to_string();
        let settings = RotationSettings::from_config(&config).unwrap();
        assert_eq!(settings.window.get(), 3);
        assert_eq!(settings.sort, SortMode::MatchesAsc);
        assert_eq!(settings.threshold, 4);
    }

    #[test]
    fn test_job_persists_state_and_manifest() {
        let dir = TempDir::new().unwrap();
        let datasets = abc();
        let index = index_for(&datasets);
        let job = RotationJob {
            state_path: dir.path().join("featured/rotation.json"),
            manifest_path: Some(dir.path().join("kometa/showdown.yml")),
            settings: settings(2),
            dry_run: false,
            config_source: None,
        };

        let report = job.run_at(&datasets, &index, now()).unwrap();
        assert!(!report.idle);
        assert!(report.state_saved);
        assert_eq!(report.eligible, 3);
        assert_eq!(report.spotlight.as_deref(), Some("A"));
        assert_eq!(report.window, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(report.next_position, 1);

        let manifest = std::fs::read_to_string(dir.path().join("kometa/showdown.yml")).unwrap();
        assert!(manifest.starts_with("# Managed by showdown"));
        assert!(manifest.contains("+4 Showdown 00 05/05 A"));

        let stored = StateStore::new(&job.state_path).load();
        assert_eq!(stored.window_position, 1);

        let report = job.run_at(&datasets, &index, now()).unwrap();
        assert_eq!(report.spotlight.as_deref(), Some("B"));
        assert_eq!(StateStore::new(&job.state_path).load().window_position, 2);
    }

    #[test]
    fn test_job_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let datasets = abc();
        let index = index_for(&datasets);
        let job = RotationJob {
            state_path: dir.path().join("rotation.json"),
            manifest_path: Some(dir.path().join("showdown.yml")),
            settings: settings(3),
            dry_run: true,
            config_source: None,
        };

        let report = job.run_at(&datasets, &index, now()).unwrap();
        assert!(report.dry_run);
        assert!(!report.state_saved);
        assert!(report.manifest_path.is_none());
        assert_eq!(report.collections.len(), 3);
        assert!(!job.state_path.exists());
        assert!(!dir.path().join("showdown.yml").exists());
    }

    #[test]
    fn test_job_idle_leaves_state_and_manifest_untouched() {
        let dir = TempDir::new().unwrap();
        let state_path = dir.path().join("rotation.json");
        let stored = r#"{"window_position": 2, "collection_lifecycles": {"b": "spotlight"}, "collection_titles": {"b": "B"}}"#;
        std::fs::write(&state_path, stored).unwrap();

        let datasets = abc();
        let index = index_for(&datasets);
        let mut settings = settings(2);
        settings.threshold = 100;
        let job = RotationJob {
            state_path: state_path.clone(),
            manifest_path: Some(dir.path().join("showdown.yml")),
            settings,
            dry_run: false,
            config_source: None,
        };

        let report = job.run_at(&datasets, &index, now()).unwrap();
        assert!(report.idle);
        assert!(!report.state_saved);
        assert!(report.manifest_path.is_none());
        assert_eq!(report.next_position, 2);
        assert!(!dir.path().join("showdown.yml").exists());
        assert_eq!(std::fs::read_to_string(&state_path).unwrap(), stored);
    }
}
