use showdown_models::{AvailabilityIndex, AvailabilityRecord, ShowdownDataset, ShowdownEntry};
use std::collections::HashSet;
use tracing::debug;

/// Full evaluation of one dataset, kept even when it misses the threshold
#[derive(Debug, Clone, PartialEq)]
pub struct Assessment {
    pub record: AvailabilityRecord,
    pub threshold_met: bool,
    /// Entries with a catalog id that the catalog does not hold
    pub missing_entries: Vec<ShowdownEntry>,
}

/// Assess every dataset against the catalog, in dataset order
///
/// A slug that appears more than once is only assessed the first time.
pub fn assess(
    datasets: &[ShowdownDataset],
    index: &AvailabilityIndex,
    threshold: usize,
) -> Vec<Assessment> {
    let mut seen = HashSet::new();
    let mut assessments = Vec::with_capacity(datasets.len());

    for dataset in datasets {
        if dataset.slug().is_empty() {
            continue;
        }
        if !seen.insert(dataset.slug()) {
            debug!("Showdown '{}' listed twice in dataset; keeping the first", dataset.slug());
            continue;
        }

        let record = to_record(dataset, index);
        let missing_entries = dataset
            .entries
            .iter()
            .filter(|entry| matches!(entry.tmdb_id.as_deref(), Some(id) if !id.is_empty() && !index.contains(id)))
            .cloned()
            .collect();

        assessments.push(Assessment {
            threshold_met: record.available_entries >= threshold,
            record,
            missing_entries,
        });
    }

    assessments
}

/// Availability records for the datasets that meet `threshold`
pub fn evaluate(
    datasets: &[ShowdownDataset],
    index: &AvailabilityIndex,
    threshold: usize,
) -> Vec<AvailabilityRecord> {
    let records: Vec<AvailabilityRecord> = assess(datasets, index, threshold)
        .into_iter()
        .filter(|a| a.threshold_met)
        .map(|a| a.record)
        .collect();

    debug!(
        "Evaluated {} datasets: {} meet the threshold of {}",
        datasets.len(),
        records.len(),
        threshold
    );
    records
}

fn to_record(dataset: &ShowdownDataset, index: &AvailabilityIndex) -> AvailabilityRecord {
    AvailabilityRecord {
        slug: dataset.slug().to_string(),
        title: dataset.display_title().to_string(),
        source_url: dataset.summary.showdown_url.clone(),
        total_entries: dataset.entry_count(),
        available_entries: index.count_available(dataset.tmdb_ids()),
        published_at: dataset.published_at.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showdown_models::ShowdownSummary;

    fn dataset(slug: &str, ids: &[Option<&str>]) -> ShowdownDataset {
        ShowdownDataset {
            summary: ShowdownSummary {
                slug: slug.to_string(),
                title: format!("{} title", slug),
                showdown_url: format!("https://letterboxd.com/showdown/{}/", slug),
                ..ShowdownSummary::default()
            },
            published_at: Some("2024-01-01T00:00:00Z".to_string()),
            entries: ids
                .iter()
                .enumerate()
                .map(|(i, id)| ShowdownEntry {
                    rank: i as u32 + 1,
                    film_name: format!("Film {}", i + 1),
                    tmdb_id: id.map(str::to_string),
                    ..ShowdownEntry::default()
                })
                .collect(),
        }
    }

    fn index(ids: &[&str]) -> AvailabilityIndex {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_evaluate_filters_by_threshold() {
        let datasets = vec![
            dataset("a", &[Some("1"), Some("2"), Some("3"), Some("4"), Some("9")]),
            dataset("b", &[Some("1"), Some("2"), Some("3")]),
        ];
        let records = evaluate(&datasets, &index(&["1", "2", "3", "4"]), 4);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].slug, "a");
        assert_eq!(records[0].available_entries, 4);
        assert_eq!(records[0].total_entries, 5);
        assert_eq!(records[0].title, "a title");
    }

    #[test]
    fn test_entries_without_ids_count_towards_total_only() {
        let datasets = vec![dataset("a", &[Some("1"), None, None, Some("2")])];
        let records = evaluate(&datasets, &index(&["1", "2"]), 0);
        assert_eq!(records[0].total_entries, 4);
        assert_eq!(records[0].available_entries, 2);
        assert_eq!(records[0].match_ratio(), 0.5);
    }

    #[test]
    fn test_zero_threshold_keeps_empty_lists() {
        let datasets = vec![dataset("empty", &[])];
        let records = evaluate(&datasets, &AvailabilityIndex::new(), 0);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].match_ratio(), 0.0);
    }

    #[test]
    fn test_assess_reports_missing_entries_and_dedupes_slugs() {
        let datasets = vec![
            dataset("a", &[Some("1"), Some("7"), None]),
            dataset("a", &[Some("1")]),
        ];
        let assessments = assess(&datasets, &index(&["1"]), 2);
        assert_eq!(assessments.len(), 1);
        assert!(!assessments[0].threshold_met);
        assert_eq!(assessments[0].missing_entries.len(), 1);
        assert_eq!(assessments[0].missing_entries[0].tmdb_id.as_deref(), Some("7"));
    }
}
