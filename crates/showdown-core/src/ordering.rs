use showdown_models::{AvailabilityRecord, SortMode};
use std::cmp::Ordering;

/// Ascending order over `(match_ratio, available_entries, published, title, slug)`
///
/// Ratios are compared by cross-multiplication so equal fractions tie exactly;
/// the slug keeps the order total when titles collide.
pub fn compare_records(a: &AvailabilityRecord, b: &AvailabilityRecord) -> Ordering {
    compare_ratio(a, b)
        .then_with(|| a.available_entries.cmp(&b.available_entries))
        .then_with(|| a.published_datetime().cmp(&b.published_datetime()))
        .then_with(|| a.title.cmp(&b.title))
        .then_with(|| a.slug.cmp(&b.slug))
}

fn ratio_parts(record: &AvailabilityRecord) -> (u128, u128) {
    if record.total_entries == 0 {
        (0, 1)
    } else {
        (record.available_entries as u128, record.total_entries as u128)
    }
}

fn compare_ratio(a: &AvailabilityRecord, b: &AvailabilityRecord) -> Ordering {
    let (a_num, a_den) = ratio_parts(a);
    let (b_num, b_den) = ratio_parts(b);
    (a_num * b_den).cmp(&(b_num * a_den))
}

pub fn sort_records(mut records: Vec<AvailabilityRecord>, mode: SortMode) -> Vec<AvailabilityRecord> {
    match mode {
        SortMode::MatchesDesc => records.sort_by(|a, b| compare_records(b, a)),
        SortMode::MatchesAsc => records.sort_by(compare_records),
        SortMode::None => {}
    }
    records
}
