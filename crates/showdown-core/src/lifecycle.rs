use showdown_models::{title_or_slug, LifecycleStatus};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Stored lifecycle per slug; a missing key means the slug was never shown
pub type Lifecycles = BTreeMap<String, LifecycleStatus>;

/// Transition for one slug that is still in the ordered list
pub fn next_status(
    previous: Option<LifecycleStatus>,
    in_window: bool,
    is_spotlight: bool,
) -> Option<LifecycleStatus> {
    use LifecycleStatus::*;

    if is_spotlight {
        return Some(Spotlight);
    }
    match (in_window, previous) {
        (true, _) => Some(Library),
        (false, Some(Spotlight | Library)) => Some(Retire),
        (false, Some(Retire)) => Some(Retire),
        (false, None) => None,
    }
}

/// Compute the lifecycle map after this run's window selection
///
/// `ordered` is every eligible slug in rank order, `window` the visible slice of
/// it. Slugs that were tracked but are no longer eligible at all get retired.
pub fn advance_lifecycles<S: AsRef<str>>(
    previous: &Lifecycles,
    ordered: &[S],
    window: &[S],
    spotlight: Option<&str>,
) -> Lifecycles {
    let in_window: HashSet<&str> = window.iter().map(AsRef::as_ref).collect();
    let mut next = previous.clone();

    for slug in ordered.iter().map(AsRef::as_ref) {
        let prev = previous.get(slug).copied();
        let status = next_status(prev, in_window.contains(slug), spotlight == Some(slug));
        match status {
            Some(status) => {
                if prev != Some(status) {
                    debug!("Lifecycle {}: {:?} -> {}", slug, prev, status);
                }
                next.insert(slug.to_string(), status);
            }
            None => {
                next.remove(slug);
            }
        }
    }

    let eligible: HashSet<&str> = ordered.iter().map(AsRef::as_ref).collect();
    for (slug, status) in next.iter_mut() {
        if !eligible.contains(slug.as_str()) && *status != LifecycleStatus::Retire {
            debug!("Retiring {} ({}): no longer eligible", slug, status);
            *status = LifecycleStatus::Retire;
        }
    }

    next
}

/// Display names of every retired slug, deduplicated in slug order
///
/// Titles come from the stored title map, falling back to the slug.
pub fn retired_names(lifecycles: &Lifecycles, titles: &BTreeMap<String, String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for (slug, status) in lifecycles {
        if *status != LifecycleStatus::Retire {
            continue;
        }
        let name = title_or_slug(titles, slug);
        if seen.insert(name) {
            names.push(name.to_string());
        }
    }

    names
}
