pub mod availability;
pub mod dataset;
pub mod lifecycle;
pub mod rotation_state;
pub mod sort_mode;

pub use availability::{AvailabilityIndex, AvailabilityRecord};
pub use dataset::{ShowdownDataset, ShowdownEntry, ShowdownSummary};
pub use lifecycle::LifecycleStatus;
pub use rotation_state::{title_or_slug, RotationState};
pub use sort_mode::SortMode;
