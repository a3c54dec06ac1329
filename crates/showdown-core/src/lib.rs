pub mod evaluate;
pub mod lifecycle;
pub mod manifest;
pub mod materialize;
pub mod ordering;
pub mod rotation;
pub mod selector;
pub mod state_store;

pub use evaluate::{assess, evaluate, Assessment};
pub use lifecycle::{advance_lifecycles, next_status, retired_names, Lifecycles};
pub use manifest::{render_manifest, write_manifest, ManifestHeader};
pub use materialize::{materialize, CollectionBuilder, CollectionView};
pub use ordering::{compare_records, sort_records};
pub use rotation::{rotate, JobReport, Rotation, RotationJob, RotationOutcome, RotationSettings};
pub use selector::{select_window, WindowSelection};
pub use state_store::{state_from_value, StateStore};
