pub mod dataset;
pub mod error;
pub mod index_file;
pub mod plex;
pub mod traits;

pub use dataset::{load_datasets, parse_datasets};
pub use error::SourceError;
pub use index_file::IndexFileSource;
pub use plex::PlexLibrarySource;
pub use traits::AvailabilityIndexSource;
