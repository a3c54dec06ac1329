pub mod api;

use async_trait::async_trait;
use showdown_config::PlexConfig;
use showdown_models::AvailabilityIndex;
use tracing::info;

use crate::{AvailabilityIndexSource, SourceError};
pub use api::{extract_tmdb_ids, parse_libraries, LibraryInfo, PlexHttpClient};

/// Availability index built from the TMDB guids of one Plex library section
pub struct PlexLibrarySource {
    client: PlexHttpClient,
    library: String,
}

impl PlexLibrarySource {
    pub fn new(config: &PlexConfig, token: String) -> Result<Self, SourceError> {
        let client = PlexHttpClient::new(token, config.server_url.clone(), config.timeout_secs)?;
        Ok(Self {
            client,
            library: config.library.clone(),
        })
    }

    /// Override the configured library section
    pub fn with_library(mut self, library: impl Into<String>) -> Self {
        self.library = library.into();
        self
    }
}

#[async_trait]
impl AvailabilityIndexSource for PlexLibrarySource {
    fn source_name(&self) -> &str {
        "plex"
    }

    async fn fetch_index(&self) -> Result<AvailabilityIndex, SourceError> {
        let libraries = self.client.get_libraries().await?;
        let section = libraries
            .iter()
            .find(|lib| lib.title.eq_ignore_ascii_case(&self.library))
            .ok_or_else(|| SourceError::LibraryNotFound {
                library: self.library.clone(),
                available: libraries.iter().map(|lib| lib.title.clone()).collect(),
            })?;

        let ids = self.client.get_library_tmdb_ids(&section.key).await?;
        let index: AvailabilityIndex = ids.into_iter().collect();
        info!(
            "Plex library '{}' indexed: {} TMDB identifiers",
            section.title,
            index.len()
        );
        Ok(index)
    }
}
