use async_trait::async_trait;
use serde_json::Value;
use showdown_models::AvailabilityIndex;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::dataset::as_identifier;
use crate::{AvailabilityIndexSource, SourceError};

/// Availability index read from a JSON file, for offline runs and exports
///
/// Accepts `["603", 680, ...]` or `{"tmdb_ids": [...]}`.
pub struct IndexFileSource {
    path: PathBuf,
}

impl IndexFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn invalid(&self, reason: &str) -> SourceError {
        SourceError::InvalidIndex {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn parse(&self, payload: &Value) -> Result<AvailabilityIndex, SourceError> {
        let ids = match payload {
            Value::Array(items) => items,
            Value::Object(map) => map
                .get("tmdb_ids")
                .and_then(|v| v.as_array())
                .ok_or_else(|| self.invalid("object has no 'tmdb_ids' list"))?,
            _ => return Err(self.invalid("expected a list of identifiers")),
        };
        Ok(ids.iter().filter_map(as_identifier).collect())
    }
}

#[async_trait]
impl AvailabilityIndexSource for IndexFileSource {
    fn source_name(&self) -> &str {
        "index-file"
    }

    async fn fetch_index(&self) -> Result<AvailabilityIndex, SourceError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let payload: Value = serde_json::from_str(&content)?;
        let index = self.parse(&payload)?;
        info!("Loaded {} catalog identifiers from {}", index.len(), self.path.display());
        Ok(index)
    }
}
