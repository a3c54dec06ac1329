use async_trait::async_trait;
use showdown_models::AvailabilityIndex;

use crate::SourceError;

/// Supplies the set of catalog identifiers a rotation is evaluated against
#[async_trait]
pub trait AvailabilityIndexSource: Send + Sync {
    fn source_name(&self) -> &str;

    async fn fetch_index(&self) -> Result<AvailabilityIndex, SourceError>;
}
