//! Series ingestion port.

use crate::domain::error::PipelineError;
use crate::domain::series::AssetSeries;

/// Supplies the date-ordered bar series of one asset.
///
/// Implementations report unreadable input, missing schema fields and
/// duplicate dates as [`PipelineError`]s scoped to the requested asset.
pub trait SeriesSource: Send + Sync {
    fn load(&self, asset: &str) -> Result<AssetSeries, PipelineError>;

    /// Asset identifiers this source can serve, sorted.
    fn list_assets(&self) -> Result<Vec<String>, PipelineError>;
}
