use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{AnalysisError, DateRange, Instrument, PricePoint, PriceRow};

/// Read access to stored instruments and their price history.
///
/// The analytics layer never talks to storage itself; whatever orchestrates the
/// analytics calls is handed an implementation of this trait.
#[async_trait]
pub trait PriceHistoryRepository: Send + Sync {
    /// All instruments, ordered by name.
    async fn list_instruments(&self) -> Result<Vec<Instrument>, AnalysisError>;

    async fn instrument_by_id(&self, id: i64) -> Result<Option<Instrument>, AnalysisError>;

    async fn instrument_by_symbol(&self, symbol: &str) -> Result<Option<Instrument>, AnalysisError>;

    /// History of one instrument inside `range` (inclusive), ascending by date.
    async fn fetch_price_history(
        &self,
        instrument_id: i64,
        range: DateRange,
    ) -> Result<Vec<PricePoint>, AnalysisError>;

    /// Rows for several instruments inside `range`, ordered by date then instrument.
    /// An empty `instrument_ids` slice selects every instrument.
    async fn fetch_price_rows(
        &self,
        instrument_ids: &[i64],
        range: DateRange,
    ) -> Result<Vec<PriceRow>, AnalysisError>;

    /// Most recent stored date across `instrument_ids` (all instruments when empty).
    async fn latest_date(&self, instrument_ids: &[i64]) -> Result<Option<NaiveDate>, AnalysisError>;
}
