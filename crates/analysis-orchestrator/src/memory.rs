use analysis_core::{
    AnalysisError, DateRange, Instrument, PriceHistoryRepository, PricePoint, PriceRow,
};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Repository over rows held in memory. Used for tests and small embedded datasets.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    instruments: Vec<Instrument>,
    rows: Vec<PriceRow>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository holding `rows`, instruments taken from the rows themselves.
    pub fn from_rows(rows: Vec<PriceRow>) -> Self {
        let mut repo = Self::new();
        for row in rows {
            if !repo.instruments.iter().any(|i| i.id == row.instrument_id()) {
                repo.instruments.push(row.instrument.clone());
            }
            repo.rows.push(row);
        }
        repo
    }

    /// Builder form of [`InMemoryRepository::insert_history`].
    pub fn with_history(mut self, instrument: Instrument, points: Vec<PricePoint>) -> Self {
        self.insert_history(instrument, points);
        self
    }

    /// Register `instrument` (replacing one with the same id) and append its points.
    pub fn insert_history(&mut self, instrument: Instrument, points: Vec<PricePoint>) {
        match self.instruments.iter_mut().find(|i| i.id == instrument.id) {
            Some(existing) => *existing = instrument.clone(),
            None => self.instruments.push(instrument.clone()),
        }
        self.rows
            .extend(points.into_iter().map(|p| PriceRow::new(instrument.clone(), p)));
    }

    fn selected<'a>(
        &'a self,
        instrument_ids: &'a [i64],
        range: DateRange,
    ) -> impl Iterator<Item = &'a PriceRow> + 'a {
        self.rows.iter().filter(move |r| {
            (instrument_ids.is_empty() || instrument_ids.contains(&r.instrument_id()))
                && range.contains(r.date())
        })
    }
}

#[async_trait]
impl PriceHistoryRepository for InMemoryRepository {
    async fn list_instruments(&self) -> Result<Vec<Instrument>, AnalysisError> {
        let mut instruments = self.instruments.clone();
        instruments.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(instruments)
    }

    async fn instrument_by_id(&self, id: i64) -> Result<Option<Instrument>, AnalysisError> {
        Ok(self.instruments.iter().find(|i| i.id == id).cloned())
    }

    async fn instrument_by_symbol(&self, symbol: &str) -> Result<Option<Instrument>, AnalysisError> {
        Ok(self
            .instruments
            .iter()
            .find(|i| i.symbol.eq_ignore_ascii_case(symbol))
            .cloned())
    }

    async fn fetch_price_history(
        &self,
        instrument_id: i64,
        range: DateRange,
    ) -> Result<Vec<PricePoint>, AnalysisError> {
        let ids = [instrument_id];
        let mut points: Vec<PricePoint> = self.selected(&ids, range).map(|r| r.point.clone()).collect();
        points.sort_by_key(|p| p.date);
        Ok(points)
    }

    async fn fetch_price_rows(
        &self,
        instrument_ids: &[i64],
        range: DateRange,
    ) -> Result<Vec<PriceRow>, AnalysisError> {
        let mut rows: Vec<PriceRow> = self.selected(instrument_ids, range).cloned().collect();
        rows.sort_by_key(|r| (r.date(), r.instrument_id()));
        Ok(rows)
    }

    async fn latest_date(&self, instrument_ids: &[i64]) -> Result<Option<NaiveDate>, AnalysisError> {
        Ok(self
            .selected(instrument_ids, DateRange::unbounded())
            .map(|r| r.date())
            .max())
    }
}
