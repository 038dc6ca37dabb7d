use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::AnalysisError;

/// A tracked cryptocurrency. Symbol and name are labels only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    pub id: i64,
    pub symbol: String,
    pub name: String,
}

impl Instrument {
    pub fn new(id: i64, symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            symbol: symbol.into(),
            name: name.into(),
        }
    }
}

/// One trading day of OHLCV data for a single instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    #[serde(default)]
    pub market_cap: Option<f64>,
}

impl PricePoint {
    /// Point where open/high/low all equal the close. Mostly useful in tests and fixtures.
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
            market_cap: None,
        }
    }

    pub fn with_market_cap(mut self, market_cap: f64) -> Self {
        self.market_cap = Some(market_cap);
        self
    }
}

/// A price point tagged with the instrument it belongs to, as returned by
/// multi-instrument history queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRow {
    pub instrument: Instrument,
    #[serde(flatten)]
    pub point: PricePoint,
}

impl PriceRow {
    pub fn new(instrument: Instrument, point: PricePoint) -> Self {
        Self { instrument, point }
    }

    pub fn instrument_id(&self) -> i64 {
        self.instrument.id
    }

    pub fn date(&self) -> NaiveDate {
        self.point.date
    }
}

/// Inclusive calendar-date window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AnalysisError> {
        if start > end {
            return Err(AnalysisError::InvalidData(format!(
                "date range start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// The `days`-long window that ends on `end` (start = end - days, saturating
    /// at the earliest representable date).
    pub fn ending_at(end: NaiveDate, days: u32) -> Self {
        Self {
            start: end
                .checked_sub_days(Days::new(u64::from(days)))
                .unwrap_or(NaiveDate::MIN),
            end,
        }
    }

    /// Every date the history can hold.
    pub fn unbounded() -> Self {
        Self {
            start: NaiveDate::MIN,
            end: NaiveDate::MAX,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}
