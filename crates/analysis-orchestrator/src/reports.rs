use analysis_core::{DateRange, Instrument, PricePoint};
use chrono::NaiveDate;
use crypto_analytics::{
    BestWorst, CorrelationMatrix, DominancePoint, DominanceStats, PredictionResult,
    SeasonalPattern, TrendSummary, VolatilityProfile,
};
use serde::{Deserialize, Serialize};

pub const PREDICTION_DISCLAIMER: &str = "These predictions are based on historical data and technical analysis. \
They should not be considered as financial advice. Cryptocurrency markets are highly volatile and unpredictable. \
Always do your own research and consult with financial advisors before making investment decisions.";

/// Window a report was computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPeriod {
    pub days: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ReportPeriod {
    pub fn ending_at(end: NaiveDate, days: u32) -> Self {
        let range = DateRange::ending_at(end, days);
        Self {
            days,
            start_date: range.start,
            end_date: range.end,
        }
    }

    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentTrend {
    pub instrument: Instrument,
    pub summary: TrendSummary,
    pub data: Vec<PricePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    pub trends: Vec<InstrumentTrend>,
    pub period: ReportPeriod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentVolatility {
    pub instrument: Instrument,
    pub volatility: VolatilityProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilityReport {
    /// Most volatile first
    pub instruments: Vec<InstrumentVolatility>,
    pub period: ReportPeriod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrongCorrelation {
    pub first: Instrument,
    pub second: Instrument,
    pub correlation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationReport {
    pub instruments: Vec<Instrument>,
    /// Keyed by instrument id
    pub matrix: CorrelationMatrix<i64>,
    pub strongest: Vec<StrongCorrelation>,
    pub period: ReportPeriod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalInsights {
    pub monthly: BestWorst,
    pub quarterly: BestWorst,
    pub day_of_week: BestWorst,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalReport {
    pub instrument: Instrument,
    pub period: ReportPeriod,
    pub monthly: Vec<SeasonalPattern>,
    pub quarterly: Vec<SeasonalPattern>,
    pub day_of_week: Vec<SeasonalPattern>,
    pub insights: SeasonalInsights,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DominanceReport {
    pub reference: Instrument,
    pub dominance: Vec<DominancePoint>,
    pub stats: DominanceStats,
    pub period: ReportPeriod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionReport {
    pub instrument: Instrument,
    pub period: ReportPeriod,
    pub prediction: PredictionResult,
    pub disclaimer: String,
}
