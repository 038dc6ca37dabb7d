use analysis_core::PricePoint;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::returns::percentage_change;

/// Start-to-end movement of one instrument over a window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_price: f64,
    pub end_price: f64,
    pub percent_change: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub data_points: usize,
}

/// Summarize a price series; the input does not need to be sorted.
pub fn trend_summary(points: &[PricePoint]) -> Option<TrendSummary> {
    let first = points.iter().min_by_key(|p| p.date)?;
    let last = points.iter().max_by_key(|p| p.date)?;

    let closes = points.iter().map(|p| p.close);
    let high_price = closes.clone().fold(f64::NEG_INFINITY, f64::max);
    let low_price = closes.fold(f64::INFINITY, f64::min);

    Some(TrendSummary {
        start_date: first.date,
        end_date: last.date,
        start_price: first.close,
        end_price: last.close,
        percent_change: percentage_change(first.close, last.close),
        high_price,
        low_price,
        data_points: points.len(),
    })
}
