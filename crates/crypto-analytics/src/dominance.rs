use analysis_core::{PricePoint, PriceRow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::alignment::index_by_date;

/// Share-point threshold the late-vs-early average must move to count as a trend
const TREND_THRESHOLD: f64 = 2.0;

/// Reference instrument's slice of total market cap on one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DominancePoint {
    pub date: NaiveDate,
    pub dominant_market_cap: f64,
    pub total_market_cap: f64,
    /// `dominant / total * 100`
    pub dominant_share: f64,
    pub remainder_market_cap: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DominanceTrend {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DominanceStats {
    pub current: f64,
    pub average: f64,
    pub max: f64,
    pub min: f64,
    pub trend: DominanceTrend,
}

/// Dominance series for `reference` against everything in `all_rows`.
///
/// For every reference date, market caps of all instruments on that date are
/// summed (a missing cap counts as 0). Dates with no rows or a zero total are
/// skipped. The result is ascending by date.
pub fn dominance_series(reference: &[PricePoint], all_rows: &[PriceRow]) -> Vec<DominancePoint> {
    let by_date = index_by_date(all_rows);

    let mut series: Vec<DominancePoint> = reference
        .iter()
        .filter_map(|point| {
            let rows = by_date.get(&point.date)?;
            let total: f64 = rows.iter().map(|r| r.point.market_cap.unwrap_or(0.0)).sum();
            if total == 0.0 {
                return None;
            }
            let dominant = point.market_cap.unwrap_or(0.0);
            Some(DominancePoint {
                date: point.date,
                dominant_market_cap: dominant,
                total_market_cap: total,
                dominant_share: dominant / total * 100.0,
                remainder_market_cap: total - dominant,
            })
        })
        .collect();

    series.sort_by_key(|p| p.date);
    series
}

/// Summary of a dominance series.
///
/// Trend compares the mean share of the first and last `ceil(10%)` points
/// (at least one each).
pub fn dominance_stats(series: &[DominancePoint]) -> DominanceStats {
    if series.is_empty() {
        return DominanceStats {
            current: 0.0,
            average: 0.0,
            max: 0.0,
            min: 0.0,
            trend: DominanceTrend::Stable,
        };
    }

    let shares: Vec<f64> = series.iter().map(|p| p.dominant_share).collect();
    let n = shares.len();

    let sample = ((n as f64 * 0.1).ceil() as usize).max(1);
    let first_avg = shares[..sample].iter().sum::<f64>() / sample as f64;
    let last_avg = shares[n - sample..].iter().sum::<f64>() / sample as f64;

    let trend = if last_avg - first_avg > TREND_THRESHOLD {
        DominanceTrend::Increasing
    } else if last_avg - first_avg < -TREND_THRESHOLD {
        DominanceTrend::Decreasing
    } else {
        DominanceTrend::Stable
    };

    DominanceStats {
        current: shares[n - 1],
        average: shares.iter().sum::<f64>() / n as f64,
        max: shares.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        min: shares.iter().copied().fold(f64::INFINITY, f64::min),
        trend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::Instrument;
    use chrono::Duration;

    fn day(i: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, 1).unwrap() + Duration::days(i)
    }

    fn row(inst: &Instrument, i: i64, cap: Option<f64>) -> PriceRow {
        let mut point = PricePoint::from_close(day(i), 1.0);
        point.market_cap = cap;
        PriceRow::new(inst.clone(), point)
    }

    fn point_at(series: &[DominancePoint], share: f64) -> DominancePoint {
        DominancePoint {
            date: day(series.len() as i64),
            dominant_market_cap: share,
            total_market_cap: 100.0,
            dominant_share: share,
            remainder_market_cap: 100.0 - share,
        }
    }

    fn shares_series(shares: &[f64]) -> Vec<DominancePoint> {
        let mut series = Vec::new();
        for &s in shares {
            let p = point_at(&series, s);
            series.push(p);
        }
        series
    }

    #[test]
    fn test_dominance_series_basic() {
        let btc = Instrument::new(1, "BTC", "Bitcoin");
        let eth = Instrument::new(2, "ETH", "Ethereum");
        let rows = vec![
            row(&btc, 0, Some(60.0)),
            row(&eth, 0, Some(40.0)),
            row(&btc, 1, Some(75.0)),
            row(&eth, 1, Some(25.0)),
        ];
        let reference: Vec<PricePoint> = rows
            .iter()
            .filter(|r| r.instrument.id == 1)
            .map(|r| r.point.clone())
            .collect();

        let series = dominance_series(&reference, &rows);
        assert_eq!(series.len(), 2);
        assert!((series[0].dominant_share - 60.0).abs() < 1e-12);
        assert!((series[1].dominant_share - 75.0).abs() < 1e-12);
        assert!((series[1].remainder_market_cap - 25.0).abs() < 1e-12);
        assert_eq!(series[1].total_market_cap, 100.0);
    }

    #[test]
    fn test_dominance_skips_missing_and_zero_total_dates() {
        let btc = Instrument::new(1, "BTC", "Bitcoin");
        let eth = Instrument::new(2, "ETH", "Ethereum");
        let rows = vec![row(&btc, 0, None), row(&eth, 0, None), row(&btc, 2, Some(10.0))];
        let reference = vec![
            PricePoint::from_close(day(0), 1.0),
            PricePoint::from_close(day(1), 1.0).with_market_cap(5.0),
            PricePoint::from_close(day(2), 1.0).with_market_cap(10.0),
        ];

        let series = dominance_series(&reference, &rows);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].date, day(2));
        assert!((series[0].dominant_share - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_dominance_output_sorted_and_bounded() {
        let btc = Instrument::new(1, "BTC", "Bitcoin");
        let eth = Instrument::new(2, "ETH", "Ethereum");
        let mut rows = Vec::new();
        let mut reference = Vec::new();
        for i in (0..10).rev() {
            rows.push(row(&btc, i, Some(50.0 + i as f64)));
            rows.push(row(&eth, i, Some(30.0)));
            reference.push(PricePoint::from_close(day(i), 1.0).with_market_cap(50.0 + i as f64));
        }

        let series = dominance_series(&reference, &rows);
        assert_eq!(series.len(), 10);
        assert!(series.windows(2).all(|w| w[0].date < w[1].date));
        assert!(series.iter().all(|p| (0.0..=100.0).contains(&p.dominant_share)));
    }

    #[test]
    fn test_dominance_stats_empty() {
        let stats = dominance_stats(&[]);
        assert_eq!(stats.current, 0.0);
        assert_eq!(stats.average, 0.0);
        assert_eq!(stats.trend, DominanceTrend::Stable);
    }

    #[test]
    fn test_dominance_stats_trend() {
        let rising = shares_series(&[40.0, 41.0, 42.0, 43.0, 44.0, 45.0, 46.0, 47.0, 48.0, 49.0, 50.0]);
        let stats = dominance_stats(&rising);
        // 11 points -> slices of 2
        assert_eq!(stats.trend, DominanceTrend::Increasing);
        assert_eq!(stats.current, 50.0);
        assert_eq!(stats.max, 50.0);
        assert_eq!(stats.min, 40.0);
        assert!((stats.average - 45.0).abs() < 1e-12);

        let falling = shares_series(&[50.0, 49.0, 47.0]);
        assert_eq!(dominance_stats(&falling).trend, DominanceTrend::Decreasing);

        let flat = shares_series(&[50.0, 51.0, 51.5]);
        assert_eq!(dominance_stats(&flat).trend, DominanceTrend::Stable);
    }
}
