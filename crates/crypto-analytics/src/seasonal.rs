use analysis_core::PricePoint;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

const DAY_NAMES: [&str; 7] = [
    "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
];

/// Descriptive statistics over the daily returns that fell in one bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalStats {
    pub period: String,
    pub average_return: f64,
    pub median_return: f64,
    pub positive_count: usize,
    pub negative_count: usize,
    pub total_count: usize,
    /// Percentage of positive returns (0-100)
    pub win_rate: f64,
}

/// Which calendar grouping a pattern belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeasonalBucket {
    /// 1..=12
    Month(u32),
    /// 1..=4
    Quarter(u32),
    /// 0 = Sunday .. 6 = Saturday
    Weekday(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalPattern {
    pub bucket: SeasonalBucket,
    pub label: String,
    pub stats: SeasonalStats,
}

/// Best and worst bucket by average return
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestWorst {
    pub best: Option<SeasonalPattern>,
    pub worst: Option<SeasonalPattern>,
}

/// Stats for one bucket. The median of an even-sized bucket is the lower of the
/// two middle values; an empty bucket is all zeros.
pub fn seasonal_stats(returns: &[f64], period: &str) -> SeasonalStats {
    if returns.is_empty() {
        return SeasonalStats {
            period: period.to_string(),
            average_return: 0.0,
            median_return: 0.0,
            positive_count: 0,
            negative_count: 0,
            total_count: 0,
            win_rate: 0.0,
        };
    }

    let mut sorted = returns.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = sorted[(sorted.len() - 1) / 2];

    let positive_count = returns.iter().filter(|&&r| r > 0.0).count();
    let negative_count = returns.iter().filter(|&&r| r < 0.0).count();

    SeasonalStats {
        period: period.to_string(),
        average_return: returns.iter().sum::<f64>() / returns.len() as f64,
        median_return: median,
        positive_count,
        negative_count,
        total_count: returns.len(),
        win_rate: positive_count as f64 / returns.len() as f64 * 100.0,
    }
}

/// Daily returns tagged with the date of the later close of each pair.
/// Pairs whose earlier close is not positive are skipped.
fn dated_returns(prices: &[PricePoint]) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
    prices.windows(2).filter_map(|w| {
        let prev = w[0].close;
        if prev > 0.0 {
            Some((w[1].date, (w[1].close - prev) / prev))
        } else {
            None
        }
    })
}

fn bucketed<F>(prices: &[PricePoint], buckets: usize, index_of: F) -> Vec<Vec<f64>>
where
    F: Fn(NaiveDate) -> usize,
{
    let mut grouped = vec![Vec::new(); buckets];
    for (date, r) in dated_returns(prices) {
        grouped[index_of(date)].push(r);
    }
    grouped
}

/// Twelve buckets, January first.
pub fn monthly_patterns(prices: &[PricePoint]) -> Vec<SeasonalPattern> {
    bucketed(prices, 12, |d| d.month0() as usize)
        .into_iter()
        .enumerate()
        .map(|(i, rets)| SeasonalPattern {
            bucket: SeasonalBucket::Month(i as u32 + 1),
            label: MONTH_NAMES[i].to_string(),
            stats: seasonal_stats(&rets, MONTH_NAMES[i]),
        })
        .collect()
}

/// Four buckets, Q1 first.
pub fn quarterly_patterns(prices: &[PricePoint]) -> Vec<SeasonalPattern> {
    bucketed(prices, 4, |d| (d.month0() / 3) as usize)
        .into_iter()
        .enumerate()
        .map(|(i, rets)| {
            let label = format!("Q{}", i + 1);
            SeasonalPattern {
                bucket: SeasonalBucket::Quarter(i as u32 + 1),
                stats: seasonal_stats(&rets, &label),
                label,
            }
        })
        .collect()
}

/// Seven buckets, Sunday first.
pub fn day_of_week_patterns(prices: &[PricePoint]) -> Vec<SeasonalPattern> {
    bucketed(prices, 7, |d| d.weekday().num_days_from_sunday() as usize)
        .into_iter()
        .enumerate()
        .map(|(i, rets)| SeasonalPattern {
            bucket: SeasonalBucket::Weekday(i as u32),
            label: DAY_NAMES[i].to_string(),
            stats: seasonal_stats(&rets, DAY_NAMES[i]),
        })
        .collect()
}

/// Highest and lowest average return. Ties keep input order.
pub fn find_best_worst_periods(patterns: &[SeasonalPattern]) -> BestWorst {
    let mut sorted = patterns.to_vec();
    sorted.sort_by(|a, b| {
        b.stats
            .average_return
            .partial_cmp(&a.stats.average_return)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    BestWorst {
        best: sorted.first().cloned(),
        worst: sorted.last().cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn daily_series(start: NaiveDate, closes: &[f64]) -> Vec<PricePoint> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::from_close(start + Duration::days(i as i64), c))
            .collect()
    }

    #[test]
    fn test_seasonal_stats_empty() {
        let stats = seasonal_stats(&[], "January");
        assert_eq!(stats.total_count, 0);
        assert_eq!(stats.average_return, 0.0);
        assert_eq!(stats.median_return, 0.0);
        assert_eq!(stats.win_rate, 0.0);
    }

    #[test]
    fn test_seasonal_stats_median_takes_lower_middle() {
        let stats = seasonal_stats(&[0.4, 0.1, 0.3, 0.2], "Q1");
        assert_eq!(stats.median_return, 0.2);

        let odd = seasonal_stats(&[0.3, -0.1, 0.2], "Q1");
        assert_eq!(odd.median_return, 0.2);
    }

    #[test]
    fn test_seasonal_stats_counts() {
        let stats = seasonal_stats(&[0.1, -0.2, 0.0, 0.3], "Monday");
        assert_eq!(stats.positive_count, 2);
        assert_eq!(stats.negative_count, 1);
        assert_eq!(stats.total_count, 4);
        assert!((stats.win_rate - 50.0).abs() < 1e-12);
        assert!((stats.average_return - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_return_assigned_to_later_date() {
        // Jan 31 -> Feb 1: the return belongs to February
        let start = NaiveDate::from_ymd_opt(2021, 1, 31).unwrap();
        let prices = daily_series(start, &[100.0, 110.0]);
        let monthly = monthly_patterns(&prices);

        assert_eq!(monthly.len(), 12);
        assert_eq!(monthly[0].stats.total_count, 0);
        assert_eq!(monthly[1].stats.total_count, 1);
        assert!((monthly[1].stats.average_return - 0.1).abs() < 1e-12);
        assert_eq!(monthly[1].bucket, SeasonalBucket::Month(2));
        assert_eq!(monthly[1].label, "February");
    }

    #[test]
    fn test_monthly_counts_sum_to_valid_pairs() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let closes: Vec<f64> = (0..400)
            .map(|i| if i == 50 { 0.0 } else { 100.0 + (i as f64 * 0.7).sin() * 10.0 })
            .collect();
        let prices = daily_series(start, &closes);

        let valid_pairs = prices.windows(2).filter(|w| w[0].close > 0.0).count();
        let monthly = monthly_patterns(&prices);
        let total: usize = monthly.iter().map(|p| p.stats.total_count).sum();
        assert_eq!(total, valid_pairs);
        assert_eq!(total, 398);

        for p in &monthly {
            assert!(p.stats.positive_count + p.stats.negative_count <= p.stats.total_count);
        }
    }

    #[test]
    fn test_quarterly_and_weekday_buckets() {
        // 2021-01-03 is a Sunday
        let start = NaiveDate::from_ymd_opt(2021, 1, 3).unwrap();
        let prices = daily_series(start, &[100.0, 101.0, 102.0]);

        let quarterly = quarterly_patterns(&prices);
        assert_eq!(quarterly.len(), 4);
        assert_eq!(quarterly[0].label, "Q1");
        assert_eq!(quarterly[0].stats.total_count, 2);

        let weekdays = day_of_week_patterns(&prices);
        assert_eq!(weekdays.len(), 7);
        assert_eq!(weekdays[0].label, "Sunday");
        assert_eq!(weekdays[0].stats.total_count, 0);
        assert_eq!(weekdays[1].stats.total_count, 1);
        assert_eq!(weekdays[2].stats.total_count, 1);
        assert_eq!(weekdays[2].bucket, SeasonalBucket::Weekday(2));
    }

    #[test]
    fn test_find_best_worst_periods() {
        assert_eq!(
            find_best_worst_periods(&[]),
            BestWorst { best: None, worst: None }
        );

        let start = NaiveDate::from_ymd_opt(2021, 1, 3).unwrap();
        let prices = daily_series(start, &[100.0, 110.0, 99.0]);
        let weekdays = day_of_week_patterns(&prices);
        let result = find_best_worst_periods(&weekdays);

        assert_eq!(result.best.unwrap().label, "Monday");
        assert_eq!(result.worst.unwrap().label, "Tuesday");
    }
}
