use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::returns::returns;

/// Trading days per year used to annualize daily figures
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Population standard deviation (divides by N). Empty input gives 0.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.population_std_dev()
}

/// `std_dev(returns) * sqrt(periods_per_year)`
pub fn annualized_volatility(returns: &[f64], periods_per_year: f64) -> f64 {
    std_dev(returns) * periods_per_year.sqrt()
}

/// `std_dev / |mean|`, or 0 when the input is empty or the mean is exactly 0.
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.mean();
    if mean == 0.0 {
        return 0.0;
    }
    std_dev(values) / mean.abs()
}

/// Windowed standard deviation scaled by `annualization_factor`.
///
/// Same shape as [`crate::returns::moving_average`]: `window - 1` leading `NaN`s.
pub fn rolling_volatility(returns: &[f64], window: usize, annualization_factor: f64) -> Vec<f64> {
    if window == 0 {
        return vec![f64::NAN; returns.len()];
    }

    (0..returns.len())
        .map(|i| {
            if i + 1 < window {
                f64::NAN
            } else {
                std_dev(&returns[i + 1 - window..=i]) * annualization_factor
            }
        })
        .collect()
}

/// Default annualization factor for [`rolling_volatility`]: `sqrt(252)`.
pub fn default_annualization_factor() -> f64 {
    TRADING_DAYS_PER_YEAR.sqrt()
}

/// Volatility and return summary for one instrument's closes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilityProfile {
    pub daily: f64,
    pub annualized: f64,
    pub coefficient_of_variation: f64,
    pub mean_return: f64,
    pub min_return: f64,
    pub max_return: f64,
    pub data_points: usize,
}

/// Summarize a close series. `None` when there are fewer than two closes.
pub fn volatility_profile(closes: &[f64]) -> Option<VolatilityProfile> {
    if closes.len() < 2 {
        return None;
    }

    let rets = returns(closes);
    let mean_return = rets.iter().sum::<f64>() / rets.len() as f64;

    Some(VolatilityProfile {
        daily: std_dev(&rets),
        annualized: annualized_volatility(&rets, TRADING_DAYS_PER_YEAR),
        coefficient_of_variation: coefficient_of_variation(&rets),
        mean_return,
        min_return: rets.iter().copied().fold(f64::INFINITY, f64::min),
        max_return: rets.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        data_points: closes.len(),
    })
}
