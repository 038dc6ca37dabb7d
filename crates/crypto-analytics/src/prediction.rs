use analysis_core::{AnalysisError, PricePoint};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::returns::{moving_average, percentage_change};

/// Points needed for the 50/200 moving-average method
pub const MOVING_AVERAGE_MIN_POINTS: usize = 200;
/// Points needed for the regression method
pub const REGRESSION_MIN_POINTS: usize = 30;
/// Regression is fit over at most this many trailing points
pub const REGRESSION_WINDOW: usize = 60;
/// Default regression horizon when called on its own
pub const DEFAULT_REGRESSION_HORIZON: usize = 7;
/// Days forecast by the moving-average and ensemble methods
pub const FORECAST_HORIZON: usize = 30;
/// The forecast day used for the headline change
pub const HEADLINE_DAY: usize = 7;

const SHORT_SMA: usize = 50;
const LONG_SMA: usize = 200;
const ENSEMBLE_MA_WEIGHT: f64 = 0.6;
const ENSEMBLE_LR_WEIGHT: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

/// Coarse confidence attached to a forecast point by how far ahead it is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionMethod {
    #[serde(rename = "Moving Average Momentum")]
    MovingAverageMomentum,
    #[serde(rename = "Linear Regression")]
    LinearRegression,
    #[serde(rename = "Ensemble (MA + Linear Regression)")]
    Ensemble,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionPoint {
    pub date: NaiveDate,
    /// Never negative
    pub predicted_price: f64,
    pub confidence: Confidence,
    pub method: PredictionMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub predictions: Vec<PredictionPoint>,
    pub current_price: f64,
    /// Headline prediction minus the current price
    pub predicted_change: f64,
    pub predicted_change_percent: f64,
    pub trend: Trend,
    pub signals: Vec<String>,
}

impl PredictionResult {
    /// Forecast for `day` days ahead (1-based).
    pub fn day(&self, day: usize) -> Option<&PredictionPoint> {
        day.checked_sub(1).and_then(|i| self.predictions.get(i))
    }
}

fn require_points(prices: &[PricePoint], required: usize) -> Result<(), AnalysisError> {
    if prices.len() < required {
        return Err(AnalysisError::InsufficientData {
            required,
            actual: prices.len(),
        });
    }
    Ok(())
}

fn forecast_date(last: NaiveDate, days_ahead: usize) -> Result<NaiveDate, AnalysisError> {
    last.checked_add_days(Days::new(days_ahead as u64))
        .ok_or_else(|| AnalysisError::InvalidData(format!("forecast date overflows after {}", last)))
}

/// Headline change against the forecast for [`HEADLINE_DAY`], or the last
/// forecast point when the horizon is shorter.
fn headline(predictions: &[PredictionPoint], current_price: f64) -> (f64, f64) {
    let future = predictions
        .get(HEADLINE_DAY - 1)
        .or_else(|| predictions.last())
        .map(|p| p.predicted_price)
        .unwrap_or(current_price);
    (future - current_price, percentage_change(current_price, future))
}

/// Momentum damping and confidence for the moving-average forecast
fn momentum_weight(days_ahead: usize) -> (f64, Confidence) {
    match days_ahead {
        0..=7 => (0.8, Confidence::High),
        8..=14 => (0.5, Confidence::Medium),
        _ => (0.3, Confidence::Low),
    }
}

fn regression_confidence(days_ahead: usize) -> Confidence {
    match days_ahead {
        0..=3 => Confidence::High,
        4..=7 => Confidence::Medium,
        _ => Confidence::Low,
    }
}

/// 50/200-day moving-average crossover with momentum extrapolation.
///
/// Needs at least [`MOVING_AVERAGE_MIN_POINTS`] points, sorted ascending by date.
pub fn predict_with_moving_averages(prices: &[PricePoint]) -> Result<PredictionResult, AnalysisError> {
    require_points(prices, MOVING_AVERAGE_MIN_POINTS)?;

    let closes: Vec<f64> = prices.iter().map(|p| p.close).collect();
    let last = &prices[prices.len() - 1];
    let current_price = last.close;

    let sma_short = moving_average(&closes, SHORT_SMA);
    let sma_long = moving_average(&closes, LONG_SMA);
    let n = closes.len();
    let (cur_short, prev_short) = (sma_short[n - 1], sma_short[n - 2]);
    let (cur_long, prev_long) = (sma_long[n - 1], sma_long[n - 2]);

    // NaN on either side (long average not yet full on the previous day) compares false
    let mut signals = Vec::new();
    let trend = if cur_short > cur_long && prev_short <= prev_long {
        signals.push("Golden Cross detected - Strong bullish signal".to_string());
        Trend::Bullish
    } else if cur_short < cur_long && prev_short >= prev_long {
        signals.push("Death Cross detected - Strong bearish signal".to_string());
        Trend::Bearish
    } else if cur_short > cur_long {
        signals.push("Price above both moving averages - Bullish trend".to_string());
        Trend::Bullish
    } else if cur_short < cur_long {
        signals.push("Price below both moving averages - Bearish trend".to_string());
        Trend::Bearish
    } else {
        Trend::Neutral
    };

    let momentum = cur_short - prev_short;

    let predictions = (1..=FORECAST_HORIZON)
        .map(|days_ahead| {
            let (weight, confidence) = momentum_weight(days_ahead);
            let predicted = current_price + momentum * days_ahead as f64 * weight;
            Ok(PredictionPoint {
                date: forecast_date(last.date, days_ahead)?,
                predicted_price: predicted.max(0.0),
                confidence,
                method: PredictionMethod::MovingAverageMomentum,
            })
        })
        .collect::<Result<Vec<_>, AnalysisError>>()?;

    let (predicted_change, predicted_change_percent) = headline(&predictions, current_price);

    Ok(PredictionResult {
        predictions,
        current_price,
        predicted_change,
        predicted_change_percent,
        trend,
        signals,
    })
}

/// Least-squares line through the trailing [`REGRESSION_WINDOW`] closes,
/// extrapolated `days_ahead` days.
///
/// Needs at least [`REGRESSION_MIN_POINTS`] points, sorted ascending by date.
pub fn predict_with_linear_regression(
    prices: &[PricePoint],
    days_ahead: usize,
) -> Result<PredictionResult, AnalysisError> {
    require_points(prices, REGRESSION_MIN_POINTS)?;

    let recent = &prices[prices.len().saturating_sub(REGRESSION_WINDOW)..];
    let last = &recent[recent.len() - 1];
    let current_price = last.close;

    let n = recent.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);
    for (i, p) in recent.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += p.close;
        sum_xy += x * p.close;
        sum_x2 += x * x;
    }

    // n >= 30 distinct x values, so the denominator is positive
    let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_x2 - sum_x * sum_x);
    let intercept = (sum_y - slope * sum_x) / n;

    let predictions = (1..=days_ahead)
        .map(|day| {
            let x = n + day as f64 - 1.0;
            Ok(PredictionPoint {
                date: forecast_date(last.date, day)?,
                predicted_price: (slope * x + intercept).max(0.0),
                confidence: regression_confidence(day),
                method: PredictionMethod::LinearRegression,
            })
        })
        .collect::<Result<Vec<_>, AnalysisError>>()?;

    let (predicted_change, predicted_change_percent) = headline(&predictions, current_price);

    let (trend, signal) = if slope > 0.0 {
        (Trend::Bullish, format!("Positive trend detected (slope: {:.4})", slope))
    } else if slope < 0.0 {
        (Trend::Bearish, format!("Negative trend detected (slope: {:.4})", slope))
    } else {
        (Trend::Neutral, "Sideways trend detected".to_string())
    };

    Ok(PredictionResult {
        predictions,
        current_price,
        predicted_change,
        predicted_change_percent,
        trend,
        signals: vec![signal],
    })
}

/// 60/40 blend of the moving-average and regression forecasts over
/// [`FORECAST_HORIZON`] days.
///
/// When the series is too short for the moving-average method the result is
/// the plain regression forecast over the same horizon. Any other failure is
/// returned as is.
pub fn predict_with_ensemble(prices: &[PricePoint]) -> Result<PredictionResult, AnalysisError> {
    let ma = match predict_with_moving_averages(prices) {
        Ok(ma) => ma,
        Err(AnalysisError::InsufficientData { required, actual }) => {
            tracing::debug!(
                "Moving-average forecast needs {} points, have {}; using regression only",
                required,
                actual
            );
            return predict_with_linear_regression(prices, FORECAST_HORIZON);
        }
        Err(e) => return Err(e),
    };
    let lr = predict_with_linear_regression(prices, FORECAST_HORIZON)?;

    let predictions: Vec<PredictionPoint> = ma
        .predictions
        .iter()
        .zip(lr.predictions.iter())
        .map(|(m, l)| PredictionPoint {
            date: m.date,
            predicted_price: m.predicted_price * ENSEMBLE_MA_WEIGHT + l.predicted_price * ENSEMBLE_LR_WEIGHT,
            confidence: m.confidence,
            method: PredictionMethod::Ensemble,
        })
        .collect();

    let current_price = ma.current_price;
    let (predicted_change, predicted_change_percent) = headline(&predictions, current_price);

    let mut signals = ma.signals;
    signals.extend(lr.signals);

    let trend = if ma.trend == lr.trend {
        ma.trend
    } else {
        signals.push("Mixed signals - Neutral stance recommended".to_string());
        Trend::Neutral
    };

    Ok(PredictionResult {
        predictions,
        current_price,
        predicted_change,
        predicted_change_percent,
        trend,
        signals,
    })
}
