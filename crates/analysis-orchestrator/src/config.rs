use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Request defaults and cache settings for [`crate::AnalyticsService`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub trend_days: u32,
    pub volatility_days: u32,
    pub correlation_days: u32,
    pub seasonal_days: u32,
    pub dominance_days: u32,
    pub prediction_days: u32,
    /// Instruments included in a correlation matrix when none are requested
    pub correlation_instrument_limit: usize,
    pub strongest_pair_limit: usize,
    /// Minimum history a prediction request must have
    pub prediction_min_points: usize,
    /// Symbols tried, in order, to find the dominance reference instrument
    pub reference_symbols: Vec<String>,
    pub cache_ttl_secs: i64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            trend_days: 90,
            volatility_days: 90,
            correlation_days: 90,
            seasonal_days: 730,
            dominance_days: 365,
            prediction_days: 365,
            correlation_instrument_limit: 15,
            strongest_pair_limit: 20,
            prediction_min_points: crypto_analytics::MOVING_AVERAGE_MIN_POINTS,
            reference_symbols: vec!["BTC".to_string(), "BITCOIN".to_string()],
            cache_ttl_secs: 300,
        }
    }
}

impl ServiceConfig {
    /// Defaults overridden by `CRYPTO_ANALYTICS_*` variables (a `.env` file is read first if present).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let d = Self::default();

        let reference_symbols = std::env::var("CRYPTO_ANALYTICS_REFERENCE_SYMBOLS")
            .ok()
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_uppercase())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|symbols| !symbols.is_empty())
            .unwrap_or(d.reference_symbols);

        Self {
            trend_days: env_or("CRYPTO_ANALYTICS_TREND_DAYS", d.trend_days),
            volatility_days: env_or("CRYPTO_ANALYTICS_VOLATILITY_DAYS", d.volatility_days),
            correlation_days: env_or("CRYPTO_ANALYTICS_CORRELATION_DAYS", d.correlation_days),
            seasonal_days: env_or("CRYPTO_ANALYTICS_SEASONAL_DAYS", d.seasonal_days),
            dominance_days: env_or("CRYPTO_ANALYTICS_DOMINANCE_DAYS", d.dominance_days),
            prediction_days: env_or("CRYPTO_ANALYTICS_PREDICTION_DAYS", d.prediction_days),
            correlation_instrument_limit: env_or(
                "CRYPTO_ANALYTICS_CORRELATION_LIMIT",
                d.correlation_instrument_limit,
            ),
            strongest_pair_limit: env_or("CRYPTO_ANALYTICS_STRONGEST_PAIRS", d.strongest_pair_limit),
            prediction_min_points: env_or("CRYPTO_ANALYTICS_PREDICTION_MIN_POINTS", d.prediction_min_points),
            reference_symbols,
            cache_ttl_secs: env_or("CRYPTO_ANALYTICS_CACHE_TTL_SECS", d.cache_ttl_secs),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Ignoring unparsable {}={:?}, using default", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.seasonal_days, 730);
        assert_eq!(config.prediction_min_points, 200);
        assert_eq!(config.reference_symbols, vec!["BTC", "BITCOIN"]);
    }

    #[test]
    fn test_env_or_parses_and_falls_back() {
        std::env::set_var("CRYPTO_ANALYTICS_TEST_GOOD", " 42 ");
        std::env::set_var("CRYPTO_ANALYTICS_TEST_BAD", "forty-two");

        assert_eq!(env_or("CRYPTO_ANALYTICS_TEST_GOOD", 7u32), 42);
        assert_eq!(env_or("CRYPTO_ANALYTICS_TEST_BAD", 7u32), 7);
        assert_eq!(env_or("CRYPTO_ANALYTICS_TEST_MISSING", 7u32), 7);
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: ServiceConfig = serde_json::from_str(r#"{"trend_days": 30}"#).unwrap();
        assert_eq!(config.trend_days, 30);
        assert_eq!(config.dominance_days, 365);
    }
}
