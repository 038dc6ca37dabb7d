//! Report-level analytics over stored price history.
//!
//! [`AnalyticsService`] resolves the reporting window from the repository,
//! runs the `crypto-analytics` engines and caches finished reports.

use std::collections::HashSet;
use std::sync::Arc;

use analysis_core::{AnalysisError, Instrument, PriceHistoryRepository};
use crypto_analytics::{
    aligned_returns, correlation_matrix, day_of_week_patterns, dominance_series, dominance_stats,
    find_best_worst_periods, group_by_instrument, monthly_patterns, predict_with_ensemble,
    quarterly_patterns, strongest_correlations, trend_summary, volatility_profile,
};
use serde::{de::DeserializeOwned, Serialize};

pub mod cache;
pub mod config;
pub mod memory;
pub mod reports;

pub use cache::ReportCache;
pub use config::ServiceConfig;
pub use memory::InMemoryRepository;
pub use reports::*;


pub struct AnalyticsService<R> {
    repository: Arc<R>,
    config: ServiceConfig,
    cache: ReportCache,
}

fn cache_key(kind: &str, ids: &[i64], period: &ReportPeriod) -> String {
    format!(
        "{}:{:?}:{}:{}:{}",
        kind, ids, period.days, period.start_date, period.end_date
    )
}

fn describe_ids(ids: &[i64]) -> String {
    if ids.is_empty() {
        "all instruments".to_string()
    } else {
        format!("instruments {:?}", ids)
    }
}

impl<R: PriceHistoryRepository> AnalyticsService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_config(repository, ServiceConfig::default())
    }

    pub fn with_config(repository: Arc<R>, config: ServiceConfig) -> Self {
        let cache = ReportCache::new(config.cache_ttl_secs);
        Self {
            repository,
            config,
            cache,
        }
    }

    /// Number of reports currently held, fresh or not.
    pub fn cached_reports(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::info!("Cleared analytics report cache");
    }

    /// Drop reports older than the configured TTL.
    pub fn evict_expired(&self) -> usize {
        let removed = self.cache.evict_expired();
        if removed > 0 {
            tracing::info!("Evicted {} expired analytics reports", removed);
        }
        removed
    }

    fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let hit = self.cache.get(key);
        if hit.is_some() {
            tracing::debug!("Cache hit for {}", key);
        }
        hit
    }

    fn store<T: Serialize>(&self, key: String, report: &T) {
        if let Err(e) = self.cache.put(key, report) {
            tracing::warn!("Failed to cache report: {}", e);
        }
    }

    async fn instrument(&self, id: i64) -> Result<Instrument, AnalysisError> {
        self.repository
            .instrument_by_id(id)
            .await?
            .ok_or_else(|| AnalysisError::NotFound(format!("instrument {}", id)))
    }

    /// Requested ids in first-seen order without repeats, each checked to exist.
    /// `None` stays empty, which selects every instrument.
    async fn resolve_ids(&self, ids: Option<&[i64]>) -> Result<Vec<i64>, AnalysisError> {
        let Some(ids) = ids else {
            return Ok(Vec::new());
        };
        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(ids.len());
        for &id in ids {
            if seen.insert(id) {
                self.instrument(id).await?;
                resolved.push(id);
            }
        }
        Ok(resolved)
    }

    /// First configured reference symbol the repository knows.
    async fn reference_instrument(&self) -> Result<Instrument, AnalysisError> {
        for symbol in &self.config.reference_symbols {
            if let Some(instrument) = self.repository.instrument_by_symbol(symbol).await? {
                return Ok(instrument);
            }
        }
        Err(AnalysisError::NotFound(format!(
            "reference instrument ({})",
            self.config.reference_symbols.join(", ")
        )))
    }

    /// Window of `days` ending on the latest stored date for `ids`.
    async fn period_for(&self, ids: &[i64], days: u32) -> Result<ReportPeriod, AnalysisError> {
        let end = self
            .repository
            .latest_date(ids)
            .await?
            .ok_or_else(|| AnalysisError::NoData(format!("no price history for {}", describe_ids(ids))))?;
        Ok(ReportPeriod::ending_at(end, days))
    }

    /// Trend summary and series per instrument. `None` selects every instrument.
    pub async fn trends(&self, ids: Option<&[i64]>, days: Option<u32>) -> Result<TrendReport, AnalysisError> {
        let ids = self.resolve_ids(ids).await?;
        let ids = ids.as_slice();
        let days = days.unwrap_or(self.config.trend_days);
        let period = self.period_for(ids, days).await?;

        let key = cache_key("trends", ids, &period);
        if let Some(report) = self.cached(&key) {
            return Ok(report);
        }

        tracing::info!("Computing trends for {} over {} days", describe_ids(ids), days);
        let rows = self.repository.fetch_price_rows(ids, period.range()).await?;

        let trends = group_by_instrument(&rows)
            .into_iter()
            .filter_map(|series| {
                let summary = trend_summary(&series.points)?;
                Some(InstrumentTrend {
                    instrument: series.instrument,
                    summary,
                    data: series.points,
                })
            })
            .collect();

        let report = TrendReport { trends, period };
        self.store(key, &report);
        Ok(report)
    }

    /// Volatility profile per instrument, most volatile first.
    pub async fn volatility(
        &self,
        ids: Option<&[i64]>,
        days: Option<u32>,
    ) -> Result<VolatilityReport, AnalysisError> {
        let ids = self.resolve_ids(ids).await?;
        let ids = ids.as_slice();
        let days = days.unwrap_or(self.config.volatility_days);
        let period = self.period_for(ids, days).await?;

        let key = cache_key("volatility", ids, &period);
        if let Some(report) = self.cached(&key) {
            return Ok(report);
        }

        tracing::info!("Computing volatility for {} over {} days", describe_ids(ids), days);
        let rows = self.repository.fetch_price_rows(ids, period.range()).await?;

        let mut instruments: Vec<InstrumentVolatility> = group_by_instrument(&rows)
            .into_iter()
            .filter_map(|series| match volatility_profile(&series.closes()) {
                Some(volatility) => Some(InstrumentVolatility {
                    instrument: series.instrument,
                    volatility,
                }),
                None => {
                    tracing::debug!("Skipping {}: fewer than two closes", series.instrument.symbol);
                    None
                }
            })
            .collect();

        instruments.sort_by(|a, b| {
            b.volatility
                .annualized
                .partial_cmp(&a.volatility.annualized)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let report = VolatilityReport { instruments, period };
        self.store(key, &report);
        Ok(report)
    }

    /// Return correlations between instruments and their strongest pairs.
    ///
    /// Without explicit ids the first `correlation_instrument_limit`
    /// instruments (by name) are used.
    pub async fn correlations(
        &self,
        ids: Option<&[i64]>,
        days: Option<u32>,
    ) -> Result<CorrelationReport, AnalysisError> {
        let ids: Vec<i64> = match ids {
            Some(_) => self.resolve_ids(ids).await?,
            None => self
                .repository
                .list_instruments()
                .await?
                .into_iter()
                .take(self.config.correlation_instrument_limit)
                .map(|i| i.id)
                .collect(),
        };
        if ids.is_empty() {
            return Err(AnalysisError::NoData("no instruments to correlate".to_string()));
        }

        let days = days.unwrap_or(self.config.correlation_days);
        let period = self.period_for(&ids, days).await?;

        let key = cache_key("correlations", &ids, &period);
        if let Some(report) = self.cached(&key) {
            return Ok(report);
        }

        tracing::info!("Computing correlations for {} instruments over {} days", ids.len(), days);
        let rows = self.repository.fetch_price_rows(&ids, period.range()).await?;

        let aligned = aligned_returns(&rows, &ids);
        let instruments: Vec<Instrument> = aligned.iter().map(|(i, _)| i.clone()).collect();
        let series: Vec<(i64, Vec<f64>)> = aligned.into_iter().map(|(i, r)| (i.id, r)).collect();

        let matrix = correlation_matrix(&series);
        let by_id = |id: i64| instruments.iter().find(|i| i.id == id).cloned();
        let strongest = strongest_correlations(&matrix, self.config.strongest_pair_limit)
            .into_iter()
            .filter_map(|pair| {
                Some(StrongCorrelation {
                    first: by_id(pair.pair.0)?,
                    second: by_id(pair.pair.1)?,
                    correlation: pair.correlation,
                })
            })
            .collect();

        let report = CorrelationReport {
            instruments,
            matrix,
            strongest,
            period,
        };
        self.store(key, &report);
        Ok(report)
    }

    pub async fn seasonal(&self, id: i64, days: Option<u32>) -> Result<SeasonalReport, AnalysisError> {
        let instrument = self.instrument(id).await?;
        let days = days.unwrap_or(self.config.seasonal_days);
        let period = self.period_for(&[id], days).await?;

        let key = cache_key("seasonal", &[id], &period);
        if let Some(report) = self.cached(&key) {
            return Ok(report);
        }

        tracing::info!("Computing seasonal patterns for {} over {} days", instrument.symbol, days);
        let prices = self.repository.fetch_price_history(id, period.range()).await?;
        if prices.is_empty() {
            return Err(AnalysisError::NoData(format!("no price history for {}", instrument.symbol)));
        }

        let monthly = monthly_patterns(&prices);
        let quarterly = quarterly_patterns(&prices);
        let day_of_week = day_of_week_patterns(&prices);
        let insights = SeasonalInsights {
            monthly: find_best_worst_periods(&monthly),
            quarterly: find_best_worst_periods(&quarterly),
            day_of_week: find_best_worst_periods(&day_of_week),
        };

        let report = SeasonalReport {
            instrument,
            period,
            monthly,
            quarterly,
            day_of_week,
            insights,
        };
        self.store(key, &report);
        Ok(report)
    }

    /// Market-cap share of the reference instrument over the window.
    pub async fn dominance(&self, days: Option<u32>) -> Result<DominanceReport, AnalysisError> {
        let reference = self.reference_instrument().await?;
        let days = days.unwrap_or(self.config.dominance_days);
        let period = self.period_for(&[reference.id], days).await?;

        let key = cache_key("dominance", &[reference.id], &period);
        if let Some(report) = self.cached(&key) {
            return Ok(report);
        }

        tracing::info!("Computing {} dominance over {} days", reference.symbol, days);
        let range = period.range();
        let (reference_history, all_rows) = tokio::join!(
            self.repository.fetch_price_history(reference.id, range),
            self.repository.fetch_price_rows(&[], range),
        );
        let reference_history = reference_history?;
        let all_rows = all_rows?;

        let dominance = dominance_series(&reference_history, &all_rows);
        if dominance.is_empty() {
            tracing::warn!("No market cap data to compute {} dominance", reference.symbol);
        }
        let stats = dominance_stats(&dominance);

        let report = DominanceReport {
            reference,
            dominance,
            stats,
            period,
        };
        self.store(key, &report);
        Ok(report)
    }

    /// Ensemble forecast for one instrument, refused below `prediction_min_points`.
    pub async fn predictions(&self, id: i64, days: Option<u32>) -> Result<PredictionReport, AnalysisError> {
        let instrument = self.instrument(id).await?;
        let days = days.unwrap_or(self.config.prediction_days);
        let period = self.period_for(&[id], days).await?;

        let key = cache_key("predictions", &[id], &period);
        if let Some(report) = self.cached(&key) {
            return Ok(report);
        }

        let prices = self.repository.fetch_price_history(id, period.range()).await?;
        if prices.len() < self.config.prediction_min_points {
            tracing::warn!(
                "Insufficient history to predict {}: {} of {} points",
                instrument.symbol,
                prices.len(),
                self.config.prediction_min_points
            );
            return Err(AnalysisError::InsufficientData {
                required: self.config.prediction_min_points,
                actual: prices.len(),
            });
        }

        tracing::info!("Running ensemble prediction for {} with {} points", instrument.symbol, prices.len());
        let prediction = predict_with_ensemble(&prices)?;

        let report = PredictionReport {
            instrument,
            period,
            prediction,
            disclaimer: PREDICTION_DISCLAIMER.to_string(),
        };
        self.store(key, &report);
        Ok(report)
    }
}
