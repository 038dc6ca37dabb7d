use analysis_core::AnalysisError;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};

/// Cached report with the time it was stored
struct CacheEntry {
    data: serde_json::Value,
    cached_at: DateTime<Utc>,
}

/// Computed reports keyed by analysis type, instruments and period, held as JSON.
pub struct ReportCache {
    entries: DashMap<String, CacheEntry>,
    ttl_secs: i64,
}

impl ReportCache {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl_secs,
        }
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        (now - entry.cached_at).num_seconds() < self.ttl_secs
    }

    /// Fresh entry for `key`, if one exists and still deserializes as `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entry = self.entries.get(key)?;
        if !self.is_fresh(&entry, Utc::now()) {
            return None;
        }
        match serde_json::from_value(entry.data.clone()) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Discarding cached {}: {}", key, e);
                None
            }
        }
    }

    pub fn put<T: Serialize>(&self, key: String, value: &T) -> Result<(), AnalysisError> {
        let data = serde_json::to_value(value)?;
        self.entries.insert(
            key,
            CacheEntry {
                data,
                cached_at: Utc::now(),
            },
        );
        Ok(())
    }

    /// Drop stale entries, returning how many were removed.
    pub fn evict_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| (now - entry.cached_at).num_seconds() < self.ttl_secs);
        before - self.entries.len()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
