//! Memoisation of fetched price series to avoid repeat provider calls

use cached::{Cached, TimedSizedCache};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::models::{DateRange, PriceSeries};

/// Cache key for one loader request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesKey {
    /// Normalised ticker symbol
    pub ticker: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SeriesKey {
    pub fn new(ticker: impl Into<String>, range: DateRange) -> Self {
        Self {
            ticker: ticker.into(),
            start: range.start,
            end: range.end,
        }
    }
}

/// Shared price-series cache.
///
/// Entries expire after the TTL and the least recently used entry is
/// evicted once `capacity` is reached.
pub struct SeriesCache {
    cache: Arc<RwLock<TimedSizedCache<SeriesKey, Arc<PriceSeries>>>>,
}

impl SeriesCache {
    /// Create a new cache holding at most `capacity` series for `ttl` each
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedSizedCache::with_size_and_lifespan(
                capacity.max(1),
                ttl,
            ))),
        }
    }

    /// Get a series from the cache
    pub async fn get(&self, key: &SeriesKey) -> Option<Arc<PriceSeries>> {
        let mut cache = self.cache.write().await;
        cache.cache_get(key).cloned()
    }

    /// Insert a series into the cache
    pub async fn insert(&self, key: SeriesKey, value: Arc<PriceSeries>) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(key, value);
    }

    /// Get or fetch a series using the provided fetcher function
    ///
    /// If the series is cached it is returned immediately. Otherwise the
    /// fetcher is called and a successful result is cached; errors are not.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: SeriesKey,
        fetcher: F,
    ) -> Result<Arc<PriceSeries>, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<PriceSeries, E>>,
    {
        if let Some(series) = self.get(&key).await {
            tracing::debug!("Cache hit for key: {:?}", key);
            return Ok(series);
        }

        tracing::debug!("Cache miss for key: {:?}", key);

        let series = Arc::new(fetcher().await?);
        self.insert(key, Arc::clone(&series)).await;

        Ok(series)
    }

    /// Get the number of cached entries
    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Clone for SeriesCache {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}
