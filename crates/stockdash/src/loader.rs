//! Historical price loading with memoisation

use chrono::Duration;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::{PriceProvider, YahooFinanceClient};
use crate::cache::{SeriesCache, SeriesKey};
use crate::config::DashConfig;
use crate::error::{DashError, Result};
use crate::models::{DateRange, PriceSeries};
use crate::tickers;

/// Fetches daily price series through a [`PriceProvider`] and caches them
#[derive(Clone)]
pub struct DataLoader {
    provider: Arc<dyn PriceProvider>,
    cache: SeriesCache,
}

impl DataLoader {
    /// Loader backed by Yahoo Finance
    pub fn new(config: &DashConfig) -> Self {
        Self::with_provider(Arc::new(YahooFinanceClient::new()), config)
    }

    pub fn with_provider(provider: Arc<dyn PriceProvider>, config: &DashConfig) -> Self {
        Self {
            provider,
            cache: SeriesCache::new(config.cache_capacity, config.cache_ttl),
        }
    }

    pub fn cache(&self) -> &SeriesCache {
        &self.cache
    }

    /// Load `ticker` between `range.start` and `range.end`, both inclusive
    pub async fn load(&self, ticker: &str, range: DateRange) -> Result<Arc<PriceSeries>> {
        let symbol = tickers::normalize(ticker)?;
        let key = SeriesKey::new(symbol.clone(), range);

        self.cache
            .get_or_fetch(key, || self.fetch(symbol, range))
            .await
    }

    /// Load several tickers, one provider call per uncached ticker
    pub async fn load_many<S: AsRef<str>>(
        &self,
        symbols: &[S],
        range: DateRange,
    ) -> Result<BTreeMap<String, Arc<PriceSeries>>> {
        let mut out = BTreeMap::new();
        for symbol in symbols {
            let series = self.load(symbol.as_ref(), range).await?;
            out.insert(series.ticker().to_string(), series);
        }
        Ok(out)
    }

    async fn fetch(&self, symbol: String, range: DateRange) -> Result<PriceSeries> {
        let end_exclusive = range.end + Duration::days(1);
        info!(
            symbol = %symbol,
            range = %range,
            provider = self.provider.name(),
            "Fetching price history"
        );

        let bars: Vec<_> = self
            .provider
            .daily_bars(&symbol, range.start, end_exclusive)
            .await?
            .into_iter()
            .filter(|b| range.contains(b.date))
            .collect();

        if bars.is_empty() {
            return Err(DashError::unavailable(
                symbol,
                format!("no rows between {} and {}", range.start, range.end),
            ));
        }

        debug!(symbol = %symbol, rows = bars.len(), "Price history fetched");
        Ok(PriceSeries::new(symbol, bars))
    }
}
