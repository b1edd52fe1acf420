//! API clients for market data and news providers

pub mod finnhub;
pub mod yahoo;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::models::PriceBar;

pub use finnhub::{FinnhubClient, FinnhubNewsArticle};
pub use yahoo::YahooFinanceClient;

/// Source of daily price history
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Daily bars for `symbol` with dates in `[start, end_exclusive)`.
    ///
    /// An empty vector means the provider answered but had no rows.
    async fn daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end_exclusive: NaiveDate,
    ) -> Result<Vec<PriceBar>>;

    /// Short provider name for logs
    fn name(&self) -> &'static str;
}
