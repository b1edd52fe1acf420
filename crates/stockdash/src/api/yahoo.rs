//! Yahoo Finance API client

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use time::OffsetDateTime;
use tracing::debug;
use yahoo_finance_api as yahoo;

use super::PriceProvider;
use crate::error::{DashError, Result};
use crate::models::PriceBar;

/// Yahoo Finance API client
#[derive(Debug, Default, Clone)]
pub struct YahooFinanceClient {}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self {}
    }

    fn to_offset(date: NaiveDate) -> Result<OffsetDateTime> {
        let ts = date.and_time(NaiveTime::MIN).and_utc().timestamp();
        OffsetDateTime::from_unix_timestamp(ts)
            .map_err(|e| DashError::Provider(format!("Invalid timestamp for {date}: {e}")))
    }

    /// Map a history request failure; not-found answers mean the symbol has no data
    fn history_error(symbol: &str, err: &yahoo::YahooError) -> DashError {
        let no_data = match err {
            yahoo::YahooError::FetchFailed(status) => status.starts_with("404"),
            yahoo::YahooError::NoResult | yahoo::YahooError::NoQuotes => true,
            _ => false,
        };
        if no_data {
            DashError::unavailable(symbol, format!("no data found, symbol may be delisted ({err})"))
        } else {
            DashError::Provider(err.to_string())
        }
    }

    /// Get historical daily bars for a symbol
    pub async fn get_historical_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end_exclusive: NaiveDate,
    ) -> Result<Vec<PriceBar>> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| DashError::Provider(e.to_string()))?;

        let response = provider
            .get_quote_history(symbol, Self::to_offset(start)?, Self::to_offset(end_exclusive)?)
            .await
            .map_err(|e| Self::history_error(symbol, &e))?;

        // Yahoo answers an empty window with an error rather than an empty list
        let quotes = match response.quotes() {
            Ok(quotes) => quotes,
            Err(e) => {
                debug!(symbol, error = %e, "Yahoo returned no quotes");
                return Ok(Vec::new());
            }
        };

        Ok(quotes
            .iter()
            .filter_map(|q| {
                let date = DateTime::from_timestamp(q.timestamp as i64, 0)?.date_naive();
                Some(PriceBar {
                    date,
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                    adjusted_close: q.adjclose,
                    volume: q.volume,
                })
            })
            .collect())
    }
}

#[async_trait]
impl PriceProvider for YahooFinanceClient {
    async fn daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end_exclusive: NaiveDate,
    ) -> Result<Vec<PriceBar>> {
        self.get_historical_bars(symbol, start, end_exclusive).await
    }

    fn name(&self) -> &'static str {
        "yahoo"
    }
}
