//! Finnhub news API client

use crate::error::{DashError, Result};
use chrono::NaiveDate;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const DEFAULT_RATE: NonZeroU32 = NonZeroU32::new(60).unwrap();
const BASE_URL: &str = "https://finnhub.io/api/v1";

/// Finnhub news article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinnhubNewsArticle {
    /// Article category
    #[serde(default)]
    pub category: String,
    /// Publish time (UNIX timestamp)
    #[serde(default)]
    pub datetime: i64,
    /// News headline
    pub headline: String,
    /// Related symbols
    #[serde(default)]
    pub related: String,
    /// News source
    #[serde(default)]
    pub source: String,
    /// Article URL
    pub url: String,
}

/// Finnhub client for the news API
pub struct FinnhubClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
}

impl FinnhubClient {
    /// Create a new Finnhub client with rate limiting
    ///
    /// # Arguments
    /// * `api_key` - Finnhub API key
    /// * `rate_limit` - Requests per minute (free tier: 60)
    /// * `timeout` - Per-request timeout
    pub fn new(api_key: impl Into<String>, rate_limit: u32, timeout: Duration) -> Result<Self> {
        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(DEFAULT_RATE));
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Get company news for a symbol between two dates (inclusive)
    pub async fn get_company_news(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<FinnhubNewsArticle>> {
        let url = format!(
            "{}/company-news?symbol={symbol}&from={from}&to={to}&token={}",
            self.base_url, self.api_key
        );
        self.fetch(&url).await
    }

    /// Get general market news
    ///
    /// # Arguments
    /// * `category` - News category (general, forex, crypto, merger)
    pub async fn get_market_news(&self, category: &str) -> Result<Vec<FinnhubNewsArticle>> {
        let url = format!(
            "{}/news?category={category}&token={}",
            self.base_url, self.api_key
        );
        self.fetch(&url).await
    }

    async fn fetch(&self, url: &str) -> Result<Vec<FinnhubNewsArticle>> {
        self.rate_limiter.until_ready().await;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DashError::Fetch(format!("Finnhub request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DashError::Fetch(format!("Finnhub API error {status}: {body}")));
        }

        response
            .json::<Vec<FinnhubNewsArticle>>()
            .await
            .map_err(|e| DashError::Fetch(format!("Failed to parse Finnhub response: {e}")))
    }
}
