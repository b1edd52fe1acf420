//! Finnhub company news as a headline source

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};

use super::HeadlineSource;
use crate::api::{FinnhubClient, FinnhubNewsArticle};
use crate::config::DashConfig;
use crate::error::Result;
use crate::models::Headline;

/// How far back company news is requested
pub const LOOKBACK_DAYS: i64 = 7;

fn to_headlines(articles: Vec<FinnhubNewsArticle>) -> Vec<Headline> {
    articles
        .into_iter()
        .filter(|a| !a.headline.trim().is_empty())
        .map(|a| Headline::new(a.headline.trim(), a.url))
        .collect()
}

/// Company news for the last [`LOOKBACK_DAYS`] days
pub struct FinnhubNews {
    client: FinnhubClient,
}

impl FinnhubNews {
    /// `None` when no Finnhub API key is configured
    pub fn from_config(config: &DashConfig) -> Result<Option<Self>> {
        let Some(key) = config.finnhub_api_key.as_deref() else {
            return Ok(None);
        };
        let client = FinnhubClient::new(key, config.finnhub_rate_limit, config.request_timeout)?;
        Ok(Some(Self { client }))
    }

    pub async fn company_news(&self, ticker: &str, today: NaiveDate) -> Result<Vec<Headline>> {
        let from = today - Duration::days(LOOKBACK_DAYS);
        let articles = self.client.get_company_news(ticker, from, today).await?;
        Ok(to_headlines(articles))
    }

    /// General market headlines
    pub async fn market_news(&self) -> Result<Vec<Headline>> {
        Ok(to_headlines(self.client.get_market_news("general").await?))
    }
}

#[async_trait]
impl HeadlineSource for FinnhubNews {
    async fn headlines(&self, query: &str) -> Result<Vec<Headline>> {
        self.company_news(query, Utc::now().date_naive()).await
    }

    async fn market_headlines(&self) -> Result<Vec<Headline>> {
        self.market_news().await
    }

    fn name(&self) -> &'static str {
        "Finnhub"
    }
}
