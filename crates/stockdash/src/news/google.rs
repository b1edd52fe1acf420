//! Google News RSS search

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{HeadlineSource, fetch_text, http_client};
use crate::config::DashConfig;
use crate::error::{DashError, Result};
use crate::models::Headline;

/// Query used for general market headlines
pub const MARKET_QUERY: &str = "stock market";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
}

/// Parse an RSS 2.0 document into headlines, skipping items without a title
pub fn parse_feed(xml: &str) -> Result<Vec<Headline>> {
    let rss: Rss = quick_xml::de::from_str(xml)
        .map_err(|e| DashError::Fetch(format!("Malformed RSS feed: {e}")))?;

    Ok(rss
        .channel
        .items
        .into_iter()
        .filter(|item| !item.title.trim().is_empty())
        .map(|item| Headline::new(item.title.trim(), item.link.trim()))
        .collect())
}

/// Headline lookup through the Google News RSS search endpoint
pub struct GoogleNewsSearch {
    client: Client,
    base_url: String,
    language: String,
}

impl GoogleNewsSearch {
    pub fn new(config: &DashConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config)?,
            base_url: config.google_news_url.clone(),
            language: config.news_language.clone(),
        })
    }

    /// Search URL for `query`
    pub fn search_url(&self, query: &str) -> Result<Url> {
        let ceid = format!("US:{}", self.language);
        Url::parse_with_params(&self.base_url, &[
            ("q", query),
            ("hl", self.language.as_str()),
            ("gl", "US"),
            ("ceid", ceid.as_str()),
        ])
        .map_err(|e| DashError::Config(format!("Invalid Google News URL: {e}")))
    }

    /// Headlines for `query`
    pub async fn search(&self, query: &str) -> Result<Vec<Headline>> {
        let url = self.search_url(query)?;
        let body = fetch_text(&self.client, url.as_str()).await?;
        let headlines = parse_feed(&body)?;
        debug!(query, count = headlines.len(), "Google News search complete");
        Ok(headlines)
    }
}

#[async_trait]
impl HeadlineSource for GoogleNewsSearch {
    async fn headlines(&self, query: &str) -> Result<Vec<Headline>> {
        self.search(query).await
    }

    async fn market_headlines(&self) -> Result<Vec<Headline>> {
        self.search(MARKET_QUERY).await
    }

    fn name(&self) -> &'static str {
        "Google News"
    }
}
