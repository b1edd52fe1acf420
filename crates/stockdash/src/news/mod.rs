//! News headline sources
//!
//! Three interchangeable strategies share the [`HeadlineSource`] seam:
//! - [`GoogleNewsSearch`]: Google News RSS search for a query string
//! - [`YahooNewsScraper`]: Yahoo Finance stock-market news page, filtered by ticker
//! - [`FinnhubNews`]: Finnhub company news (needs an API key)
//!
//! Headlines keep the order the source returned them in. A query with no
//! matches is an empty vector rather than an error.

pub mod finnhub;
pub mod google;
pub mod yahoo;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::DashConfig;
use crate::error::{DashError, Result};
use crate::models::Headline;

pub use finnhub::FinnhubNews;
pub use google::GoogleNewsSearch;
pub use yahoo::YahooNewsScraper;

/// Anything that can turn a query into headlines
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HeadlineSource: Send + Sync {
    /// Headlines relevant to `query`, in source order
    async fn headlines(&self, query: &str) -> Result<Vec<Headline>>;

    /// General stock-market headlines
    async fn market_headlines(&self) -> Result<Vec<Headline>>;

    /// Human readable source name
    fn name(&self) -> &'static str;
}

/// Which headline strategy a page should use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsSource {
    #[default]
    Google,
    Yahoo,
    Finnhub,
}

impl fmt::Display for NewsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Google => "google",
            Self::Yahoo => "yahoo",
            Self::Finnhub => "finnhub",
        };
        f.write_str(name)
    }
}

impl FromStr for NewsSource {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "google" | "g" => Ok(Self::Google),
            "yahoo" | "y" => Ok(Self::Yahoo),
            "finnhub" | "f" => Ok(Self::Finnhub),
            other => Err(DashError::Config(format!(
                "Unknown news source '{other}' (expected google, yahoo or finnhub)"
            ))),
        }
    }
}

/// HTTP client shared by the page-fetching sources
pub(crate) fn http_client(config: &DashConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.request_timeout)
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| DashError::Config(format!("Failed to build HTTP client: {e}")))
}

/// GET `url` and return the body, mapping transport and status failures to `Fetch`
pub(crate) async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| DashError::Fetch(format!("Failed to load page {url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(DashError::Fetch(format!(
            "Failed to load page {url}. Status code: {status}"
        )));
    }

    response
        .text()
        .await
        .map_err(|e| DashError::Fetch(format!("Failed to read body of {url}: {e}")))
}
