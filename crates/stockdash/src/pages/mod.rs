//! Page actions: selection in, [`PageView`] out
//!
//! Each page is an async method on [`StockDash`] taking an explicit request.
//! Errors never escape a page; they are logged and shown as a warning
//! section so the user can change the selection and retry.

mod dashboard;
mod home;
mod news;
mod predict;
mod visualize;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

use crate::config::DashConfig;
use crate::error::{DashError, Result};
use crate::forecast::{ForecastAdapter, ModelKind};
use crate::loader::DataLoader;
use crate::models::{DateRange, PriceBar};
use crate::news::{
    FinnhubNews, GoogleNewsSearch, HeadlineSource, NewsSource, YahooNewsScraper,
};
use crate::view::PageView;

pub use home::FEATURES;

/// Rows shown in raw-data and forecast tail tables
pub const DEFAULT_TAIL_ROWS: usize = 5;

fn default_rows() -> usize {
    DEFAULT_TAIL_ROWS
}

fn default_years() -> u32 {
    1
}

/// Visualization page selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizeRequest {
    pub ticker: String,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
    #[serde(default = "default_rows")]
    pub rows: usize,
    /// Simple moving average overlays
    #[serde(default)]
    pub sma: Vec<usize>,
}

impl VisualizeRequest {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            start: None,
            end: None,
            rows: DEFAULT_TAIL_ROWS,
            sma: Vec::new(),
        }
    }
}

/// Prediction page selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub ticker: String,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
    /// Years of prediction, 0 to 4
    #[serde(default = "default_years")]
    pub years: u32,
    /// Backend; the configured default when unset
    #[serde(default)]
    pub model: Option<ModelKind>,
    #[serde(default = "default_rows")]
    pub rows: usize,
}

impl PredictRequest {
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            start: None,
            end: None,
            years: default_years(),
            model: None,
            rows: DEFAULT_TAIL_ROWS,
        }
    }
}

/// News page selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsRequest {
    pub ticker: String,
    #[serde(default)]
    pub source: NewsSource,
}

/// Returns dashboard selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardRequest {
    pub tickers: Vec<String>,
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

/// The dashboard application: shared loader, forecast backends and news sources
pub struct StockDash {
    config: DashConfig,
    loader: DataLoader,
    forecaster: ForecastAdapter,
    news: HashMap<NewsSource, Arc<dyn HeadlineSource>>,
}

impl StockDash {
    /// Build with live Yahoo Finance data and every news source the config enables
    pub fn new(config: DashConfig) -> Result<Self> {
        config.validate()?;
        let loader = DataLoader::new(&config);

        let mut news: HashMap<NewsSource, Arc<dyn HeadlineSource>> = HashMap::new();
        news.insert(NewsSource::Google, Arc::new(GoogleNewsSearch::new(&config)?));
        news.insert(NewsSource::Yahoo, Arc::new(YahooNewsScraper::new(&config)?));
        if let Some(finnhub) = FinnhubNews::from_config(&config)? {
            news.insert(NewsSource::Finnhub, Arc::new(finnhub));
        }

        Ok(Self::with_parts(config, loader, news))
    }

    /// Build from explicit parts
    pub fn with_parts(
        config: DashConfig,
        loader: DataLoader,
        news: HashMap<NewsSource, Arc<dyn HeadlineSource>>,
    ) -> Self {
        let forecaster = ForecastAdapter::new(&config);
        Self {
            config,
            loader,
            forecaster,
            news,
        }
    }

    pub fn config(&self) -> &DashConfig {
        &self.config
    }

    pub fn loader(&self) -> &DataLoader {
        &self.loader
    }

    /// News sources that can be queried
    pub fn news_sources(&self) -> Vec<NewsSource> {
        let mut sources: Vec<_> = self.news.keys().copied().collect();
        sources.sort_by_key(|s| s.to_string());
        sources
    }

    /// Resolve optional selector dates against the configured defaults
    fn range(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<DateRange> {
        DateRange::new(
            start.unwrap_or(self.config.default_start),
            end.unwrap_or_else(|| Utc::now().date_naive()),
        )
    }

    fn source(&self, source: NewsSource) -> Result<&Arc<dyn HeadlineSource>> {
        self.news.get(&source).ok_or_else(|| {
            DashError::Config(format!(
                "News source '{source}' is not available (Finnhub needs {})",
                crate::config::FINNHUB_API_KEY_ENV
            ))
        })
    }
}

/// Record `err` as a page warning
fn warn_page(page: &mut PageView, action: &str, err: &DashError) {
    warn!(page = %page.title, action, error = %err, "Page action failed");
    page.warning(err.to_string());
}

fn fmt_price(v: f64) -> String {
    format!("{v:.2}")
}

/// Tail table of raw OHLCV rows
fn raw_data_table(bars: &[PriceBar]) -> (Vec<String>, Vec<Vec<String>>) {
    let headers = ["Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"]
        .iter()
        .map(ToString::to_string)
        .collect();
    let rows = bars
        .iter()
        .map(|b| {
            vec![
                b.date.to_string(),
                fmt_price(b.open),
                fmt_price(b.high),
                fmt_price(b.low),
                fmt_price(b.close),
                fmt_price(b.adjusted_close),
                b.volume.to_string(),
            ]
        })
        .collect();
    (headers, rows)
}
