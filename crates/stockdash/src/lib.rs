//! Terminal stock dashboard
//!
//! This crate turns a ticker selection into dashboard pages:
//!
//! - Historical daily prices from Yahoo Finance, memoised per (ticker, range)
//! - Cumulative relative returns for comparing several tickers
//! - Price forecasts from two interchangeable in-crate backends
//!   (trend/seasonality decomposition and a small neural network)
//! - News headlines from Google News, Yahoo Finance or Finnhub
//! - Chart payloads and plain-text rendering for the terminal
//!
//! # Architecture
//!
//! Every page action runs `selection -> fetch -> transform/forecast -> render`:
//! - [`DataLoader`]: fetches [`PriceSeries`] through a [`api::PriceProvider`]
//! - [`returns`]: derives [`ReturnSeries`] from adjusted closes
//! - [`ForecastAdapter`]: fits a [`ModelKind`] backend and predicts a horizon
//! - [`news`]: the [`news::HeadlineSource`] strategies
//! - [`StockDash`]: the pages, each returning a [`PageView`]
//!
//! # Example
//!
//! ```rust,ignore
//! use stockdash::{DashConfig, PredictRequest, StockDash, view};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let app = StockDash::new(DashConfig::default().with_env_api_keys())?;
//!
//!     let page = app.predict(&PredictRequest::new("AAPL")).await;
//!     println!("{}", view::render(&page));
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod chart;
pub mod command;
pub mod config;
pub mod error;
pub mod forecast;
pub mod loader;
pub mod models;
pub mod news;
pub mod pages;
pub mod returns;
pub mod tickers;
pub mod view;

// Re-export main types for convenience
pub use command::Command;
pub use config::DashConfig;
pub use error::{DashError, Result};
pub use forecast::{ForecastAdapter, ForecastOutput, ModelKind};
pub use loader::DataLoader;
pub use models::{DateRange, Headline, PriceBar, PriceSeries, ReturnSeries};
pub use news::NewsSource;
pub use pages::{DashboardRequest, NewsRequest, PredictRequest, StockDash, VisualizeRequest};
pub use view::{PageView, Section};
