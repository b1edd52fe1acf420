//! Configuration for dashboard operations

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{DashError, Result};
use crate::forecast::{DecompositionConfig, ModelKind, NeuralConfig};

/// Environment variable holding the optional Finnhub API key
pub const FINNHUB_API_KEY_ENV: &str = "FINNHUB_API_KEY";

/// Configuration for dashboard operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashConfig {
    /// How long a fetched price series stays cached
    pub cache_ttl: Duration,

    /// Maximum number of cached price series
    pub cache_capacity: usize,

    /// Request timeout duration for news sources
    pub request_timeout: Duration,

    /// User agent sent to news sources
    pub user_agent: String,

    /// Default start of the date range selectors
    pub default_start: NaiveDate,

    /// Google News RSS search endpoint
    pub google_news_url: String,

    /// Language for news search results
    pub news_language: String,

    /// Yahoo Finance stock-market news listing page
    pub yahoo_news_url: String,

    /// Base for relative links found on Yahoo Finance pages
    pub yahoo_base_url: String,

    /// Backend used when the prediction page does not choose one
    pub default_model: ModelKind,

    /// Decomposition backend settings
    pub decomposition: DecompositionConfig,

    /// Neural backend settings
    pub neural: NeuralConfig,

    /// Finnhub API key (optional)
    pub finnhub_api_key: Option<String>,

    /// Finnhub requests per minute
    pub finnhub_rate_limit: u32,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(900),
            cache_capacity: 64,
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("stockdash/", env!("CARGO_PKG_VERSION")).to_string(),
            default_start: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap_or_default(),
            google_news_url: "https://news.google.com/rss/search".to_string(),
            news_language: "en".to_string(),
            yahoo_news_url: "https://finance.yahoo.com/topic/stock-market-news/".to_string(),
            yahoo_base_url: "https://finance.yahoo.com".to_string(),
            default_model: ModelKind::Decomposition,
            decomposition: DecompositionConfig::default(),
            neural: NeuralConfig::default(),
            finnhub_api_key: None,
            finnhub_rate_limit: 60,
        }
    }
}

impl DashConfig {
    /// Create a new configuration builder
    pub fn builder() -> DashConfigBuilder {
        DashConfigBuilder::default()
    }

    /// Load optional API keys from environment
    pub fn with_env_api_keys(mut self) -> Self {
        if let Ok(key) = std::env::var(FINNHUB_API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.finnhub_api_key = Some(key);
            }
        }
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            return Err(DashError::Config(
                "cache_capacity must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(DashError::Config(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if self.finnhub_rate_limit == 0 {
            return Err(DashError::Config(
                "finnhub_rate_limit must be greater than 0".to_string(),
            ));
        }

        for (name, width) in [
            ("decomposition", self.decomposition.interval_width),
            ("neural", self.neural.interval_width),
        ] {
            if width.is_nan() || width <= 0.0 || width >= 1.0 {
                return Err(DashError::Config(format!(
                    "{name} interval_width must be in (0, 1), got {width}"
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.decomposition.changepoint_range) {
            return Err(DashError::Config(
                "changepoint_range must be in [0, 1]".to_string(),
            ));
        }

        if self.neural.hidden_units == 0 || self.neural.epochs == 0 {
            return Err(DashError::Config(
                "neural hidden_units and epochs must be greater than 0".to_string(),
            ));
        }

        if self.neural.learning_rate.is_nan() || self.neural.learning_rate <= 0.0 {
            return Err(DashError::Config(
                "neural learning_rate must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for DashConfig
#[derive(Debug, Default)]
pub struct DashConfigBuilder {
    cache_ttl: Option<Duration>,
    cache_capacity: Option<usize>,
    request_timeout: Option<Duration>,
    user_agent: Option<String>,
    default_start: Option<NaiveDate>,
    google_news_url: Option<String>,
    yahoo_news_url: Option<String>,
    default_model: Option<ModelKind>,
    decomposition: Option<DecompositionConfig>,
    neural: Option<NeuralConfig>,
    finnhub_api_key: Option<String>,
    finnhub_rate_limit: Option<u32>,
}

impl DashConfigBuilder {
    /// Set cache TTL for price series
    pub fn cache_ttl(mut self, duration: Duration) -> Self {
        self.cache_ttl = Some(duration);
        self
    }

    /// Set the number of price series kept in the cache
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set the default start date for range selectors
    pub fn default_start(mut self, date: NaiveDate) -> Self {
        self.default_start = Some(date);
        self
    }

    pub fn google_news_url(mut self, url: impl Into<String>) -> Self {
        self.google_news_url = Some(url.into());
        self
    }

    pub fn yahoo_news_url(mut self, url: impl Into<String>) -> Self {
        self.yahoo_news_url = Some(url.into());
        self
    }

    /// Set the default forecast backend
    pub fn default_model(mut self, model: ModelKind) -> Self {
        self.default_model = Some(model);
        self
    }

    pub fn decomposition(mut self, config: DecompositionConfig) -> Self {
        self.decomposition = Some(config);
        self
    }

    pub fn neural(mut self, config: NeuralConfig) -> Self {
        self.neural = Some(config);
        self
    }

    /// Set Finnhub API key
    pub fn finnhub_api_key(mut self, key: impl Into<String>) -> Self {
        self.finnhub_api_key = Some(key.into());
        self
    }

    pub fn finnhub_rate_limit(mut self, per_minute: u32) -> Self {
        self.finnhub_rate_limit = Some(per_minute);
        self
    }

    /// Load optional API keys from environment
    pub fn with_env_api_keys(mut self) -> Self {
        if let Ok(key) = std::env::var(FINNHUB_API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.finnhub_api_key = Some(key);
            }
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<DashConfig> {
        let defaults = DashConfig::default();

        let config = DashConfig {
            cache_ttl: self.cache_ttl.unwrap_or(defaults.cache_ttl),
            cache_capacity: self.cache_capacity.unwrap_or(defaults.cache_capacity),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
            default_start: self.default_start.unwrap_or(defaults.default_start),
            google_news_url: self.google_news_url.unwrap_or(defaults.google_news_url),
            news_language: defaults.news_language,
            yahoo_news_url: self.yahoo_news_url.unwrap_or(defaults.yahoo_news_url),
            yahoo_base_url: defaults.yahoo_base_url,
            default_model: self.default_model.unwrap_or(defaults.default_model),
            decomposition: self.decomposition.unwrap_or(defaults.decomposition),
            neural: self.neural.unwrap_or(defaults.neural),
            finnhub_api_key: self.finnhub_api_key,
            finnhub_rate_limit: self.finnhub_rate_limit.unwrap_or(defaults.finnhub_rate_limit),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DashConfig::default();
        assert_eq!(config.cache_capacity, 64);
        assert_eq!(config.default_model, ModelKind::Decomposition);
        assert_eq!(
            config.default_start,
            NaiveDate::from_ymd_opt(2010, 1, 1).unwrap()
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = DashConfig::builder()
            .cache_capacity(4)
            .default_model(ModelKind::Neural)
            .request_timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(config.cache_capacity, 4);
        assert_eq!(config.default_model, ModelKind::Neural);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_validation_zero_capacity() {
        let result = DashConfig::builder().cache_capacity(0).build();
        assert!(matches!(result, Err(DashError::Config(_))));
    }

    #[test]
    fn test_validation_interval_width() {
        let config = DashConfig {
            neural: NeuralConfig {
                interval_width: 1.5,
                ..NeuralConfig::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serializes() {
        let config = DashConfig::builder().finnhub_api_key("abc").build().unwrap();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["finnhub_api_key"], "abc");
        assert_eq!(json["default_model"], "decomposition");
        assert_eq!(json["neural"]["seasonality"]["weekly"], "disabled");
    }
}
