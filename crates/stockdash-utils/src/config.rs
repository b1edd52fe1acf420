//! Application-level configuration

use serde::{Deserialize, Serialize};

/// Environment variable selecting the deployment environment
pub const ENVIRONMENT_ENV: &str = "STOCKDASH_ENV";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,
    /// Environment (development, production, ...)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "stockdash".to_string(),
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Defaults overridden by `STOCKDASH_ENV`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(env) = std::env::var(ENVIRONMENT_ENV) {
            if !env.trim().is_empty() {
                config.environment = env.trim().to_string();
            }
        }
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Default log filter for this environment
    pub fn default_log_filter(&self) -> &'static str {
        if self.is_production() {
            "warn,stockdash=info"
        } else {
            "info"
        }
    }
}
