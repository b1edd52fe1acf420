//! Error types for dashboard operations

use chrono::NaiveDate;
use thiserror::Error;

/// Dashboard specific errors
#[derive(Debug, Error)]
pub enum DashError {
    /// Requested date range ends before it starts
    #[error("Invalid date range: end {end} is before start {start}")]
    InvalidRange {
        start: NaiveDate,
        end: NaiveDate,
    },

    /// Malformed ticker symbol provided
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Provider returned no rows for the symbol and range
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
    },

    /// Market data client failed before any rows could be read
    #[error("Market data provider error: {0}")]
    Provider(String),

    /// Forecast backend rejected the input
    #[error("Model fit failed: {0}")]
    ModelFit(String),

    /// News page or service unreachable, non-success status, or unparseable
    #[error("Fetch failed: {0}")]
    Fetch(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Interactive command could not be parsed
    #[error("Command error: {0}")]
    Command(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl DashError {
    /// Shorthand for [`DashError::DataUnavailable`]
    pub fn unavailable(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashError>;

/// Convert anyhow::Error to DashError
impl From<anyhow::Error> for DashError {
    fn from(err: anyhow::Error) -> Self {
        DashError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DashError::InvalidSymbol("??".to_string());
        assert_eq!(err.to_string(), "Invalid symbol: ??");

        let err = DashError::unavailable("AAPL", "No data found");
        assert_eq!(err.to_string(), "Data not available for AAPL: No data found");
    }

    #[test]
    fn test_invalid_range_display() {
        let err = DashError::InvalidRange {
            start: NaiveDate::from_ymd_opt(2020, 1, 10).unwrap(),
            end: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid date range: end 2020-01-01 is before start 2020-01-10"
        );
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: DashError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, DashError::Other(msg) if msg == "boom"));
    }
}
