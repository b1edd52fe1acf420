//! The ticker universe offered by every page selector

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{DashError, Result};

/// Large-cap US tickers, in display order
pub const DEFAULT_TICKERS: &[&str] = &[
    "AAPL", "MSFT", "AMZN", "GOOGL", "GOOG", "FB", "BRK.B", "JNJ", "NVDA", "JPM", "UNH", "V", "PG",
    "HD", "MA", "PFE", "BAC", "DIS", "VZ", "KO", "NFLX", "INTC", "MRK", "CSCO", "T", "CMCSA", "CVX",
    "XOM", "PEP", "ABT", "ADBE", "WMT", "NKE", "PYPL", "TMO", "CRM", "ORCL", "MCD", "MDT", "COST",
    "AXP", "LLY", "BMY", "QCOM", "DHR", "TXN", "UNP", "UPS", "LIN", "SBUX", "HON", "AVGO", "AMGN",
    "CAT", "AMT", "GILD", "GS", "SCHW", "BKNG", "MS", "ISRG", "SPGI", "ZTS", "INTU", "FIS", "USB",
    "RTX", "DE", "C", "BLK", "PLD", "MMM", "IBM", "NOW", "SYK", "CB", "MO", "EL", "BA", "ADP", "CI",
    "CL", "SO", "MRNA", "LMT", "TGT", "ADI", "GE", "ABBV", "WFC", "CVS", "LRCX", "WM", "PGR", "EW",
    "ITW", "CME", "NEE", "AON", "FISV", "TRV",
];

/// Exchange symbols, index symbols (`^GSPC`) and futures/FX suffixes (`ES=F`)
static SYMBOL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z0-9^][A-Z0-9.\-=]{0,11}$").expect("ticker pattern is a valid regex")
});

/// Trim and upper-case a user supplied symbol, rejecting malformed input
pub fn normalize(symbol: &str) -> Result<String> {
    let symbol = symbol.trim().to_uppercase();
    if SYMBOL_PATTERN.is_match(&symbol) {
        Ok(symbol)
    } else {
        Err(DashError::InvalidSymbol(symbol))
    }
}
