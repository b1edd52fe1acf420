//! Core data types shared by the loader, transformers and pages

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DashError, Result};

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `end < start`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(DashError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Whether `date` falls within the range (both ends inclusive)
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// One daily OHLCV record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adjusted_close: f64,
    pub volume: u64,
}

/// Date-ordered price history for one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series, sorting bars by date and dropping repeated dates
    pub fn new(ticker: impl Into<String>, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Self {
            ticker: ticker.into(),
            bars,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// The last `n` bars (fewer if the series is shorter)
    pub fn tail(&self, n: usize) -> &[PriceBar] {
        &self.bars[self.bars.len().saturating_sub(n)..]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn adjusted_closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.adjusted_close).collect()
    }
}

/// One cumulative return observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub cumulative_return: f64,
}

/// Cumulative relative returns for one ticker; the first value is always zero
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    pub ticker: String,
    pub points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Return over the whole window
    pub fn total_return(&self) -> Option<f64> {
        self.points.last().map(|p| p.cumulative_return)
    }
}

/// A news headline with its link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    pub title: String,
    pub link: String,
}

impl Headline {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{bar, date};
    use super::*;

    #[test]
    fn test_date_range_rejects_reversed() {
        let result = DateRange::new(date(2020, 1, 10), date(2020, 1, 1));
        assert!(matches!(result, Err(DashError::InvalidRange { .. })));
    }

    #[test]
    fn test_date_range_single_day() {
        let range = DateRange::new(date(2020, 1, 2), date(2020, 1, 2)).unwrap();
        assert!(range.contains(date(2020, 1, 2)));
        assert!(!range.contains(date(2020, 1, 3)));
    }

    #[test]
    fn test_series_sorts_and_dedups() {
        let series = PriceSeries::new(
            "AAPL",
            vec![
                bar(date(2020, 1, 3), 3.0),
                bar(date(2020, 1, 2), 2.0),
                bar(date(2020, 1, 3), 9.0),
            ],
        );
        assert_eq!(series.len(), 2);
        assert_eq!(series.first_date(), Some(date(2020, 1, 2)));
        assert_eq!(series.closes(), vec![2.0, 3.0]);
    }

    #[test]
    fn test_tail_shorter_than_series() {
        let series = super::fixtures::series("MSFT", date(2020, 1, 1), &[1.0, 2.0, 3.0]);
        assert_eq!(series.tail(5).len(), 3);
        assert_eq!(series.tail(2)[0].close, 2.0);
    }
}
