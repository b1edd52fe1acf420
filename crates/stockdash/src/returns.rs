//! Cumulative relative returns from adjusted closes

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::models::{PriceBar, PriceSeries, ReturnPoint, ReturnSeries};

/// Percent change from `prev` to `curr`; zero when the base is unusable
fn pct_change(prev: f64, curr: f64) -> f64 {
    if prev == 0.0 || !prev.is_finite() || !curr.is_finite() {
        return 0.0;
    }
    curr / prev - 1.0
}

/// Compounded return of each bar relative to the first one.
///
/// `r[0]` is zero and `r[t] = (1 + pct[t]) * (1 + r[t-1]) - 1`.
pub fn cumulative_returns(series: &PriceSeries) -> ReturnSeries {
    let mut points = Vec::with_capacity(series.len());
    let mut growth = 1.0;
    let mut prev: Option<f64> = None;

    for bar in series.bars() {
        let price = bar.adjusted_close;
        if let Some(p) = prev {
            growth *= 1.0 + pct_change(p, price);
        }
        // Gaps carry the last usable price forward
        if price.is_finite() && price != 0.0 {
            prev = Some(price);
        }
        points.push(ReturnPoint {
            date: bar.date,
            cumulative_return: growth - 1.0,
        });
    }

    ReturnSeries {
        ticker: series.ticker().to_string(),
        points,
    }
}

/// Restrict every series to the dates present in all of them
pub fn align(series: &BTreeMap<String, Arc<PriceSeries>>) -> BTreeMap<String, PriceSeries> {
    let mut common: Option<BTreeSet<NaiveDate>> = None;
    for s in series.values() {
        let dates: BTreeSet<_> = s.bars().iter().map(|b| b.date).collect();
        common = Some(match common {
            Some(c) => c.intersection(&dates).copied().collect(),
            None => dates,
        });
    }
    let common = common.unwrap_or_default();

    series
        .iter()
        .map(|(ticker, s)| {
            let bars: Vec<PriceBar> = s
                .bars()
                .iter()
                .filter(|b| common.contains(&b.date))
                .copied()
                .collect();
            (ticker.clone(), PriceSeries::new(ticker.clone(), bars))
        })
        .collect()
}

/// Align the series on common dates, then compute each one's cumulative returns
pub fn cumulative_returns_many(
    series: &BTreeMap<String, Arc<PriceSeries>>,
) -> BTreeMap<String, ReturnSeries> {
    align(series)
        .iter()
        .map(|(ticker, s)| (ticker.clone(), cumulative_returns(s)))
        .collect()
}
