//! Chart payloads for price, return and forecast views

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ta::Next;
use ta::indicators::SimpleMovingAverage;
use tracing::warn;

use crate::forecast::{ForecastComponents, ForecastOutput, ForecastPoint};
use crate::models::{PriceBar, PriceSeries, ReturnSeries};

/// One (date, value) sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A named line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<ChartPoint>,
}

impl LineSeries {
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// OHLCV candle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartMetadata {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub data_points: usize,
}

/// Everything a front end needs to draw one chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub title: String,
    pub y_label: String,
    pub series: Vec<LineSeries>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candles: Vec<Candle>,
    pub metadata: ChartMetadata,
}

impl ChartData {
    fn new(title: impl Into<String>, y_label: impl Into<String>, series: Vec<LineSeries>) -> Self {
        let metadata = metadata_for(&series);
        Self {
            title: title.into(),
            y_label: y_label.into(),
            series,
            candles: Vec::new(),
            metadata,
        }
    }

    /// Line by name
    pub fn line(&self, name: &str) -> Option<&LineSeries> {
        self.series.iter().find(|s| s.name == name)
    }
}

fn metadata_for(series: &[LineSeries]) -> ChartMetadata {
    let points = || series.iter().flat_map(|s| s.points.iter());
    let finite = || points().map(|p| p.value).filter(|v| v.is_finite());

    ChartMetadata {
        start_date: points().map(|p| p.date).min(),
        end_date: points().map(|p| p.date).max(),
        min_value: finite().reduce(f64::min),
        max_value: finite().reduce(f64::max),
        data_points: series.iter().map(|s| s.points.len()).max().unwrap_or(0),
    }
}

fn sma_line(series: &PriceSeries, period: usize) -> Option<LineSeries> {
    if period == 0 || period > series.len() {
        warn!(period, points = series.len(), "Skipping SMA overlay");
        return None;
    }
    let mut sma = SimpleMovingAverage::new(period).ok()?;
    let points = series
        .bars()
        .iter()
        .map(|b| ChartPoint {
            date: b.date,
            value: sma.next(b.close),
        })
        .collect();
    Some(LineSeries {
        name: format!("SMA_{period}"),
        points,
    })
}

fn price_line(series: &PriceSeries, name: &str, f: impl Fn(&PriceBar) -> f64) -> LineSeries {
    LineSeries {
        name: name.to_string(),
        points: series
            .bars()
            .iter()
            .map(|b| ChartPoint {
                date: b.date,
                value: f(b),
            })
            .collect(),
    }
}

/// Open and close lines, candles, plus one SMA overlay per requested period
pub fn price_chart(series: &PriceSeries, sma_periods: &[usize]) -> ChartData {
    let mut lines = vec![
        price_line(series, "Open", |b| b.open),
        price_line(series, "Close", |b| b.close),
    ];
    lines.extend(sma_periods.iter().filter_map(|&p| sma_line(series, p)));

    let mut chart = ChartData::new(
        format!("{} time series data", series.ticker()),
        "Price",
        lines,
    );
    chart.candles = series
        .bars()
        .iter()
        .map(|b| Candle {
            date: b.date,
            open: b.open,
            high: b.high,
            low: b.low,
            close: b.close,
            volume: b.volume,
        })
        .collect();
    chart
}

/// One cumulative-return line per ticker
pub fn returns_chart(returns: &[ReturnSeries]) -> ChartData {
    let lines = returns
        .iter()
        .map(|r| LineSeries {
            name: r.ticker.clone(),
            points: r
                .points
                .iter()
                .map(|p| ChartPoint {
                    date: p.date,
                    value: p.cumulative_return,
                })
                .collect(),
        })
        .collect();

    let tickers: Vec<_> = returns.iter().map(|r| r.ticker.as_str()).collect();
    ChartData::new(
        format!("Returns for stocks: {}", tickers.join(", ")),
        "Cumulative return",
        lines,
    )
}

fn forecast_line(
    output: &ForecastOutput,
    name: &str,
    f: impl Fn(&ForecastPoint) -> Option<f64>,
) -> LineSeries {
    LineSeries {
        name: name.to_string(),
        points: output
            .points
            .iter()
            .filter_map(|p| f(p).map(|value| ChartPoint { date: p.date, value }))
            .collect(),
    }
}

/// Observed closes, predictions and the uncertainty band
pub fn forecast_chart(output: &ForecastOutput) -> ChartData {
    let lines = vec![
        forecast_line(output, "Actual", |p| p.actual),
        forecast_line(output, "Predicted", |p| Some(p.predicted)),
        forecast_line(output, "Lower", |p| Some(p.lower)),
        forecast_line(output, "Upper", |p| Some(p.upper)),
    ];

    ChartData::new(
        format!(
            "{} forecast ({}, {} days ahead)",
            output.ticker, output.model, output.horizon_days
        ),
        "Close",
        lines,
    )
}

fn component_line(components: &ForecastComponents, name: &str, values: &[f64]) -> LineSeries {
    LineSeries {
        name: name.to_string(),
        points: components
            .dates
            .iter()
            .zip(values)
            .map(|(&date, &value)| ChartPoint { date, value })
            .collect(),
    }
}

/// Trend line plus one line per seasonal part
pub fn components_chart(output: &ForecastOutput) -> ChartData {
    let components = &output.components;
    let mut lines = vec![component_line(components, "Trend", &components.trend)];
    lines.extend(
        components
            .seasonal
            .iter()
            .map(|part| component_line(components, &part.name, &part.values)),
    );

    ChartData::new(
        format!("{} forecast components ({})", output.ticker, output.model),
        "Contribution",
        lines,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashConfig;
    use crate::forecast::{ForecastAdapter, ModelKind};
    use crate::models::fixtures::{date, series};
    use crate::returns::cumulative_returns;

    #[test]
    fn test_price_chart_lines_and_metadata() {
        let s = series("AAPL", date(2020, 1, 1), &[10.0, 12.0, 11.0, 15.0]);
        let chart = price_chart(&s, &[2]);

        assert_eq!(chart.series.len(), 3);
        assert_eq!(chart.candles.len(), 4);
        assert_eq!(chart.metadata.data_points, 4);
        assert_eq!(chart.metadata.start_date, Some(date(2020, 1, 1)));
        assert_eq!(chart.metadata.end_date, Some(date(2020, 1, 4)));
        assert_eq!(chart.metadata.max_value, Some(15.0));

        let sma = chart.line("SMA_2").unwrap();
        assert_eq!(sma.values()[1], 11.0);
        assert_eq!(sma.values()[3], 13.0);
    }

    #[test]
    fn test_price_chart_skips_oversized_sma() {
        let s = series("AAPL", date(2020, 1, 1), &[1.0, 2.0]);
        let chart = price_chart(&s, &[0, 50]);
        assert_eq!(chart.series.len(), 2);
    }

    #[test]
    fn test_returns_chart_one_line_per_ticker() {
        let a = cumulative_returns(&series("A", date(2020, 1, 1), &[1.0, 2.0]));
        let b = cumulative_returns(&series("B", date(2020, 1, 1), &[4.0, 2.0]));
        let chart = returns_chart(&[a, b]);

        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.line("A").unwrap().values(), vec![0.0, 1.0]);
        assert_eq!(chart.line("B").unwrap().values(), vec![0.0, -0.5]);
        assert_eq!(chart.metadata.min_value, Some(-0.5));
    }

    #[test]
    fn test_forecast_chart_actual_only_in_sample() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + f64::from(i)).collect();
        let s = series("AAPL", date(2020, 1, 1), &closes);
        let output = ForecastAdapter::new(&DashConfig::default())
            .forecast(&s, 5, ModelKind::Decomposition)
            .unwrap();
        let chart = forecast_chart(&output);

        assert_eq!(chart.line("Actual").unwrap().points.len(), 30);
        assert_eq!(chart.line("Predicted").unwrap().points.len(), 35);
        assert_eq!(chart.metadata.end_date, Some(date(2020, 2, 4)));
    }

    #[test]
    fn test_components_chart_lines() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + f64::from(i)).collect();
        let s = series("AAPL", date(2020, 1, 1), &closes);
        let output = ForecastAdapter::new(&DashConfig::default())
            .forecast(&s, 5, ModelKind::Neural)
            .unwrap();
        let chart = components_chart(&output);

        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.line("Trend").unwrap().points.len(), 35);
        assert_eq!(
            chart.line("seasonal").unwrap().values(),
            output.components.seasonal[0].values
        );
    }

    #[test]
    fn test_chart_serializes_without_empty_candles() {
        let chart = returns_chart(&[]);
        let json = serde_json::to_value(&chart).unwrap();
        assert!(json.get("candles").is_none());
        assert_eq!(json["metadata"]["data_points"], 0);
    }
}
