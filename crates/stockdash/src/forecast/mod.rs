//! Forecast adapter and its two interchangeable model backends
//!
//! The adapter reshapes a [`PriceSeries`] into a `(ds, y)` table, fits the
//! selected backend and returns a uniform [`ForecastOutput`] covering the
//! observed history plus the requested horizon:
//!
//! - [`DecompositionModel`]: additive trend with changepoints plus Fourier
//!   seasonality, fitted by ridge least squares
//! - [`NeuralModel`]: linear trend plus a small feed-forward network over the
//!   same seasonal features

pub mod decomposition;
pub mod features;
pub mod linalg;
pub mod neural;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

use crate::config::DashConfig;
use crate::error::{DashError, Result};
use crate::models::PriceSeries;

pub use decomposition::{DecompositionConfig, DecompositionModel};
pub use features::{Seasonality, SeasonalitySpec};
pub use neural::{NeuralConfig, NeuralModel};

/// Days per year on the horizon slider
pub const DAYS_PER_YEAR: u32 = 365;

/// Longest horizon the prediction page offers, in years
pub const MAX_HORIZON_YEARS: u32 = 4;

/// Forecast backend selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Trend plus seasonality decomposition
    #[default]
    Decomposition,
    /// Neural network over trend and seasonal features
    Neural,
}

impl ModelKind {
    pub fn label(self) -> &'static str {
        match self {
            ModelKind::Decomposition => "Decomposition Model",
            ModelKind::Neural => "Neural Model",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Decomposition => f.write_str("decomposition"),
            ModelKind::Neural => f.write_str("neural"),
        }
    }
}

impl FromStr for ModelKind {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "decomposition" | "classical" | "prophet" | "d" => Ok(ModelKind::Decomposition),
            "neural" | "neuralprophet" | "nn" | "n" => Ok(ModelKind::Neural),
            other => Err(DashError::Config(format!("Unknown forecast model: {other}"))),
        }
    }
}

/// Convert the page's years slider into a day horizon
pub fn horizon_from_years(years: u32) -> u32 {
    years.min(MAX_HORIZON_YEARS) * DAYS_PER_YEAR
}

/// `(ds, y)` table handed to a backend; dates strictly increasing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastInput {
    points: Vec<(NaiveDate, f64)>,
}

impl ForecastInput {
    /// Validate and wrap `(date, value)` pairs
    pub fn new(points: Vec<(NaiveDate, f64)>) -> Result<Self> {
        if let Some(pair) = points.windows(2).find(|w| w[1].0 <= w[0].0) {
            return Err(DashError::ModelFit(format!(
                "dates must be strictly increasing ({} followed by {})",
                pair[0].0, pair[1].0
            )));
        }
        if let Some((date, _)) = points.iter().find(|(_, y)| !y.is_finite()) {
            return Err(DashError::ModelFit(format!("non-finite value on {date}")));
        }
        Ok(Self { points })
    }

    /// Relabel a price series' closes as the model's `y` column
    pub fn from_series(series: &PriceSeries) -> Result<Self> {
        Self::new(series.bars().iter().map(|b| (b.date, b.close)).collect())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|(d, _)| *d).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|(_, y)| *y).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|(d, _)| *d)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|(d, _)| *d)
    }

    /// Reject inputs too short to fit
    pub(crate) fn require_min_points(&self, min: usize) -> Result<()> {
        if self.points.len() < min {
            return Err(DashError::ModelFit(format!(
                "need at least {min} data points, got {}",
                self.points.len()
            )));
        }
        Ok(())
    }
}

/// One predicted row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted: f64,
    pub lower: f64,
    pub upper: f64,
    /// Observed value for in-sample rows
    pub actual: Option<f64>,
}

/// One named seasonal part, aligned with [`ForecastComponents::dates`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalComponent {
    pub name: String,
    pub values: Vec<f64>,
}

impl SeasonalComponent {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Additive parts behind a forecast: trend plus zero or more seasonal terms.
///
/// For every date, `trend[i] + Σ seasonal[k].values[i]` is the prediction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastComponents {
    pub dates: Vec<NaiveDate>,
    pub trend: Vec<f64>,
    pub seasonal: Vec<SeasonalComponent>,
}

impl ForecastComponents {
    /// Sum of all parts per date
    pub fn total(&self) -> Vec<f64> {
        let mut total = self.trend.clone();
        for part in &self.seasonal {
            for (t, v) in total.iter_mut().zip(&part.values) {
                *t += v;
            }
        }
        total
    }

    pub fn part(&self, name: &str) -> Option<&SeasonalComponent> {
        self.seasonal.iter().find(|p| p.name == name)
    }
}

/// Predictions over the history plus the requested horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastOutput {
    pub ticker: String,
    pub model: ModelKind,
    pub horizon_days: u32,
    pub last_observed: NaiveDate,
    pub points: Vec<ForecastPoint>,
    pub components: ForecastComponents,
}

impl ForecastOutput {
    /// Rows after the last observed date
    pub fn future(&self) -> impl Iterator<Item = &ForecastPoint> {
        self.points.iter().filter(move |p| p.date > self.last_observed)
    }

    /// The last `n` rows
    pub fn tail(&self, n: usize) -> &[ForecastPoint] {
        &self.points[self.points.len().saturating_sub(n)..]
    }

    /// (date, predicted) pairs regardless of backend
    pub fn predictions(&self) -> Vec<(NaiveDate, f64)> {
        self.points.iter().map(|p| (p.date, p.predicted)).collect()
    }
}

/// A backend that can be fitted to a [`ForecastInput`]
pub trait ForecastModel: Send + Sync {
    fn kind(&self) -> ModelKind;

    /// Fit to the observed history
    fn fit(&self, input: &ForecastInput) -> Result<Box<dyn FittedModel>>;
}

/// A fitted backend
pub trait FittedModel: Send + Sync {
    /// Predict one row per date; `actual` is left empty
    fn predict(&self, dates: &[NaiveDate]) -> Vec<ForecastPoint>;

    /// Trend and seasonal parts whose sum is the prediction for each date
    fn components(&self, dates: &[NaiveDate]) -> ForecastComponents;
}

/// Prediction rows with bands that widen past `last` on a history of `span_days`
pub(crate) fn banded_points(
    dates: &[NaiveDate],
    predicted: &[f64],
    spread: f64,
    last: NaiveDate,
    span_days: f64,
) -> Vec<ForecastPoint> {
    dates
        .iter()
        .zip(predicted)
        .map(|(&date, &predicted)| {
            let ahead = (date - last).num_days().max(0) as f64;
            let width = spread * (1.0 + ahead / span_days).sqrt();
            ForecastPoint {
                date,
                predicted,
                lower: predicted - width,
                upper: predicted + width,
                actual: None,
            }
        })
        .collect()
}

/// Daily dates following `last`
pub fn future_dates(last: NaiveDate, horizon_days: u32) -> Vec<NaiveDate> {
    (1..=i64::from(horizon_days))
        .map(|d| last + Duration::days(d))
        .collect()
}

/// Uniform entry point over both backends
pub struct ForecastAdapter {
    decomposition: DecompositionModel,
    neural: NeuralModel,
}

impl ForecastAdapter {
    pub fn new(config: &DashConfig) -> Self {
        Self {
            decomposition: DecompositionModel::new(config.decomposition.clone()),
            neural: NeuralModel::new(config.neural.clone()),
        }
    }

    pub fn model(&self, kind: ModelKind) -> &dyn ForecastModel {
        match kind {
            ModelKind::Decomposition => &self.decomposition,
            ModelKind::Neural => &self.neural,
        }
    }

    /// Fit `kind` to the series' closes and predict history plus `horizon_days`
    pub fn forecast(
        &self,
        series: &PriceSeries,
        horizon_days: u32,
        kind: ModelKind,
    ) -> Result<ForecastOutput> {
        let input = ForecastInput::from_series(series)?;
        input.require_min_points(2)?;
        let last_observed = input
            .last_date()
            .ok_or_else(|| DashError::ModelFit("empty input".to_string()))?;

        let model = self.model(kind);
        info!(
            ticker = series.ticker(),
            model = %model.kind(),
            points = input.len(),
            horizon_days,
            "Fitting forecast model"
        );
        let fitted = model.fit(&input)?;

        let mut dates = input.dates();
        dates.extend(future_dates(last_observed, horizon_days));

        let components = fitted.components(&dates);
        let mut points = fitted.predict(&dates);
        for (point, actual) in points.iter_mut().zip(input.values()) {
            point.actual = Some(actual);
        }

        Ok(ForecastOutput {
            ticker: series.ticker().to_string(),
            model: model.kind(),
            horizon_days,
            last_observed,
            points,
            components,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{date, series};

    fn trending(n: usize) -> PriceSeries {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64 * 0.5).collect();
        series("AAPL", date(2021, 1, 1), &closes)
    }

    #[test]
    fn test_model_kind_parse() {
        assert_eq!("Neural".parse::<ModelKind>().unwrap(), ModelKind::Neural);
        assert_eq!(
            "prophet".parse::<ModelKind>().unwrap(),
            ModelKind::Decomposition
        );
        assert!("arima".parse::<ModelKind>().is_err());
    }

    #[test]
    fn test_horizon_from_years() {
        assert_eq!(horizon_from_years(0), 0);
        assert_eq!(horizon_from_years(2), 730);
        assert_eq!(horizon_from_years(9), 4 * 365);
    }

    #[test]
    fn test_input_requires_increasing_dates() {
        let result = ForecastInput::new(vec![(date(2020, 1, 2), 1.0), (date(2020, 1, 2), 2.0)]);
        assert!(matches!(result, Err(DashError::ModelFit(_))));
    }

    #[test]
    fn test_input_rejects_nan() {
        let result = ForecastInput::new(vec![(date(2020, 1, 2), f64::NAN)]);
        assert!(matches!(result, Err(DashError::ModelFit(_))));
    }

    #[test]
    fn test_future_dates() {
        let dates = future_dates(date(2020, 12, 30), 3);
        assert_eq!(dates, vec![date(2020, 12, 31), date(2021, 1, 1), date(2021, 1, 2)]);
        assert!(future_dates(date(2020, 12, 30), 0).is_empty());
    }

    #[test]
    fn test_zero_horizon_has_no_future_rows() {
        let adapter = ForecastAdapter::new(&DashConfig::default());
        let series = trending(60);
        for kind in [ModelKind::Decomposition, ModelKind::Neural] {
            let output = adapter.forecast(&series, 0, kind).unwrap();
            assert_eq!(output.points.len(), 60);
            assert_eq!(output.future().count(), 0);
            assert!(output.points.iter().all(|p| p.date <= output.last_observed));
        }
    }

    #[test]
    fn test_horizon_extends_past_last_date() {
        let adapter = ForecastAdapter::new(&DashConfig::default());
        let series = trending(60);
        for kind in [ModelKind::Decomposition, ModelKind::Neural] {
            let output = adapter.forecast(&series, 10, kind).unwrap();
            assert_eq!(output.model, kind);
            assert_eq!(output.points.len(), 70);
            assert_eq!(output.future().count(), 10);
            assert!(output.future().all(|p| p.actual.is_none()));
            assert_eq!(output.points[0].actual, Some(100.0));
            assert_eq!(output.predictions().len(), 70);
        }
    }

    #[test]
    fn test_components_sum_to_prediction() {
        let adapter = ForecastAdapter::new(&DashConfig::default());
        let closes: Vec<f64> = (0..800)
            .map(|i| 100.0 + f64::from(i) * 0.05 + (f64::from(i) / 20.0).sin())
            .collect();
        let series = series("AAPL", date(2018, 1, 1), &closes);

        for kind in [ModelKind::Decomposition, ModelKind::Neural] {
            let output = adapter.forecast(&series, 30, kind).unwrap();
            let components = &output.components;
            assert_eq!(components.dates.len(), output.points.len());
            assert!(!components.seasonal.is_empty());

            for (point, total) in output.points.iter().zip(components.total()) {
                assert!((point.predicted - total).abs() < 1e-9 * point.predicted.abs().max(1.0));
            }
        }
    }

    #[test]
    fn test_decomposition_components_are_named() {
        let adapter = ForecastAdapter::new(&DashConfig::default());
        let closes: Vec<f64> = (0..800).map(|i| 50.0 + f64::from(i) * 0.1).collect();
        let output = adapter
            .forecast(&series("MSFT", date(2018, 1, 1), &closes), 0, ModelKind::Decomposition)
            .unwrap();

        assert!(output.components.part("yearly").is_some());
        assert!(output.components.part("weekly").is_some());
        assert_eq!(output.components.trend.len(), 800);
    }

    #[test]
    fn test_too_few_points_is_model_fit_error() {
        let adapter = ForecastAdapter::new(&DashConfig::default());
        let single = series("AAPL", date(2021, 1, 1), &[100.0]);
        for kind in [ModelKind::Decomposition, ModelKind::Neural] {
            let result = adapter.forecast(&single, 30, kind);
            assert!(matches!(result, Err(DashError::ModelFit(_))));
        }
    }
}
