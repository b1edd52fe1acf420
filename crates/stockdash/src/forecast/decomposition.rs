//! Additive trend + seasonality decomposition backend

use chrono::NaiveDate;
use ndarray::{Array1, Array2, s};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::features::{FeatureBuilder, Seasonality, SeasonalitySpec};
use super::linalg::{interval_z, residual_sd, ridge_solve};
use super::{
    FittedModel, ForecastComponents, ForecastInput, ForecastModel, ForecastPoint, ModelKind,
    SeasonalComponent, banded_points,
};
use crate::error::{DashError, Result};

/// Near-zero penalty keeping unpenalised columns numerically definite
const UNPENALISED: f64 = 1e-9;

/// Settings for [`DecompositionModel`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecompositionConfig {
    pub seasonality: SeasonalitySpec,
    /// Maximum number of potential trend changepoints
    pub n_changepoints: usize,
    /// Share of the history in which changepoints are placed
    pub changepoint_range: f64,
    /// Ridge penalty on changepoint slope deltas, per observation
    pub changepoint_penalty: f64,
    /// Ridge penalty on Fourier coefficients, per observation
    pub seasonality_penalty: f64,
    /// Width of the uncertainty interval
    pub interval_width: f64,
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self {
            seasonality: SeasonalitySpec {
                yearly: Seasonality::Auto,
                yearly_order: 10,
                weekly: Seasonality::Auto,
                weekly_order: 3,
            },
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_penalty: 0.05,
            seasonality_penalty: 0.01,
            interval_width: 0.8,
        }
    }
}

/// Piecewise-linear trend plus Fourier seasonality
#[derive(Debug, Clone, Default)]
pub struct DecompositionModel {
    config: DecompositionConfig,
}

impl DecompositionModel {
    pub fn new(config: DecompositionConfig) -> Self {
        Self { config }
    }

    /// Changepoint times on the scaled axis, spread over the first part of the history
    fn changepoints(&self, times: &[f64]) -> Vec<f64> {
        let hist = ((times.len() as f64) * self.config.changepoint_range).floor() as usize;
        let count = self.config.n_changepoints.min(hist.saturating_sub(1));
        if count == 0 {
            return Vec::new();
        }
        (1..=count)
            .map(|i| times[i * (hist - 1) / count])
            .collect()
    }
}

struct Design<'a> {
    features: &'a FeatureBuilder,
    changepoints: &'a [f64],
}

impl Design<'_> {
    fn width(&self) -> usize {
        2 + self.changepoints.len() + self.features.seasonal_width()
    }

    /// Columns: intercept, t, (t - c_j)+ for each changepoint, Fourier terms
    fn matrix(&self, dates: &[NaiveDate]) -> Array2<f64> {
        let mut x = Array2::zeros((dates.len(), self.width()));
        let seasonal = self.features.seasonal(dates);
        let trend_cols = 2 + self.changepoints.len();

        for (row, &date) in dates.iter().enumerate() {
            let t = self.features.time(date);
            x[[row, 0]] = 1.0;
            x[[row, 1]] = t;
            for (j, &c) in self.changepoints.iter().enumerate() {
                x[[row, 2 + j]] = (t - c).max(0.0);
            }
        }
        x.slice_mut(s![.., trend_cols..]).assign(&seasonal);
        x
    }
}

impl ForecastModel for DecompositionModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Decomposition
    }

    fn fit(&self, input: &ForecastInput) -> Result<Box<dyn FittedModel>> {
        input.require_min_points(2)?;
        let dates = input.dates();
        let (first, last) = match (input.first_date(), input.last_date()) {
            (Some(f), Some(l)) => (f, l),
            _ => return Err(DashError::ModelFit("empty input".to_string())),
        };

        let features = FeatureBuilder::new(first, last, &self.config.seasonality);
        let times: Vec<f64> = dates.iter().map(|&d| features.time(d)).collect();
        let changepoints = self.changepoints(&times);

        let values = Array1::from(input.values());
        let scale = values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        let scale = if scale > 0.0 { scale } else { 1.0 };
        let y = &values / scale;

        let design = Design {
            features: &features,
            changepoints: &changepoints,
        };
        let x = design.matrix(&dates);

        let n = input.len() as f64;
        let mut penalty = vec![UNPENALISED; design.width()];
        for p in penalty.iter_mut().skip(2).take(changepoints.len()) {
            *p = self.config.changepoint_penalty * n;
        }
        for p in penalty.iter_mut().skip(2 + changepoints.len()) {
            *p = self.config.seasonality_penalty * n;
        }

        let beta = ridge_solve(&x, &y, &penalty)?;
        let fitted = x.dot(&beta);
        let sd = residual_sd(y.view(), fitted.view(), design.width()) * scale;

        debug!(
            changepoints = changepoints.len(),
            yearly = features.has_yearly(),
            weekly = features.has_weekly(),
            residual_sd = sd,
            "Decomposition model fitted"
        );

        Ok(Box::new(FittedDecomposition {
            features,
            changepoints,
            beta,
            scale,
            residual_sd: sd,
            last,
            z: interval_z(self.config.interval_width),
        }))
    }
}

struct FittedDecomposition {
    features: FeatureBuilder,
    changepoints: Vec<f64>,
    beta: Array1<f64>,
    scale: f64,
    residual_sd: f64,
    last: NaiveDate,
    z: f64,
}

impl FittedModel for FittedDecomposition {
    fn predict(&self, dates: &[NaiveDate]) -> Vec<ForecastPoint> {
        let predicted = self.components(dates).total();
        banded_points(
            dates,
            &predicted,
            self.z * self.residual_sd,
            self.last,
            self.features.span_days(),
        )
    }

    fn components(&self, dates: &[NaiveDate]) -> ForecastComponents {
        let design = Design {
            features: &self.features,
            changepoints: &self.changepoints,
        };
        let x = design.matrix(dates);
        let part = |from: usize, to: usize| -> Vec<f64> {
            (x.slice(s![.., from..to]).dot(&self.beta.slice(s![from..to])) * self.scale).to_vec()
        };

        let trend_end = 2 + self.changepoints.len();
        let yearly_end = trend_end + self.features.yearly_width();
        let weekly_end = yearly_end + self.features.weekly_width();

        let mut seasonal = Vec::new();
        if self.features.has_yearly() {
            seasonal.push(SeasonalComponent::new("yearly", part(trend_end, yearly_end)));
        }
        if self.features.has_weekly() {
            seasonal.push(SeasonalComponent::new("weekly", part(yearly_end, weekly_end)));
        }

        ForecastComponents {
            dates: dates.to_vec(),
            trend: part(0, trend_end),
            seasonal,
        }
    }
}
