//! Neural backend: linear trend plus a one-hidden-layer network over seasonal features

use chrono::NaiveDate;
use ndarray::{Array1, Array2, Axis, s};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::features::{FeatureBuilder, Seasonality, SeasonalitySpec};
use super::linalg::{interval_z, residual_sd, ridge_solve};
use super::{
    FittedModel, ForecastComponents, ForecastInput, ForecastModel, ForecastPoint, ModelKind,
    SeasonalComponent, banded_points,
};
use crate::error::{DashError, Result};

/// Settings for [`NeuralModel`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuralConfig {
    pub seasonality: SeasonalitySpec,
    pub hidden_units: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    /// L2 regularisation coefficient
    pub l2_reg: f64,
    /// Stop when the loss has not improved for this many epochs
    pub early_stop_patience: usize,
    /// RNG seed for weight initialisation
    pub seed: u64,
    pub interval_width: f64,
}

impl Default for NeuralConfig {
    fn default() -> Self {
        Self {
            seasonality: SeasonalitySpec {
                yearly: Seasonality::Enabled,
                yearly_order: 10,
                weekly: Seasonality::Disabled,
                weekly_order: 3,
            },
            hidden_units: 16,
            epochs: 300,
            learning_rate: 0.05,
            l2_reg: 1e-4,
            early_stop_patience: 30,
            seed: 42,
            interval_width: 0.8,
        }
    }
}

/// Dense layer; tanh on hidden layers, identity on the output
struct DenseLayer {
    weights: Array2<f64>,
    biases: Array1<f64>,
}

impl DenseLayer {
    fn new(input_size: usize, output_size: usize, rng: &mut StdRng) -> Self {
        // Xavier/Glorot initialisation
        let limit = (6.0 / (input_size + output_size) as f64).sqrt();
        let weights = Array2::random_using(
            (input_size, output_size),
            Uniform::new(-limit, limit),
            rng,
        );
        Self {
            weights,
            biases: Array1::zeros(output_size),
        }
    }

    fn forward(&self, input: &Array2<f64>) -> Array2<f64> {
        input.dot(&self.weights) + &self.biases
    }
}

struct Network {
    hidden: DenseLayer,
    output: DenseLayer,
}

impl Network {
    fn new(inputs: usize, hidden: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self {
            hidden: DenseLayer::new(inputs, hidden, &mut rng),
            output: DenseLayer::new(hidden, 1, &mut rng),
        }
    }

    fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        let h = self.hidden.forward(x).mapv(f64::tanh);
        self.output.forward(&h).column(0).to_owned()
    }

    /// One full-batch gradient step on mean squared error; returns the loss before the step
    fn train_step(&mut self, x: &Array2<f64>, y: &Array1<f64>, lr: f64, l2: f64) -> f64 {
        let n = x.nrows() as f64;
        let h = self.hidden.forward(x).mapv(f64::tanh);
        let out = self.output.forward(&h);

        let err = &out.column(0) - y;
        let loss = err.mapv(|e| e * e).sum() / n;

        let d_out = err.insert_axis(Axis(1)) * (2.0 / n);
        let d_w2 = h.t().dot(&d_out) + &self.output.weights * l2;
        let d_b2 = d_out.sum_axis(Axis(0));

        let d_h = d_out.dot(&self.output.weights.t()) * h.mapv(|v| 1.0 - v * v);
        let d_w1 = x.t().dot(&d_h) + &self.hidden.weights * l2;
        let d_b1 = d_h.sum_axis(Axis(0));

        self.output.weights = &self.output.weights - &(d_w2 * lr);
        self.output.biases = &self.output.biases - &(d_b2 * lr);
        self.hidden.weights = &self.hidden.weights - &(d_w1 * lr);
        self.hidden.biases = &self.hidden.biases - &(d_b1 * lr);

        loss
    }
}

/// Min-max scaling of the training target
struct Scaler {
    min: f64,
    range: f64,
}

impl Scaler {
    fn fit(data: &Array1<f64>) -> Self {
        let min = data.iter().copied().fold(f64::INFINITY, f64::min);
        let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;
        Self {
            min,
            range: if range > 0.0 { range } else { 1.0 },
        }
    }

    fn transform(&self, data: &Array1<f64>) -> Array1<f64> {
        data.mapv(|v| (v - self.min) / self.range)
    }

    fn inverse(&self, data: &Array1<f64>) -> Array1<f64> {
        data.mapv(|v| v * self.range + self.min)
    }
}

/// Network inputs: scaled time followed by Fourier terms
fn network_inputs(features: &FeatureBuilder, dates: &[NaiveDate]) -> Array2<f64> {
    let seasonal = features.seasonal(dates);
    let mut x = Array2::zeros((dates.len(), 1 + seasonal.ncols()));
    for (row, &date) in dates.iter().enumerate() {
        x[[row, 0]] = features.time(date);
    }
    x.slice_mut(s![.., 1..]).assign(&seasonal);
    x
}

fn trend_matrix(features: &FeatureBuilder, dates: &[NaiveDate]) -> Array2<f64> {
    let mut x = Array2::ones((dates.len(), 2));
    for (row, &date) in dates.iter().enumerate() {
        x[[row, 1]] = features.time(date);
    }
    x
}

/// Neural forecast backend
#[derive(Debug, Clone, Default)]
pub struct NeuralModel {
    config: NeuralConfig,
}

impl NeuralModel {
    pub fn new(config: NeuralConfig) -> Self {
        Self { config }
    }
}

impl ForecastModel for NeuralModel {
    fn kind(&self) -> ModelKind {
        ModelKind::Neural
    }

    fn fit(&self, input: &ForecastInput) -> Result<Box<dyn FittedModel>> {
        input.require_min_points(2)?;
        let dates = input.dates();
        let (first, last) = match (input.first_date(), input.last_date()) {
            (Some(f), Some(l)) => (f, l),
            _ => return Err(DashError::ModelFit("empty input".to_string())),
        };
        let features = FeatureBuilder::new(first, last, &self.config.seasonality);
        let y = Array1::from(input.values());

        // Linear trend first so extrapolation does not depend on saturated units
        let trend_x = trend_matrix(&features, &dates);
        let trend = ridge_solve(&trend_x, &y, &[1e-9, 1e-9])?;
        let residual = &y - &trend_x.dot(&trend);

        let scaler = Scaler::fit(&residual);
        let target = scaler.transform(&residual);
        let x = network_inputs(&features, &dates);

        let mut network = Network::new(x.ncols(), self.config.hidden_units, self.config.seed);
        let mut best = f64::INFINITY;
        let mut stale = 0;
        let mut epochs_run = 0;
        for _ in 0..self.config.epochs {
            let loss = network.train_step(
                &x,
                &target,
                self.config.learning_rate,
                self.config.l2_reg,
            );
            epochs_run += 1;
            if !loss.is_finite() {
                return Err(DashError::ModelFit(
                    "training diverged; try a smaller learning rate".to_string(),
                ));
            }
            if loss < best - 1e-9 {
                best = loss;
                stale = 0;
            } else {
                stale += 1;
                if stale >= self.config.early_stop_patience {
                    break;
                }
            }
        }

        let fitted_values = trend_x.dot(&trend) + scaler.inverse(&network.predict(&x));
        let sd = residual_sd(y.view(), fitted_values.view(), 2);
        debug!(epochs = epochs_run, loss = best, residual_sd = sd, "Neural model fitted");

        Ok(Box::new(FittedNeural {
            features,
            trend,
            scaler,
            network,
            residual_sd: sd,
            last,
            z: interval_z(self.config.interval_width),
        }))
    }
}

struct FittedNeural {
    features: FeatureBuilder,
    trend: Array1<f64>,
    scaler: Scaler,
    network: Network,
    residual_sd: f64,
    last: NaiveDate,
    z: f64,
}

impl FittedModel for FittedNeural {
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

    /// Linear trend plus the network output as a single seasonal part
    fn components(&self, dates: &[NaiveDate]) -> ForecastComponents {
        let trend = trend_matrix(&self.features, dates).dot(&self.trend);
        let seasonal = self
            .scaler
            .inverse(&self.network.predict(&network_inputs(&self.features, dates)));

        ForecastComponents {
            dates: dates.to_vec(),
            trend: trend.to_vec(),
            seasonal: vec![SeasonalComponent::new("seasonal", seasonal.to_vec())],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::future_dates;
    use crate::models::fixtures::date;
    use chrono::Duration;

    fn input_from(values: &[f64]) -> ForecastInput {
        let start = date(2019, 1, 1);
        ForecastInput::new(
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| (start + Duration::days(i as i64), v))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_fit_is_deterministic() {
        let values: Vec<f64> = (0..200).map(|i| 20.0 + (f64::from(i) / 9.0).sin()).collect();
        let input = input_from(&values);
        let model = NeuralModel::default();

        let a = model.fit(&input).unwrap().predict(&input.dates());
        let b = model.fit(&input).unwrap().predict(&input.dates());
        assert_eq!(a, b);
    }

    #[test]
    fn test_trend_dominates_extrapolation() {
        let values: Vec<f64> = (0..150).map(|i| 10.0 + 0.1 * f64::from(i)).collect();
        let input = input_from(&values);
        let fitted = NeuralModel::default().fit(&input).unwrap();

        let out = fitted.predict(&future_dates(input.last_date().unwrap(), 20));
        let expected = 10.0 + 0.1 * 169.0;
        assert!((out[19].predicted - expected).abs() < 1.5);
    }

    #[test]
    fn test_two_points_fit() {
        let input = input_from(&[5.0, 6.0]);
        let fitted = NeuralModel::default().fit(&input).unwrap();
        let out = fitted.predict(&input.dates());
        assert!((out[0].predicted - 5.0).abs() < 0.5);
        assert!((out[1].predicted - 6.0).abs() < 0.5);
    }

    #[test]
    fn test_diverging_training_is_model_fit_error() {
        let values: Vec<f64> = (0..50).map(|i| f64::from(i % 7)).collect();
        let input = input_from(&values);
        let model = NeuralModel::new(NeuralConfig {
            learning_rate: 1e12,
            ..NeuralConfig::default()
        });
        assert!(matches!(model.fit(&input), Err(DashError::ModelFit(_))));
    }

    #[test]
    fn test_scaler_roundtrip_constant() {
        let data = Array1::from(vec![3.0, 3.0, 3.0]);
        let scaler = Scaler::fit(&data);
        let back = scaler.inverse(&scaler.transform(&data));
        assert_eq!(back, data);
    }
}
