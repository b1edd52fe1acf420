//! Time and seasonal regressors shared by both forecast backends

use chrono::{Datelike, NaiveDate};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Days in a year, as used for the yearly Fourier period
pub const YEARLY_PERIOD: f64 = 365.25;
/// Days in a week
pub const WEEKLY_PERIOD: f64 = 7.0;

/// Minimum history before auto mode turns on a seasonal component
const AUTO_YEARLY_MIN_DAYS: i64 = 730;
const AUTO_WEEKLY_MIN_DAYS: i64 = 14;

/// Whether a seasonal component is modelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seasonality {
    /// Enabled when the history is long enough to estimate it
    Auto,
    Enabled,
    Disabled,
}

impl Seasonality {
    fn resolve(self, span_days: i64, min_days: i64) -> bool {
        match self {
            Seasonality::Auto => span_days >= min_days,
            Seasonality::Enabled => true,
            Seasonality::Disabled => false,
        }
    }
}

/// Seasonal settings for one backend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonalitySpec {
    pub yearly: Seasonality,
    pub yearly_order: usize,
    pub weekly: Seasonality,
    pub weekly_order: usize,
}

/// Maps dates onto a scaled time axis plus Fourier seasonal terms.
///
/// `t` is 0 at the first observed date and 1 at the last; future dates
/// continue past 1 on the same scale.
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    origin: NaiveDate,
    span_days: f64,
    yearly_order: usize,
    weekly_order: usize,
}

impl FeatureBuilder {
    /// Resolve seasonality against the observed history `first..=last`
    pub fn new(first: NaiveDate, last: NaiveDate, spec: &SeasonalitySpec) -> Self {
        let span = (last - first).num_days();
        let yearly_order = if spec.yearly.resolve(span, AUTO_YEARLY_MIN_DAYS) {
            spec.yearly_order
        } else {
            0
        };
        let weekly_order = if spec.weekly.resolve(span, AUTO_WEEKLY_MIN_DAYS) {
            spec.weekly_order
        } else {
            0
        };

        Self {
            origin: first,
            span_days: span.max(1) as f64,
            yearly_order,
            weekly_order,
        }
    }

    pub fn span_days(&self) -> f64 {
        self.span_days
    }

    pub fn has_yearly(&self) -> bool {
        self.yearly_order > 0
    }

    pub fn has_weekly(&self) -> bool {
        self.weekly_order > 0
    }

    /// Scaled time for a date
    pub fn time(&self, date: NaiveDate) -> f64 {
        (date - self.origin).num_days() as f64 / self.span_days
    }

    /// Yearly columns, leading the seasonal block
    pub fn yearly_width(&self) -> usize {
        2 * self.yearly_order
    }

    /// Weekly columns, following the yearly ones
    pub fn weekly_width(&self) -> usize {
        2 * self.weekly_order
    }

    /// Number of seasonal columns produced by [`FeatureBuilder::seasonal`]
    pub fn seasonal_width(&self) -> usize {
        2 * (self.yearly_order + self.weekly_order)
    }

    /// Fourier terms for each date, one row per date
    pub fn seasonal(&self, dates: &[NaiveDate]) -> Array2<f64> {
        let mut out = Array2::zeros((dates.len(), self.seasonal_width()));
        for (row, date) in dates.iter().enumerate() {
            let day = f64::from(date.num_days_from_ce());
            let mut col = 0;
            for (period, order) in [
                (YEARLY_PERIOD, self.yearly_order),
                (WEEKLY_PERIOD, self.weekly_order),
            ] {
                for k in 1..=order {
                    let angle = 2.0 * PI * k as f64 * day / period;
                    out[[row, col]] = angle.sin();
                    out[[row, col + 1]] = angle.cos();
                    col += 2;
                }
            }
        }
        out
    }
}
