//! Smoothing model: additive Holt-Winters exponential smoothing.
//!
//! # Algorithm
//!
//! Level, trend, and seasonal components are updated recursively:
//!
//! ```text
//! l_t = α(y_t - s_{t-m}) + (1-α)(l_{t-1} + b_{t-1})
//! b_t = β(l_t - l_{t-1}) + (1-β)b_{t-1}
//! s_t = γ(y_t - l_t) + (1-γ)s_{t-m}
//! ŷ_{t+h} = l_t + h·b_t + s_{t+h-m}
//! ```
//!
//! The smoothing weights are chosen by minimizing the in-sample sum of
//! squared one-step errors. When the series covers fewer than two full
//! seasonal cycles the seasonal component is disabled automatically and
//! the model degrades to Holt's linear-trend smoothing.

use crate::error::{PlanError, Result};

use super::model::{ForecastModel, ModelKind};
use super::optimize::{minimize, SimplexOptions};

const WEIGHT_BOUNDS: (f64, f64) = (1e-4, 0.9999);

/// Additive Holt-Winters smoothing model.
///
/// # Examples
///
/// ```
/// use barge_dispatch::forecast::{ForecastModel, SmoothingModel};
///
/// // Too short for a 52-week season: degrades to level+trend smoothing
/// let mut model = SmoothingModel::new(52);
/// model.fit(&[5.0; 12]).unwrap();
/// assert!(!model.seasonal_active());
/// let fc = model.forecast(1).unwrap();
/// assert!((fc[0] - 5.0).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct SmoothingModel {
    seasonal_period: usize,
    seasonal_active: bool,
    alpha: Option<f64>,
    beta: Option<f64>,
    gamma: Option<f64>,
    level: Option<f64>,
    trend: Option<f64>,
    seasonals: Option<Vec<f64>>,
    n: usize,
}

impl SmoothingModel {
    /// Creates an unfitted model with the given seasonal cycle length.
    pub fn new(seasonal_period: usize) -> Self {
        Self {
            seasonal_period,
            seasonal_active: false,
            alpha: None,
            beta: None,
            gamma: None,
            level: None,
            trend: None,
            seasonals: None,
            n: 0,
        }
    }

    /// Whether the fitted model carries a seasonal component.
    pub fn seasonal_active(&self) -> bool {
        self.seasonal_active
    }

    /// Fitted smoothing weights `(alpha, beta, gamma)`; gamma is `None`
    /// when the seasonal component is disabled.
    pub fn weights(&self) -> (Option<f64>, Option<f64>, Option<f64>) {
        (self.alpha, self.beta, self.gamma)
    }

    /// Initial state from the first seasonal cycle.
    fn init_seasonal(values: &[f64], period: usize) -> (f64, f64, Vec<f64>) {
        let level = values[..period].iter().sum::<f64>() / period as f64;
        let trend = (0..period)
            .map(|i| (values[period + i] - values[i]) / period as f64)
            .sum::<f64>()
            / period as f64;
        let mut seasonals: Vec<f64> = values[..period].iter().map(|y| y - level).collect();
        // Keep the additive components summing to zero
        let mean = seasonals.iter().sum::<f64>() / period as f64;
        for s in seasonals.iter_mut() {
            *s -= mean;
        }
        (level, trend, seasonals)
    }

    /// One-step SSE of the seasonal recursion for the given weights.
    fn sse_seasonal(values: &[f64], period: usize, alpha: f64, beta: f64, gamma: f64) -> f64 {
        let (mut level, mut trend, mut seasonals) = Self::init_seasonal(values, period);
        let mut sse = 0.0;
        for (t, &y) in values.iter().enumerate().skip(period) {
            let idx = t % period;
            let s = seasonals[idx];
            let err = y - (level + trend + s);
            sse += err * err;

            let prev_level = level;
            level = alpha * (y - s) + (1.0 - alpha) * (prev_level + trend);
            trend = beta * (level - prev_level) + (1.0 - beta) * trend;
            seasonals[idx] = gamma * (y - level) + (1.0 - gamma) * s;
        }
        sse
    }

    /// One-step SSE of the Holt (level + trend) recursion.
    fn sse_holt(values: &[f64], alpha: f64, beta: f64) -> f64 {
        let mut level = values[0];
        let mut trend = values[1] - values[0];
        let mut sse = 0.0;
        for &y in values.iter().skip(1) {
            let err = y - (level + trend);
            sse += err * err;

            let prev_level = level;
            level = alpha * y + (1.0 - alpha) * (prev_level + trend);
            trend = beta * (level - prev_level) + (1.0 - beta) * trend;
        }
        sse
    }

    fn fit_seasonal(&mut self, values: &[f64]) {
        let period = self.seasonal_period;
        let best = minimize(
            |w| Self::sse_seasonal(values, period, w[0], w[1], w[2]),
            &[0.3, 0.1, 0.1],
            &[WEIGHT_BOUNDS, WEIGHT_BOUNDS, WEIGHT_BOUNDS],
            SimplexOptions::default(),
        );
        let (alpha, beta, gamma) = (best[0], best[1], best[2]);

        // Replay the recursion to capture the final state
        let (mut level, mut trend, mut seasonals) = Self::init_seasonal(values, period);
        for (t, &y) in values.iter().enumerate().skip(period) {
            let idx = t % period;
            let s = seasonals[idx];
            let prev_level = level;
            level = alpha * (y - s) + (1.0 - alpha) * (prev_level + trend);
            trend = beta * (level - prev_level) + (1.0 - beta) * trend;
            seasonals[idx] = gamma * (y - level) + (1.0 - gamma) * s;
        }

        self.seasonal_active = true;
        self.alpha = Some(alpha);
        self.beta = Some(beta);
        self.gamma = Some(gamma);
        self.level = Some(level);
        self.trend = Some(trend);
        self.seasonals = Some(seasonals);
    }

    fn fit_holt(&mut self, values: &[f64]) {
        let best = minimize(
            |w| Self::sse_holt(values, w[0], w[1]),
            &[0.3, 0.1],
            &[WEIGHT_BOUNDS, WEIGHT_BOUNDS],
            SimplexOptions::default(),
        );
        let (alpha, beta) = (best[0], best[1]);

        let mut level = values[0];
        let mut trend = values[1] - values[0];
        for &y in values.iter().skip(1) {
            let prev_level = level;
            level = alpha * y + (1.0 - alpha) * (prev_level + trend);
            trend = beta * (level - prev_level) + (1.0 - beta) * trend;
        }

        self.seasonal_active = false;
        self.alpha = Some(alpha);
        self.beta = Some(beta);
        self.gamma = None;
        self.level = Some(level);
        self.trend = Some(trend);
        self.seasonals = None;
    }
}

impl ForecastModel for SmoothingModel {
    fn fit(&mut self, values: &[f64]) -> Result<()> {
        if values.len() < 2 {
            return Err(PlanError::ModelFit(format!(
                "smoothing model needs at least 2 observations, got {}",
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(PlanError::ModelFit("non-finite observation".to_string()));
        }

        self.n = values.len();
        if self.seasonal_period >= 2 && values.len() >= 2 * self.seasonal_period {
            self.fit_seasonal(values);
        } else {
            self.fit_holt(values);
        }

        let state_ok = self.level.is_some_and(|l| l.is_finite())
            && self.trend.is_some_and(|t| t.is_finite());
        if !state_ok {
            return Err(PlanError::ModelFit("smoothing state diverged".to_string()));
        }
        Ok(())
    }

    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        let (level, trend) = match (self.level, self.trend) {
            (Some(level), Some(trend)) => (level, trend),
            _ => {
                return Err(PlanError::ModelFit(
                    "smoothing model must be fitted before forecasting".to_string(),
                ))
            }
        };

        let mut out = Vec::with_capacity(horizon);
        for h in 1..=horizon {
            let mut value = level + h as f64 * trend;
            if let Some(seasonals) = &self.seasonals {
                value += seasonals[(self.n + h - 1) % self.seasonal_period];
            }
            out.push(value);
        }
        Ok(out)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Smoothing
    }
}
