//! Planner configuration.
//!
//! Every stage receives its configuration explicitly; nothing is read from
//! ambient state, so identical inputs and config always produce identical
//! outputs.

use std::time::Duration;

/// Pointwise error metric used to backtest forecast candidates.
///
/// The same metric is applied to every candidate of a series, so the
/// comparison is always like-for-like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMetric {
    /// Root mean squared error.
    #[default]
    Rmse,
    /// Mean absolute error.
    Mae,
    /// Mean absolute percentage error. Zero actuals are skipped; if every
    /// actual is zero the metric falls back to MAE.
    Mape,
}

impl ErrorMetric {
    /// Computes the error between predictions and actuals.
    ///
    /// Returns `f64::INFINITY` when the slices are empty or of unequal
    /// length, so a malformed candidate never wins selection.
    ///
    /// # Examples
    ///
    /// ```
    /// use barge_dispatch::config::ErrorMetric;
    ///
    /// let err = ErrorMetric::Mae.compute(&[10.0, 12.0], &[11.0, 11.0]);
    /// assert!((err - 1.0).abs() < 1e-10);
    /// ```
    pub fn compute(&self, actuals: &[f64], predictions: &[f64]) -> f64 {
        if actuals.is_empty() || actuals.len() != predictions.len() {
            return f64::INFINITY;
        }
        let n = actuals.len() as f64;
        match self {
            ErrorMetric::Rmse => {
                let sse: f64 = actuals
                    .iter()
                    .zip(predictions)
                    .map(|(a, p)| (a - p) * (a - p))
                    .sum();
                (sse / n).sqrt()
            }
            ErrorMetric::Mae => {
                actuals
                    .iter()
                    .zip(predictions)
                    .map(|(a, p)| (a - p).abs())
                    .sum::<f64>()
                    / n
            }
            ErrorMetric::Mape => {
                let mut sum = 0.0;
                let mut count = 0usize;
                for (a, p) in actuals.iter().zip(predictions) {
                    if a.abs() > f64::EPSILON {
                        sum += ((a - p) / a).abs();
                        count += 1;
                    }
                }
                if count == 0 {
                    ErrorMetric::Mae.compute(actuals, predictions)
                } else {
                    sum / count as f64
                }
            }
        }
    }
}

/// ARIMA order (p, d, q).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArimaOrder {
    /// Autoregressive terms.
    pub p: usize,
    /// Differencing order.
    pub d: usize,
    /// Moving-average terms.
    pub q: usize,
}

impl ArimaOrder {
    /// Creates a new order specification.
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Number of free parameters (AR + MA + intercept).
    pub fn num_params(&self) -> usize {
        self.p + self.q + 1
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

/// How the trend model's ARIMA order is chosen.
///
/// Both policies are deterministic: `Fixed` uses the configured order as-is,
/// `AicGrid` scans a small candidate grid in a fixed iteration order and
/// keeps the lowest-AIC fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderPolicy {
    /// Always fit the given order.
    Fixed(ArimaOrder),
    /// Scan p in `0..=max_p`, d in `0..=max_d`, q in `0..=max_q` and keep
    /// the order with the lowest AIC. Ties keep the earlier (smaller) order.
    AicGrid {
        max_p: usize,
        max_d: usize,
        max_q: usize,
    },
}

impl Default for OrderPolicy {
    fn default() -> Self {
        OrderPolicy::Fixed(ArimaOrder::default())
    }
}

/// Configuration for the forecasting stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    /// Trailing weeks withheld from fitting and used for backtesting.
    pub holdout_weeks: usize,
    /// Minimum series length; shorter series fail with `InsufficientHistory`.
    pub min_history_weeks: usize,
    /// Seasonal cycle length in weeks for the smoothing model. The seasonal
    /// component is disabled automatically when history covers fewer than
    /// two full cycles.
    pub seasonal_period: usize,
    /// Backtest error metric.
    pub metric: ErrorMetric,
    /// ARIMA order policy for the trend model.
    pub order_policy: OrderPolicy,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            holdout_weeks: 12,
            min_history_weeks: 16,
            seasonal_period: 52,
            metric: ErrorMetric::default(),
            order_policy: OrderPolicy::default(),
        }
    }
}

/// Configuration for the route solver.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Number of construction restarts. The first restart is pure greedy;
    /// later restarts randomize among the nearest feasible candidates.
    pub restarts: usize,
    /// Maximum local-search improvement sweeps per restart.
    pub max_sweeps: usize,
    /// Size of the candidate pool for randomized restarts.
    pub candidate_pool: usize,
    /// Optional wall-clock budget for the whole solve. On deadline the best
    /// feasible route found so far is returned.
    pub deadline: Option<Duration>,
    /// RNG seed; restart `i` derives its stream from `seed + i`.
    pub seed: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            restarts: 8,
            max_sweeps: 200,
            candidate_pool: 3,
            deadline: None,
            seed: 0,
        }
    }
}

/// Top-level configuration for a planning run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlannerConfig {
    /// Forecasting-stage configuration.
    pub forecast: ForecastConfig,
    /// Routing-stage configuration.
    pub solver: SolverConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rmse() {
        let err = ErrorMetric::Rmse.compute(&[3.0, 3.0], &[0.0, 0.0]);
        assert!((err - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_mae() {
        let err = ErrorMetric::Mae.compute(&[1.0, 2.0, 3.0], &[2.0, 2.0, 2.0]);
        assert!((err - 2.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_mape_skips_zero_actuals() {
        let err = ErrorMetric::Mape.compute(&[0.0, 10.0], &[5.0, 12.0]);
        assert!((err - 0.2).abs() < 1e-10);
    }

    #[test]
    fn test_mape_all_zero_falls_back_to_mae() {
        let err = ErrorMetric::Mape.compute(&[0.0, 0.0], &[1.0, 3.0]);
        assert!((err - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_empty_slices_are_infinite() {
        assert_eq!(ErrorMetric::Rmse.compute(&[], &[]), f64::INFINITY);
        assert_eq!(ErrorMetric::Mae.compute(&[1.0], &[]), f64::INFINITY);
    }

    #[test]
    fn test_defaults() {
        let cfg = PlannerConfig::default();
        assert_eq!(cfg.forecast.holdout_weeks, 12);
        assert_eq!(cfg.forecast.seasonal_period, 52);
        assert_eq!(cfg.solver.restarts, 8);
        assert_eq!(
            cfg.forecast.order_policy,
            OrderPolicy::Fixed(ArimaOrder::new(1, 1, 1))
        );
    }

    #[test]
    fn test_arima_order_params() {
        assert_eq!(ArimaOrder::new(2, 1, 1).num_params(), 4);
    }
}
