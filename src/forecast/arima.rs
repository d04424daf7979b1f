//! Trend/autocorrelation model: ARIMA(p, d, q).
//!
//! # Algorithm
//!
//! The series is differenced `d` times to remove trend, then AR and MA
//! coefficients plus an intercept are estimated on the differenced scale by
//! minimizing the conditional sum of squares. Forecasts are produced
//! recursively on the differenced scale (future shocks set to zero) and
//! integrated back to the original scale.
//!
//! Order selection is a deterministic configuration choice: either a fixed
//! order (default (1,1,1)) or the lowest-AIC fit over a small grid.

use crate::config::{ArimaOrder, OrderPolicy};
use crate::error::{PlanError, Result};

use super::model::{ForecastModel, ModelKind};
use super::optimize::{minimize, SimplexOptions};

/// ARIMA trend model.
///
/// # Examples
///
/// ```
/// use barge_dispatch::config::ArimaOrder;
/// use barge_dispatch::forecast::{ForecastModel, TrendModel};
///
/// let series: Vec<f64> = (0..20).map(|t| 10.0 + t as f64).collect();
/// let mut model = TrendModel::new(ArimaOrder::new(1, 1, 1));
/// model.fit(&series).unwrap();
/// let fc = model.forecast(3).unwrap();
/// // A linear ramp keeps climbing after differencing
/// assert!(fc[0] > series[series.len() - 1] - 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct TrendModel {
    order: ArimaOrder,
    ar: Vec<f64>,
    ma: Vec<f64>,
    intercept: f64,
    history: Option<Vec<f64>>,
    differenced: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
    aic: Option<f64>,
}

impl TrendModel {
    /// Creates an unfitted model with the given order.
    pub fn new(order: ArimaOrder) -> Self {
        Self {
            order,
            ar: Vec::new(),
            ma: Vec::new(),
            intercept: 0.0,
            history: None,
            differenced: None,
            residuals: None,
            aic: None,
        }
    }

    /// Fits a model following the configured order policy.
    ///
    /// `Fixed` fits the one order; `AicGrid` scans the grid in a fixed
    /// order and keeps the lowest-AIC fit, so the choice is deterministic.
    pub fn fit_with_policy(values: &[f64], policy: OrderPolicy) -> Result<Self> {
        match policy {
            OrderPolicy::Fixed(order) => {
                let mut model = Self::new(order);
                model.fit(values)?;
                Ok(model)
            }
            OrderPolicy::AicGrid { max_p, max_d, max_q } => {
                let mut best: Option<Self> = None;
                for d in 0..=max_d {
                    for p in 0..=max_p {
                        for q in 0..=max_q {
                            let mut candidate = Self::new(ArimaOrder::new(p, d, q));
                            if candidate.fit(values).is_err() {
                                continue;
                            }
                            let better = match (&best, candidate.aic) {
                                (_, None) => false,
                                (None, Some(_)) => true,
                                (Some(b), Some(aic)) => {
                                    aic < b.aic.unwrap_or(f64::INFINITY)
                                }
                            };
                            if better {
                                best = Some(candidate);
                            }
                        }
                    }
                }
                best.ok_or_else(|| {
                    PlanError::ModelFit("no ARIMA order in the grid converged".to_string())
                })
            }
        }
    }

    /// The fitted order.
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// AR coefficients (empty before fitting).
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    /// MA coefficients (empty before fitting).
    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    /// Akaike information criterion of the fit, if available.
    pub fn aic(&self) -> Option<f64> {
        self.aic
    }

    /// Conditional sum of squares of the given parameters on the
    /// differenced series.
    fn css(diff: &[f64], p: usize, q: usize, params: &[f64]) -> f64 {
        let intercept = params[0];
        let ar = &params[1..1 + p];
        let ma = &params[1 + p..1 + p + q];
        let n = diff.len();
        let start = p.max(q);
        if n <= start {
            return f64::MAX;
        }

        let mut residuals = vec![0.0; n];
        let mut css = 0.0;
        for t in start..n {
            let mut pred = intercept;
            for (i, coef) in ar.iter().enumerate() {
                pred += coef * (diff[t - 1 - i] - intercept);
            }
            for (i, coef) in ma.iter().enumerate() {
                pred += coef * residuals[t - 1 - i];
            }
            let err = diff[t] - pred;
            residuals[t] = err;
            css += err * err;
        }
        css
    }

    /// Residuals and information criterion from the final parameters.
    fn finish_fit(&mut self, diff: &[f64]) -> Result<()> {
        let p = self.order.p;
        let q = self.order.q;
        let start = p.max(q);
        let mut residuals = vec![0.0; diff.len()];
        for t in start..diff.len() {
            let mut pred = self.intercept;
            for (i, coef) in self.ar.iter().enumerate() {
                pred += coef * (diff[t - 1 - i] - self.intercept);
            }
            for (i, coef) in self.ma.iter().enumerate() {
                pred += coef * residuals[t - 1 - i];
            }
            residuals[t] = diff[t] - pred;
        }

        let effective = &residuals[start..];
        if effective.is_empty() {
            return Err(PlanError::ModelFit(
                "no residual degrees of freedom".to_string(),
            ));
        }
        let n_eff = effective.len() as f64;
        let variance = effective.iter().map(|r| r * r).sum::<f64>() / n_eff;
        if !variance.is_finite() {
            return Err(PlanError::ModelFit("non-finite residual variance".to_string()));
        }
        // Gaussian log-likelihood up to constants; variance zero (perfect
        // fit on a degenerate series) is floored to keep AIC finite.
        let k = self.order.num_params() as f64;
        let floored = variance.max(1e-12);
        let ll = -0.5 * n_eff * (1.0 + floored.ln() + (2.0 * std::f64::consts::PI).ln());
        self.aic = Some(-2.0 * ll + 2.0 * k);
        self.residuals = Some(residuals);
        Ok(())
    }
}

impl ForecastModel for TrendModel {
    fn fit(&mut self, values: &[f64]) -> Result<()> {
        let order = self.order;
        let min_len = order.d + order.p.max(order.q) + 2;
        if values.len() < min_len {
            return Err(PlanError::ModelFit(format!(
                "ARIMA({},{},{}) needs at least {} observations, got {}",
                order.p,
                order.d,
                order.q,
                min_len,
                values.len()
            )));
        }

        let diff = difference(values, order.d);
        if diff.is_empty() {
            return Err(PlanError::ModelFit("series vanished under differencing".to_string()));
        }

        let mean = diff.iter().sum::<f64>() / diff.len() as f64;
        if order.p == 0 && order.q == 0 {
            self.intercept = mean;
            self.ar.clear();
            self.ma.clear();
        } else {
            let mut initial = vec![mean];
            let mut bounds = vec![(-1e6, 1e6)];
            for i in 0..order.p {
                initial.push(0.1 / (i + 1) as f64);
                bounds.push((-0.99, 0.99));
            }
            for i in 0..order.q {
                initial.push(0.1 / (i + 1) as f64);
                bounds.push((-0.99, 0.99));
            }
            let best = minimize(
                |params| Self::css(&diff, order.p, order.q, params),
                &initial,
                &bounds,
                SimplexOptions::default(),
            );
            if best.iter().any(|x| !x.is_finite()) {
                return Err(PlanError::ModelFit("parameter estimate diverged".to_string()));
            }
            self.intercept = best[0];
            self.ar = best[1..1 + order.p].to_vec();
            self.ma = best[1 + order.p..].to_vec();
        }

        self.finish_fit(&diff)?;
        self.history = Some(values.to_vec());
        self.differenced = Some(diff);
        Ok(())
    }

    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        let (history, diff, residuals) = match (&self.history, &self.differenced, &self.residuals)
        {
            (Some(history), Some(diff), Some(residuals)) => (history, diff, residuals),
            _ => {
                return Err(PlanError::ModelFit(
                    "trend model must be fitted before forecasting".to_string(),
                ))
            }
        };
        if horizon == 0 {
            return Ok(Vec::new());
        }

        let mut extended = diff.clone();
        let mut shocks = residuals.clone();
        for _ in 0..horizon {
            let t = extended.len();
            let mut pred = self.intercept;
            for (i, coef) in self.ar.iter().enumerate() {
                if t > i {
                    pred += coef * (extended[t - 1 - i] - self.intercept);
                }
            }
            for (i, coef) in self.ma.iter().enumerate() {
                if t > i {
                    pred += coef * shocks[t - 1 - i];
                }
            }
            extended.push(pred);
            shocks.push(0.0);
        }

        let diff_forecast = &extended[diff.len()..];
        Ok(integrate(diff_forecast, history, self.order.d))
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Trend
    }
}

/// Differences a series `d` times.
fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut out = series.to_vec();
    for _ in 0..d {
        if out.len() <= 1 {
            return Vec::new();
        }
        out = out.windows(2).map(|w| w[1] - w[0]).collect();
    }
    out
}

/// Reverses `d`-order differencing of a forecast, anchored on the tail of
/// the original series.
fn integrate(diff_forecast: &[f64], original: &[f64], d: usize) -> Vec<f64> {
    if d == 0 {
        return diff_forecast.to_vec();
    }
    let mut out = diff_forecast.to_vec();
    for level in (0..d).rev() {
        let anchor = if level == 0 {
            original.last().copied().unwrap_or(0.0)
        } else {
            difference(original, level).last().copied().unwrap_or(0.0)
        };
        let mut acc = anchor;
        for x in out.iter_mut() {
            acc += *x;
            *x = acc;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difference_and_integrate_roundtrip() {
        let series = vec![1.0, 3.0, 6.0, 10.0, 15.0];
        let diff = difference(&series, 1);
        assert_eq!(diff, vec![2.0, 3.0, 4.0, 5.0]);

        // Integrating a future diff of [6.0] continues the series
        let next = integrate(&[6.0], &series, 1);
        assert_eq!(next, vec![21.0]);
    }

    #[test]
    fn test_double_difference() {
        let series = vec![1.0, 3.0, 6.0, 10.0];
        let diff = difference(&series, 2);
        assert_eq!(diff, vec![1.0, 1.0]);
    }

    #[test]
    fn test_fit_rejects_short_series() {
        let mut model = TrendModel::new(ArimaOrder::new(1, 1, 1));
        assert!(model.fit(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_forecast_requires_fit() {
        let model = TrendModel::new(ArimaOrder::default());
        assert!(model.forecast(1).is_err());
    }

    #[test]
    fn test_constant_series_forecasts_constant() {
        let series = vec![5.0; 16];
        let mut model = TrendModel::new(ArimaOrder::new(1, 1, 1));
        model.fit(&series).expect("fits");
        let fc = model.forecast(3).expect("forecasts");
        for value in fc {
            assert!((value - 5.0).abs() < 0.5);
        }
    }

    #[test]
    fn test_linear_trend_is_continued() {
        let series: Vec<f64> = (0..24).map(|t| 2.0 * t as f64).collect();
        let mut model = TrendModel::new(ArimaOrder::new(1, 1, 0));
        model.fit(&series).expect("fits");
        let fc = model.forecast(2).expect("forecasts");
        let last = series[series.len() - 1];
        assert!(fc[0] > last);
        assert!(fc[1] > fc[0]);
    }

    #[test]
    fn test_aic_grid_is_deterministic() {
        let series: Vec<f64> = (0..30).map(|t| (t as f64 * 0.3).sin() * 4.0 + 10.0).collect();
        let policy = OrderPolicy::AicGrid {
            max_p: 2,
            max_d: 1,
            max_q: 1,
        };
        let a = TrendModel::fit_with_policy(&series, policy).expect("fits");
        let b = TrendModel::fit_with_policy(&series, policy).expect("fits");
        assert_eq!(a.order(), b.order());
        assert_eq!(a.forecast(2).expect("fc"), b.forecast(2).expect("fc"));
    }

    #[test]
    fn test_fit_populates_diagnostics() {
        let series: Vec<f64> = (0..20).map(|t| t as f64 + 1.0).collect();
        let mut model = TrendModel::new(ArimaOrder::new(1, 1, 1));
        model.fit(&series).expect("fits");
        assert_eq!(model.ar_coefficients().len(), 1);
        assert_eq!(model.ma_coefficients().len(), 1);
        assert!(model.aic().is_some());
    }
}
