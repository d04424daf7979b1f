//! Holdout-based model selection.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ForecastConfig;
use crate::error::{PlanError, Result};
use crate::series::{week_start_of, SiteProductSeries};

use super::arima::TrendModel;
use super::model::{ForecastModel, ModelKind};
use super::naive::NaiveFallback;
use super::smoothing::SmoothingModel;

/// The chosen forecast for one site-product pair.
///
/// Serializable for the external presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Delivery site.
    pub site_id: String,
    /// Product.
    pub product_id: String,
    /// Monday of the forecasted week.
    pub forecast_week: NaiveDate,
    /// Point forecast, clamped non-negative.
    pub point_estimate: f64,
    /// Point forecast rounded to whole units; what routing consumes.
    pub forecast_units: u64,
    /// Which model class produced the forecast.
    pub model_kind: ModelKind,
    /// Backtest error of the chosen model on the holdout weeks.
    pub holdout_error: f64,
    /// `true` when both candidates failed and the naive fallback was used.
    pub degraded: bool,
}

/// Forecasts the week immediately after the series' last observation.
///
/// See [`forecast_series_for`] for the selection procedure.
pub fn forecast_series(series: &SiteProductSeries, config: &ForecastConfig) -> Result<ForecastResult> {
    forecast_series_for(series, config, series.next_week())
}

/// Fits both candidate models on the series head, backtests them on the
/// withheld tail, and forecasts `target_week` with the winner refit on the
/// full series.
///
/// Selection is deterministic: the lower holdout error wins, and an exact
/// tie prefers the model with fewer free parameters (smoothing over trend).
/// If neither candidate fits, the naive mean fallback is used and the
/// result is flagged `degraded`.
///
/// # Errors
///
/// - [`PlanError::InsufficientHistory`] when the series is shorter than
///   `config.min_history_weeks` (or than the two weeks a holdout split
///   needs at minimum).
/// - [`PlanError::InvalidParameter`] when `target_week` precedes the first
///   forecastable week.
pub fn forecast_series_for(
    series: &SiteProductSeries,
    config: &ForecastConfig,
    target_week: NaiveDate,
) -> Result<ForecastResult> {
    // A backtest needs at least one training and one holdout week, even
    // when the configured minimum is looser.
    let min_weeks = config.min_history_weeks.max(2);
    if series.len() < min_weeks {
        return Err(PlanError::InsufficientHistory {
            site_id: series.site_id().to_string(),
            product_id: series.product_id().to_string(),
            needed: min_weeks,
            got: series.len(),
        });
    }

    let target = week_start_of(target_week);
    let first_forecastable = series.next_week();
    if target < first_forecastable {
        return Err(PlanError::InvalidParameter(format!(
            "target week {target} precedes first forecastable week {first_forecastable}",
        )));
    }
    let horizon = ((target - first_forecastable).num_days() / 7) as usize + 1;

    // Clamp the holdout so a generous configured value still leaves a
    // training head on shorter series.
    let holdout = config.holdout_weeks.clamp(1, series.len() / 2);
    let (train, tail) = series.train_holdout(holdout);

    let mut candidates: Vec<(ModelKind, f64)> = Vec::new();

    match TrendModel::fit_with_policy(train, config.order_policy) {
        Ok(model) => {
            if let Ok(predictions) = model.forecast(tail.len()) {
                candidates.push((ModelKind::Trend, config.metric.compute(tail, &predictions)));
            }
        }
        Err(err) => debug!(
            site_id = series.site_id(),
            product_id = series.product_id(),
            %err,
            "trend candidate excluded"
        ),
    }

    let mut smoothing = SmoothingModel::new(config.seasonal_period);
    match smoothing.fit(train) {
        Ok(()) => {
            if let Ok(predictions) = smoothing.forecast(tail.len()) {
                candidates.push((
                    ModelKind::Smoothing,
                    config.metric.compute(tail, &predictions),
                ));
            }
        }
        Err(err) => debug!(
            site_id = series.site_id(),
            product_id = series.product_id(),
            %err,
            "smoothing candidate excluded"
        ),
    }

    // Lower holdout error wins; ties go to the simpler model class.
    let winner = candidates
        .iter()
        .copied()
        .min_by(|(ka, ea), (kb, eb)| ea.total_cmp(eb).then(ka.cmp(kb)));

    let (kind, holdout_error, degraded) = match winner {
        Some((kind, error)) => (kind, error, false),
        None => {
            let mut naive = NaiveFallback::new();
            naive.fit(train)?;
            let predictions = naive.forecast(tail.len())?;
            let error = config.metric.compute(tail, &predictions);
            (ModelKind::Naive, error, true)
        }
    };

    // Refit the winner on the full series (holdout included) for the final
    // forecast; a refit failure degrades to the naive fallback.
    let full = series.quantities();
    let (kind, degraded, forecast) = match refit_and_forecast(kind, full, config, horizon) {
        Ok(values) => (kind, degraded, values),
        Err(err) => {
            debug!(
                site_id = series.site_id(),
                product_id = series.product_id(),
                %err,
                "refit failed, degrading to naive"
            );
            let mut naive = NaiveFallback::new();
            naive.fit(full)?;
            (ModelKind::Naive, true, naive.forecast(horizon)?)
        }
    };

    let raw = forecast
        .get(horizon - 1)
        .copied()
        .ok_or_else(|| PlanError::ModelFit("forecast horizon came back empty".to_string()))?;
    let point_estimate = if raw.is_finite() { raw.max(0.0) } else { 0.0 };

    debug!(
        site_id = series.site_id(),
        product_id = series.product_id(),
        ?kind,
        holdout_error,
        point_estimate,
        "forecast selected"
    );

    Ok(ForecastResult {
        site_id: series.site_id().to_string(),
        product_id: series.product_id().to_string(),
        forecast_week: target,
        point_estimate,
        forecast_units: point_estimate.round() as u64,
        model_kind: kind,
        holdout_error,
        degraded,
    })
}

fn refit_and_forecast(
    kind: ModelKind,
    values: &[f64],
    config: &ForecastConfig,
    horizon: usize,
) -> Result<Vec<f64>> {
    match kind {
        ModelKind::Trend => {
            let model = TrendModel::fit_with_policy(values, config.order_policy)?;
            model.forecast(horizon)
        }
        ModelKind::Smoothing => {
            let mut model = SmoothingModel::new(config.seasonal_period);
            model.fit(values)?;
            model.forecast(horizon)
        }
        ModelKind::Naive => {
            let mut model = NaiveFallback::new();
            model.fit(values)?;
            model.forecast(horizon)
        }
    }
}
