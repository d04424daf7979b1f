//! Forecast model bank and selector.
//!
//! Two candidate model classes are fit per weekly series — an ARIMA trend
//! model and a Holt-Winters smoothing model — with the trailing holdout
//! weeks withheld. The selector backtests both on the holdout, picks the
//! lower-error candidate (ties prefer the simpler smoothing model), refits
//! the winner on the full series, and emits the point forecast for the
//! target week. Degenerate series fall back to a naive mean forecast and
//! are flagged as degraded.
//!
//! - [`ForecastModel`] — common fit/forecast contract
//! - [`TrendModel`] — ARIMA(p,d,q) via conditional least squares
//! - [`SmoothingModel`] — additive Holt-Winters (seasonal auto-disabled)
//! - [`NaiveFallback`] — training-mean fallback
//! - [`forecast_series`] / [`forecast_series_for`] — holdout selection

mod arima;
mod model;
mod naive;
mod optimize;
mod selector;
mod smoothing;

pub use arima::TrendModel;
pub use model::{ForecastModel, ModelKind};
pub use naive::NaiveFallback;
pub use optimize::{minimize, SimplexOptions};
pub use selector::{forecast_series, forecast_series_for, ForecastResult};
pub use smoothing::SmoothingModel;
