//! # barge-dispatch
//!
//! Weekly barge dispatch planning: demand forecasting per site-product
//! series followed by single-vehicle route optimization with capacity and
//! time-window constraints.
//!
//! ## Modules
//!
//! - [`series`] — Daily sales records aggregated into gap-free weekly series
//! - [`forecast`] — Candidate models (ARIMA trend, exponential smoothing),
//!   holdout backtesting, and per-series model selection
//! - [`routing`] — Sites, travel matrix, route evaluation, construction and
//!   local-search improvement, and the restart solver
//! - [`pipeline`] — The end-to-end forecast-then-route plan
//! - [`config`] — Tunables for both stages
//! - [`error`] — Shared error type
//!
//! ## Example
//!
//! ```
//! use barge_dispatch::config::ForecastConfig;
//! use barge_dispatch::forecast::forecast_series;
//! use barge_dispatch::series::{aggregate_weekly, SalesRecord};
//! use chrono::{Days, NaiveDate};
//!
//! let monday = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");
//! let records: Vec<SalesRecord> = (0..20)
//!     .map(|week| SalesRecord {
//!         site_id: "S01".to_string(),
//!         product_id: "P1".to_string(),
//!         date: monday + Days::new(7 * week),
//!         quantity: 5.0,
//!     })
//!     .collect();
//!
//! let aggregation = aggregate_weekly(&records, 8).expect("has data");
//! let config = ForecastConfig {
//!     min_history_weeks: 8,
//!     holdout_weeks: 4,
//!     ..ForecastConfig::default()
//! };
//! let forecast = forecast_series(&aggregation.series[0], &config).expect("fits");
//! assert_eq!(forecast.forecast_units, 5);
//! ```

pub mod config;
pub mod error;
pub mod forecast;
pub mod pipeline;
pub mod routing;
pub mod series;
