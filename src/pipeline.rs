//! End-to-end planning: daily sales records in, forecasts and a barge
//! route out.
//!
//! The pipeline runs in two stages. First every site-product series is
//! aggregated to weekly buckets and forecast for the target week, in
//! parallel and with per-series failure isolation. Second the per-site
//! forecast units become delivery demands and the single-barge router is
//! invoked. Forecast failures never abort the run and routing failures
//! never discard the forecasts; everything is reported in [`PlanOutput`].

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::PlannerConfig;
use crate::error::PlanError;
use crate::forecast::{forecast_series_for, ForecastResult};
use crate::routing::{
    solve, Barge, Infeasible, Route, Site, SiteSpec, TravelMatrix, TravelTimeProvider,
};
use crate::series::{aggregate_weekly, SalesRecord};

/// Outcome of the routing stage.
#[derive(Debug, Clone, Serialize)]
pub enum RouteOutcome {
    /// A feasible route was found.
    Planned(Route),
    /// No feasible route exists; the binding constraint is attributed.
    Infeasible(Infeasible),
    /// The routing stage could not run (for example an unreachable site).
    Failed(PlanError),
    /// Every forecast rounded to zero units, so no trip is needed.
    NoDemand,
}

/// Everything the planner produced, failures included.
#[derive(Debug, Clone, Serialize)]
pub struct PlanOutput {
    /// One forecast per site-product series that could be modeled.
    pub forecasts: Vec<ForecastResult>,
    /// Per-series and per-site failures that did not abort the run.
    pub failures: Vec<PlanError>,
    /// The routing stage's result.
    pub route: RouteOutcome,
}

/// Runs the full forecast-then-route plan for `target_week`.
///
/// `site_specs` is the delivery master data; any forecasted site without
/// a spec is reported in `failures` rather than silently dropped. Sites
/// whose summed forecast rounds to zero units are left off the route.
///
/// # Errors
///
/// Only an empty `records` slice fails the whole run; every narrower
/// problem is isolated into `failures` or [`RouteOutcome`].
pub fn run(
    records: &[SalesRecord],
    depot_spec: &SiteSpec,
    site_specs: &[SiteSpec],
    barge: &Barge,
    provider: &dyn TravelTimeProvider,
    target_week: NaiveDate,
    config: &PlannerConfig,
) -> crate::error::Result<PlanOutput> {
    let aggregation = aggregate_weekly(records, config.forecast.min_history_weeks)?;
    let mut failures = aggregation.skipped;

    let outcomes: Vec<_> = aggregation
        .series
        .par_iter()
        .map(|series| forecast_series_for(series, &config.forecast, target_week))
        .collect();

    let mut forecasts = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(result) => forecasts.push(result),
            Err(err) => {
                warn!(%err, "series skipped");
                failures.push(err);
            }
        }
    }
    info!(
        forecasts = forecasts.len(),
        skipped = failures.len(),
        "forecast stage done"
    );

    // Demand per site is the sum of its product forecasts. Forecast order
    // is already (site, product) sorted, so the route input is stable.
    let mut demands: Vec<(String, u64)> = Vec::new();
    for forecast in &forecasts {
        match demands.iter_mut().find(|(id, _)| id == &forecast.site_id) {
            Some((_, units)) => *units += forecast.forecast_units,
            None => demands.push((forecast.site_id.clone(), forecast.forecast_units)),
        }
    }

    let mut sites = vec![Site::depot(
        &depot_spec.id,
        depot_spec.x,
        depot_spec.y,
        barge.working_hours(),
    )];
    for (site_id, units) in &demands {
        if *units == 0 {
            continue;
        }
        match site_specs.iter().find(|spec| &spec.id == site_id) {
            Some(spec) => sites.push(Site::from_spec(spec, *units)),
            None => failures.push(PlanError::InvalidParameter(format!(
                "no site spec for forecasted site {site_id}",
            ))),
        }
    }

    if sites.len() == 1 {
        return Ok(PlanOutput {
            forecasts,
            failures,
            route: RouteOutcome::NoDemand,
        });
    }

    let route = match TravelMatrix::build(provider, &sites) {
        Ok(matrix) => match solve(&sites, barge, &matrix, &config.solver) {
            Ok(route) => RouteOutcome::Planned(route),
            Err(infeasible) => RouteOutcome::Infeasible(infeasible),
        },
        Err(err) => RouteOutcome::Failed(err),
    };

    Ok(PlanOutput {
        forecasts,
        failures,
        route,
    })
}
