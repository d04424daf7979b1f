//! Single-barge CVRPTW routing.
//!
//! Sites carry forecasted demand, a service duration, and an arrival time
//! window; the barge carries a volumetric capacity and working hours. The
//! solver builds an initial route with a nearest-feasible-neighbor
//! heuristic (randomized across restarts), improves it with feasible-only
//! relocate, swap, and 2-opt moves, and returns the cheapest feasible
//! route — or an [`Infeasible`] diagnostic attributing the binding
//! constraint, never a silently truncated route.
//!
//! - [`Site`], [`Barge`], [`TimeWindow`] — domain model (index 0 = depot)
//! - [`TravelMatrix`], [`TravelTimeProvider`] — per-run travel time cache
//! - [`RouteEvaluator`] — arrival/load replay and feasibility checking
//! - [`solve`] / [`resolve_sequence`] — construction + local search

mod construct;
mod evaluator;
mod improve;
mod matrix;
mod route;
mod site;
mod solver;

pub use construct::{construct_route, Construction};
pub use evaluator::{RouteEvaluator, Violation};
pub use improve::improve_route;
pub use matrix::{EuclideanProvider, TravelMatrix, TravelTimeProvider};
pub use route::{Route, Stop};
pub use site::{Barge, Site, SiteSpec, TimeWindow};
pub use solver::{resolve_sequence, solve, Infeasible, InfeasibleCause};
