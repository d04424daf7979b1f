//! Single-barge CVRPTW solver: parallel restarts over construction plus
//! local search, with deterministic tie-breaking and constraint-attributed
//! infeasibility.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::SolverConfig;

use super::construct::construct_route;
use super::evaluator::{RouteEvaluator, Violation};
use super::improve::improve_route;
use super::matrix::TravelMatrix;
use super::route::Route;
use super::site::{Barge, Site};

/// Which constraint made the problem unsolvable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum InfeasibleCause {
    /// Total demand cannot fit on the barge.
    Capacity {
        /// Sum of demand across all sites.
        total_demand: u64,
        /// Barge capacity.
        capacity: u64,
        /// Demanding sites.
        sites: Vec<String>,
    },
    /// Time windows (given travel times and working hours) exclude one or
    /// more sites from any feasible route.
    TimeWindow {
        /// Sites that could not be feasibly visited.
        sites: Vec<String>,
    },
    /// The wall-clock budget ran out before any feasible route was found;
    /// no constraint has been proven binding.
    DeadlineExhausted,
}

/// Diagnostic returned when no feasible route exists.
///
/// Demand is never silently dropped: the affected sites are named.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum Infeasible {
    #[error("no feasible route: total demand {total_demand} exceeds barge capacity {capacity}")]
    /// See [`InfeasibleCause::Capacity`].
    Capacity {
        total_demand: u64,
        capacity: u64,
        sites: Vec<String>,
    },
    #[error("no feasible route: time windows unreachable for sites {sites:?}")]
    /// See [`InfeasibleCause::TimeWindow`].
    TimeWindow { sites: Vec<String> },
    #[error("no feasible route found within the time budget")]
    /// See [`InfeasibleCause::DeadlineExhausted`].
    DeadlineExhausted,
}

impl Infeasible {
    /// The binding constraint.
    pub fn cause(&self) -> InfeasibleCause {
        match self {
            Infeasible::Capacity {
                total_demand,
                capacity,
                sites,
            } => InfeasibleCause::Capacity {
                total_demand: *total_demand,
                capacity: *capacity,
                sites: sites.clone(),
            },
            Infeasible::TimeWindow { sites } => InfeasibleCause::TimeWindow {
                sites: sites.clone(),
            },
            Infeasible::DeadlineExhausted => InfeasibleCause::DeadlineExhausted,
        }
    }
}

/// Solves the single-barge CVRPTW over `sites` (index 0 = depot).
///
/// Runs `config.restarts` constructions in parallel — the first pure
/// greedy, the rest randomized by seeded RNG streams — improves each with
/// feasible-only local search, and returns the best feasible route. The
/// result is reproducible: cost ties prefer the route visiting tighter
/// windows earlier, remaining ties the lexicographically smallest site-id
/// sequence.
///
/// On an exhausted deadline the best feasible route found so far is
/// returned; if none was found the problem is reported [`Infeasible`]
/// with the binding constraint attributed.
pub fn solve(
    sites: &[Site],
    barge: &Barge,
    matrix: &TravelMatrix,
    config: &SolverConfig,
) -> Result<Route, Infeasible> {
    let demanding: Vec<&Site> = sites.iter().skip(1).collect();

    // Capacity is checked up front: a load that cannot fit will not fit
    // in any permutation (single vehicle, no split deliveries).
    let total_demand: u64 = demanding.iter().map(|s| s.demand_units()).sum();
    if total_demand > barge.capacity_units() {
        return Err(Infeasible::Capacity {
            total_demand,
            capacity: barge.capacity_units(),
            sites: demanding.iter().map(|s| s.id().to_string()).collect(),
        });
    }

    // Sites whose window closes before the barge can even arrive directly
    // from the depot can never be visited.
    let depart = barge.working_hours().earliest();
    let unreachable: Vec<String> = sites
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(i, site)| site.window().is_violated(depart + matrix.duration(0, *i)))
        .map(|(_, site)| site.id().to_string())
        .collect();
    if !unreachable.is_empty() {
        return Err(Infeasible::TimeWindow { sites: unreachable });
    }

    let deadline = config.deadline.map(|budget| Instant::now() + budget);
    let restarts = config.restarts.max(1);
    let evaluator = RouteEvaluator::new(sites, matrix, barge);

    let attempts: Vec<Result<(f64, Vec<usize>), Vec<usize>>> = (0..restarts)
        .into_par_iter()
        .map(|restart| {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Err(Vec::new());
            }
            // Restart 0 is pure greedy; later restarts widen the pool.
            let pool = if restart == 0 { 1 } else { config.candidate_pool };
            let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(restart as u64));
            let built = construct_route(sites, matrix, barge, pool, &mut rng);
            if !built.unassigned.is_empty() {
                debug!(restart, unassigned = built.unassigned.len(), "construction incomplete");
                return Err(built.unassigned);
            }
            let mut sequence = built.sequence;
            let cost = improve_route(&mut sequence, &evaluator, config.max_sweeps, deadline);
            if cost.is_finite() {
                debug!(restart, cost, "restart finished");
                Ok((cost, sequence))
            } else {
                Err(Vec::new())
            }
        })
        .collect();

    let mut best: Option<(f64, Vec<usize>)> = None;
    let mut unassigned: Vec<usize> = Vec::new();
    for attempt in attempts {
        match attempt {
            Ok((cost, sequence)) => {
                let better = match &best {
                    None => true,
                    Some((best_cost, best_seq)) => {
                        prefer(sites, cost, &sequence, *best_cost, best_seq)
                    }
                };
                if better {
                    best = Some((cost, sequence));
                }
            }
            Err(mut missing) => unassigned.append(&mut missing),
        }
    }

    match best {
        Some((cost, sequence)) => {
            let (route, violations) = evaluator.build_route(&sequence);
            debug_assert!(violations.is_empty());
            info!(cost, stops = route.len(), "route solved");
            Ok(route)
        }
        None => {
            unassigned.sort_unstable();
            unassigned.dedup();
            if unassigned.is_empty() {
                // No restart produced a diagnosis: nothing was proven
                // infeasible, the budget simply ran out first.
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    return Err(Infeasible::DeadlineExhausted);
                }
                return Err(Infeasible::TimeWindow {
                    sites: demanding.iter().map(|s| s.id().to_string()).collect(),
                });
            }
            // Capacity was ruled out up front, so what remains is window
            // interplay between sites.
            Err(Infeasible::TimeWindow {
                sites: unassigned.iter().map(|&i| sites[i].id().to_string()).collect(),
            })
        }
    }
}

/// Re-optimizes a caller-supplied visit sequence (for example a previous
/// run's route fed back in). The sequence is improved with the same local
/// search; an already-optimal input comes back with equal or lower cost.
pub fn resolve_sequence(
    initial: &[usize],
    sites: &[Site],
    barge: &Barge,
    matrix: &TravelMatrix,
    config: &SolverConfig,
) -> Result<Route, Infeasible> {
    let evaluator = RouteEvaluator::new(sites, matrix, barge);
    let (_, violations) = evaluator.build_route(initial);
    if !violations.is_empty() {
        return Err(diagnose(&violations, sites, initial));
    }

    let deadline = config.deadline.map(|budget| Instant::now() + budget);
    let mut sequence = initial.to_vec();
    improve_route(&mut sequence, &evaluator, config.max_sweeps, deadline);
    let (route, violations) = evaluator.build_route(&sequence);
    debug_assert!(violations.is_empty());
    Ok(route)
}

/// Returns `true` when candidate `(cost_a, seq_a)` should replace the
/// incumbent `(cost_b, seq_b)`.
///
/// Order: lower cost, then time-window-tightest sites earlier (the slack
/// sequence compared lexicographically), then the lexicographically
/// smallest site-id sequence.
fn prefer(sites: &[Site], cost_a: f64, seq_a: &[usize], cost_b: f64, seq_b: &[usize]) -> bool {
    match cost_a.total_cmp(&cost_b) {
        std::cmp::Ordering::Less => return true,
        std::cmp::Ordering::Greater => return false,
        std::cmp::Ordering::Equal => {}
    }

    let slack = |seq: &[usize]| -> Vec<f64> {
        seq.iter().map(|&i| sites[i].window().slack()).collect()
    };
    let sa = slack(seq_a);
    let sb = slack(seq_b);
    for (a, b) in sa.iter().zip(&sb) {
        match a.total_cmp(b) {
            std::cmp::Ordering::Less => return true,
            std::cmp::Ordering::Greater => return false,
            std::cmp::Ordering::Equal => {}
        }
    }

    let ids = |seq: &[usize]| -> Vec<&str> { seq.iter().map(|&i| sites[i].id()).collect() };
    ids(seq_a) < ids(seq_b)
}

fn diagnose(violations: &[Violation], sites: &[Site], sequence: &[usize]) -> Infeasible {
    for violation in violations {
        if let Violation::CapacityExceeded { load, capacity } = violation {
            return Infeasible::Capacity {
                total_demand: *load,
                capacity: *capacity,
                sites: sequence.iter().map(|&i| sites[i].id().to_string()).collect(),
            };
        }
    }
    let sites_out = violations
        .iter()
        .filter_map(|v| match v {
            Violation::WindowMissed { site_id, .. } => Some(site_id.clone()),
            _ => None,
        })
        .collect::<Vec<_>>();
    let sites_out = if sites_out.is_empty() {
        sequence.iter().map(|&i| sites[i].id().to_string()).collect()
    } else {
        sites_out
    };
    Infeasible::TimeWindow { sites: sites_out }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{EuclideanProvider, TimeWindow};
    use proptest::prelude::*;

    fn day(end: f64) -> TimeWindow {
        TimeWindow::new(0.0, end).expect("valid")
    }

    fn matrix_for(sites: &[Site]) -> TravelMatrix {
        TravelMatrix::build(&EuclideanProvider::unit_speed(), sites).expect("builds")
    }

    /// Depot↔A = 10, depot↔B = 20, A↔B = 15 minutes.
    struct TableProvider;

    impl crate::routing::TravelTimeProvider for TableProvider {
        fn leg(&self, from: &Site, to: &Site) -> Option<(f64, f64)> {
            let minutes = match (from.id(), to.id()) {
                ("PORT0", "A") | ("A", "PORT0") => 10.0,
                ("PORT0", "B") | ("B", "PORT0") => 20.0,
                ("A", "B") | ("B", "A") => 15.0,
                _ => return None,
            };
            Some((minutes, minutes))
        }
    }

    /// Two sites around the depot, B with a tight window.
    fn two_site_problem() -> (Vec<Site>, Barge) {
        let sites = vec![
            Site::depot("PORT0", 0.0, 0.0, day(200.0)),
            Site::new("A", 10.0, 0.0, 5, 10.0, TimeWindow::new(0.0, 100.0).expect("valid")),
            Site::new("B", 0.0, 20.0, 5, 10.0, TimeWindow::new(50.0, 60.0).expect("valid")),
        ];
        let barge = Barge::new(20, day(200.0));
        (sites, barge)
    }

    #[test]
    fn test_two_site_scenario() {
        let (sites, barge) = two_site_problem();
        let matrix = TravelMatrix::build(&TableProvider, &sites).expect("builds");
        let route = solve(&sites, &barge, &matrix, &SolverConfig::default()).expect("feasible");
        assert_eq!(route.len(), 2);
        assert!(route.elapsed() <= 140.0 + 1e-9);
        // Replay holds every invariant
        let evaluator = RouteEvaluator::new(&sites, &matrix, &barge);
        assert!(evaluator.is_feasible(&route.site_indices()));
    }

    #[test]
    fn test_single_site_over_capacity_is_capacity_infeasible() {
        let sites = vec![
            Site::depot("PORT0", 0.0, 0.0, day(1000.0)),
            Site::new("S01", 5.0, 0.0, 50, 10.0, day(1000.0)),
        ];
        let barge = Barge::new(20, day(1000.0));
        let matrix = matrix_for(&sites);
        let err = solve(&sites, &barge, &matrix, &SolverConfig::default()).expect_err("infeasible");
        assert!(matches!(
            err,
            Infeasible::Capacity { total_demand: 50, capacity: 20, .. }
        ));
    }

    #[test]
    fn test_unreachable_window_is_time_infeasible() {
        let sites = vec![
            Site::depot("PORT0", 0.0, 0.0, day(1000.0)),
            Site::new("S01", 100.0, 0.0, 5, 10.0, TimeWindow::new(0.0, 50.0).expect("valid")),
        ];
        let barge = Barge::new(20, day(1000.0));
        let matrix = matrix_for(&sites);
        let err = solve(&sites, &barge, &matrix, &SolverConfig::default()).expect_err("infeasible");
        assert_eq!(
            err,
            Infeasible::TimeWindow {
                sites: vec!["S01".to_string()]
            }
        );
    }

    #[test]
    fn test_solver_is_reproducible() {
        let (sites, barge) = two_site_problem();
        let matrix = matrix_for(&sites);
        let config = SolverConfig::default();
        let a = solve(&sites, &barge, &matrix, &config).expect("feasible");
        let b = solve(&sites, &barge, &matrix, &config).expect("feasible");
        assert_eq!(a.site_ids(), b.site_ids());
        assert_eq!(a.cost(), b.cost());
    }

    #[test]
    fn test_resolve_sequence_does_not_worsen() {
        let (sites, barge) = two_site_problem();
        let matrix = matrix_for(&sites);
        let config = SolverConfig::default();
        let route = solve(&sites, &barge, &matrix, &config).expect("feasible");
        let again = resolve_sequence(&route.site_indices(), &sites, &barge, &matrix, &config)
            .expect("still feasible");
        assert!(again.cost() <= route.cost() + 1e-9);
    }

    #[test]
    fn test_empty_problem_yields_empty_route() {
        let sites = vec![Site::depot("PORT0", 0.0, 0.0, day(1000.0))];
        let barge = Barge::new(20, day(1000.0));
        let matrix = matrix_for(&sites);
        let route = solve(&sites, &barge, &matrix, &SolverConfig::default()).expect("feasible");
        assert!(route.is_empty());
    }

    #[test]
    fn test_zero_deadline_reports_budget_not_time_windows() {
        let (sites, barge) = two_site_problem();
        let matrix = matrix_for(&sites);
        let config = SolverConfig {
            deadline: Some(std::time::Duration::ZERO),
            ..SolverConfig::default()
        };
        let err = solve(&sites, &barge, &matrix, &config).expect_err("no time to search");
        assert_eq!(err, Infeasible::DeadlineExhausted);
        assert_eq!(err.cause(), InfeasibleCause::DeadlineExhausted);
    }

    #[test]
    fn test_deadline_still_returns_feasible_route() {
        let (sites, barge) = two_site_problem();
        let matrix = matrix_for(&sites);
        let config = SolverConfig {
            deadline: Some(std::time::Duration::from_secs(5)),
            ..SolverConfig::default()
        };
        let route = solve(&sites, &barge, &matrix, &config).expect("feasible");
        let evaluator = RouteEvaluator::new(&sites, &matrix, &barge);
        assert!(evaluator.is_feasible(&route.site_indices()));
    }

    proptest! {
        /// Any feasible solver output replays within capacity and windows.
        #[test]
        fn prop_route_invariants_hold(
            coords in proptest::collection::vec((1.0f64..50.0, -50.0f64..50.0), 1..7),
            demands in proptest::collection::vec(1u64..15, 7),
            capacity in 40u64..120,
        ) {
            let horizon = day(10_000.0);
            let mut sites = vec![Site::depot("PORT0", 0.0, 0.0, horizon)];
            for (i, (x, y)) in coords.iter().enumerate() {
                sites.push(Site::new(
                    &format!("S{i:02}"),
                    *x,
                    *y,
                    demands[i],
                    10.0,
                    horizon,
                ));
            }
            let barge = Barge::new(capacity, horizon);
            let matrix = matrix_for(&sites);

            if let Ok(route) = solve(&sites, &barge, &matrix, &SolverConfig::default()) {
                // Prefix loads never exceed capacity
                for stop in route.stops() {
                    prop_assert!(stop.load_after <= capacity);
                }
                // Replay is violation-free
                let evaluator = RouteEvaluator::new(&sites, &matrix, &barge);
                prop_assert!(evaluator.is_feasible(&route.site_indices()));
                // Every demanding site is visited exactly once
                let mut seen = route.site_indices();
                seen.sort_unstable();
                let expected: Vec<usize> = (1..sites.len()).collect();
                prop_assert_eq!(seen, expected);
            }
        }
    }
}
