//! Local search improvement for a single route.
//!
//! # Algorithm
//!
//! Three intra-route move families, applied first-improvement until a full
//! sweep finds nothing better or the sweep/deadline budget runs out:
//!
//! - relocate — move one site to a different position
//! - swap — exchange two sites
//! - 2-opt — reverse a contiguous segment
//!
//! A move is accepted only when the resulting sequence is feasible and
//! strictly cheaper (travel + service). Since every candidate is replayed
//! through the evaluator, time-window and working-hours feasibility are
//! enforced exactly, not approximated by deltas.

use std::time::Instant;

use super::evaluator::RouteEvaluator;

const IMPROVE_EPS: f64 = 1e-9;

/// Improves a visit sequence in place, returning its final feasible cost
/// (infinite if the starting sequence was already infeasible).
///
/// `deadline`, when given, bounds wall-clock time: the sweep in progress
/// stops between move evaluations and the current (always feasible)
/// sequence is kept.
pub fn improve_route(
    sequence: &mut Vec<usize>,
    evaluator: &RouteEvaluator<'_>,
    max_sweeps: usize,
    deadline: Option<Instant>,
) -> f64 {
    let mut best_cost = evaluator.feasible_cost(sequence);
    if !best_cost.is_finite() || sequence.len() < 2 {
        return best_cost;
    }

    let out_of_time = || deadline.is_some_and(|d| Instant::now() >= d);

    for _ in 0..max_sweeps {
        let mut improved = false;
        let n = sequence.len();

        // Relocate
        'relocate: for from in 0..n {
            for to in 0..n {
                if from == to {
                    continue;
                }
                if out_of_time() {
                    return best_cost;
                }
                let mut trial = sequence.clone();
                let site = trial.remove(from);
                trial.insert(to, site);
                let cost = evaluator.feasible_cost(&trial);
                if cost < best_cost - IMPROVE_EPS {
                    *sequence = trial;
                    best_cost = cost;
                    improved = true;
                    break 'relocate;
                }
            }
        }

        // Swap
        'swap: for i in 0..n.saturating_sub(1) {
            for j in i + 1..n {
                if out_of_time() {
                    return best_cost;
                }
                let mut trial = sequence.clone();
                trial.swap(i, j);
                let cost = evaluator.feasible_cost(&trial);
                if cost < best_cost - IMPROVE_EPS {
                    *sequence = trial;
                    best_cost = cost;
                    improved = true;
                    break 'swap;
                }
            }
        }

        // 2-opt segment reversal
        'two_opt: for i in 0..n.saturating_sub(1) {
            for j in i + 1..n {
                if out_of_time() {
                    return best_cost;
                }
                let mut trial = sequence.clone();
                trial[i..=j].reverse();
                let cost = evaluator.feasible_cost(&trial);
                if cost < best_cost - IMPROVE_EPS {
                    *sequence = trial;
                    best_cost = cost;
                    improved = true;
                    break 'two_opt;
                }
            }
        }

        if !improved {
            break;
        }
    }

    best_cost
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{Barge, EuclideanProvider, Site, TimeWindow, TravelMatrix};

    fn day() -> TimeWindow {
        TimeWindow::new(0.0, 10_000.0).expect("valid")
    }

    fn line_problem() -> (Vec<Site>, TravelMatrix, Barge) {
        let sites = vec![
            Site::depot("PORT0", 0.0, 0.0, day()),
            Site::new("S01", 1.0, 0.0, 10, 0.0, day()),
            Site::new("S02", 2.0, 0.0, 10, 0.0, day()),
            Site::new("S03", 3.0, 0.0, 10, 0.0, day()),
        ];
        let matrix =
            TravelMatrix::build(&EuclideanProvider::unit_speed(), &sites).expect("builds");
        let barge = Barge::new(100, day());
        (sites, matrix, barge)
    }

    #[test]
    fn test_fixes_bad_order() {
        let (sites, matrix, barge) = line_problem();
        let evaluator = RouteEvaluator::new(&sites, &matrix, &barge);
        let mut sequence = vec![3, 1, 2];
        let cost = improve_route(&mut sequence, &evaluator, 100, None);
        // Cost-optimal out-and-back is 6; several orders attain it on a
        // line, so assert the cost and feasibility rather than one order
        assert!((cost - 6.0).abs() < 1e-9);
        assert!(evaluator.is_feasible(&sequence));
        let mut visited = sequence.clone();
        visited.sort_unstable();
        assert_eq!(visited, vec![1, 2, 3]);
    }

    #[test]
    fn test_never_worsens() {
        let (sites, matrix, barge) = line_problem();
        let evaluator = RouteEvaluator::new(&sites, &matrix, &barge);
        let mut sequence = vec![1, 2, 3];
        let before = evaluator.feasible_cost(&sequence);
        let after = improve_route(&mut sequence, &evaluator, 100, None);
        assert!(after <= before + 1e-9);
    }

    #[test]
    fn test_keeps_feasibility_under_windows() {
        // S02 must be visited late; improvement must not pull it earlier
        let sites = vec![
            Site::depot("PORT0", 0.0, 0.0, day()),
            Site::new("S01", 1.0, 0.0, 10, 0.0, day()),
            Site::new("S02", 2.0, 0.0, 10, 0.0, TimeWindow::new(50.0, 60.0).expect("valid")),
            Site::new("S03", 3.0, 0.0, 10, 0.0, day()),
        ];
        let matrix =
            TravelMatrix::build(&EuclideanProvider::unit_speed(), &sites).expect("builds");
        let barge = Barge::new(100, day());
        let evaluator = RouteEvaluator::new(&sites, &matrix, &barge);
        let mut sequence = vec![1, 3, 2];
        improve_route(&mut sequence, &evaluator, 100, None);
        assert!(evaluator.is_feasible(&sequence));
    }

    #[test]
    fn test_infeasible_input_untouched() {
        let (sites, matrix, _) = line_problem();
        let barge = Barge::new(5, day());
        let evaluator = RouteEvaluator::new(&sites, &matrix, &barge);
        let mut sequence = vec![1, 2, 3];
        let cost = improve_route(&mut sequence, &evaluator, 100, None);
        assert!(cost.is_infinite());
        assert_eq!(sequence, vec![1, 2, 3]);
    }

    #[test]
    fn test_expired_deadline_returns_immediately() {
        let (sites, matrix, barge) = line_problem();
        let evaluator = RouteEvaluator::new(&sites, &matrix, &barge);
        let mut sequence = vec![3, 1, 2];
        let past = Instant::now();
        let cost = improve_route(&mut sequence, &evaluator, 100, Some(past));
        // No moves applied, but the returned cost is still the feasible
        // cost of the untouched sequence
        assert!(cost.is_finite());
        assert_eq!(sequence, vec![3, 1, 2]);
    }
}
