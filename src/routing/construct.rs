//! Initial route construction.
//!
//! # Algorithm
//!
//! Greedy nearest-feasible-neighbor: from the current position, consider
//! only unvisited sites whose insertion keeps capacity, the site's window,
//! and the return to the depot feasible, and move to the nearest of them.
//! Restarts randomize the choice among the `candidate_pool` nearest
//! feasible sites (a pool of one is pure greedy and consumes no
//! randomness).
//!
//! Sites the greedy pass could not reach are not dropped: each is retried
//! with a cheapest-feasible-insertion sweep over every position of the
//! built sequence. Whatever still cannot be placed is reported as
//! unassigned for the solver's infeasibility diagnostics.

use rand::Rng;

use super::evaluator::RouteEvaluator;
use super::matrix::TravelMatrix;
use super::site::{Barge, Site};

/// Result of one construction attempt.
#[derive(Debug, Clone)]
pub struct Construction {
    /// Built visit sequence (site indices, depot excluded).
    pub sequence: Vec<usize>,
    /// Sites that could not be feasibly placed.
    pub unassigned: Vec<usize>,
}

/// Builds an initial visit sequence covering as many sites as feasible.
///
/// # Examples
///
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use barge_dispatch::routing::{
///     construct_route, Barge, EuclideanProvider, Site, TimeWindow, TravelMatrix,
/// };
///
/// let day = TimeWindow::new(0.0, 1440.0).unwrap();
/// let sites = vec![
///     Site::depot("PORT0", 0.0, 0.0, day),
///     Site::new("S01", 1.0, 0.0, 10, 5.0, day),
///     Site::new("S02", 2.0, 0.0, 10, 5.0, day),
/// ];
/// let matrix = TravelMatrix::build(&EuclideanProvider::unit_speed(), &sites).unwrap();
/// let barge = Barge::new(100, day);
///
/// let mut rng = StdRng::seed_from_u64(0);
/// let built = construct_route(&sites, &matrix, &barge, 1, &mut rng);
/// assert_eq!(built.sequence, vec![1, 2]);
/// assert!(built.unassigned.is_empty());
/// ```
pub fn construct_route<R: Rng>(
    sites: &[Site],
    matrix: &TravelMatrix,
    barge: &Barge,
    candidate_pool: usize,
    rng: &mut R,
) -> Construction {
    let n = sites.len();
    if n <= 1 {
        return Construction {
            sequence: Vec::new(),
            unassigned: Vec::new(),
        };
    }

    let mut visited = vec![false; n];
    visited[0] = true; // depot

    let mut sequence = Vec::new();
    let mut current = 0usize;
    let mut current_time = barge.working_hours().earliest();
    let mut load: u64 = 0;
    let day_end = barge.working_hours().latest();

    loop {
        // All unvisited sites whose append keeps the route feasible,
        // ordered nearest-first (index breaks travel-time ties so the
        // greedy pass is deterministic).
        let mut candidates: Vec<(usize, f64)> = (1..n)
            .filter(|&i| !visited[i])
            .filter_map(|i| {
                let site = &sites[i];
                if load + site.demand_units() > barge.capacity_units() {
                    return None;
                }
                let travel = matrix.duration(current, i);
                let arrival = current_time + travel;
                if site.window().is_violated(arrival) {
                    return None;
                }
                let departure = arrival + site.window().waiting_time(arrival) + site.service_minutes();
                if departure + matrix.duration(i, 0) > day_end {
                    return None;
                }
                Some((i, travel))
            })
            .collect();
        if candidates.is_empty() {
            break;
        }
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

        let pool = candidate_pool.clamp(1, candidates.len());
        let pick = if pool == 1 {
            0
        } else {
            rng.random_range(0..pool as u64) as usize
        };
        let (next, travel) = candidates[pick];

        let arrival = current_time + travel;
        let site = &sites[next];
        current_time = arrival + site.window().waiting_time(arrival) + site.service_minutes();
        load += site.demand_units();
        visited[next] = true;
        sequence.push(next);
        current = next;
    }

    // Deferred retry: cheapest feasible insertion for whatever the greedy
    // pass left behind.
    let evaluator = RouteEvaluator::new(sites, matrix, barge);
    let mut unassigned = Vec::new();
    for i in 1..n {
        if visited[i] {
            continue;
        }
        let mut best: Option<(usize, f64)> = None;
        for pos in 0..=sequence.len() {
            let mut trial = sequence.clone();
            trial.insert(pos, i);
            let cost = evaluator.feasible_cost(&trial);
            if cost.is_finite() && best.is_none_or(|(_, c)| cost < c) {
                best = Some((pos, cost));
            }
        }
        match best {
            Some((pos, _)) => {
                sequence.insert(pos, i);
                visited[i] = true;
            }
            None => unassigned.push(i),
        }
    }

    Construction {
        sequence,
        unassigned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{EuclideanProvider, TimeWindow};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn day() -> TimeWindow {
        TimeWindow::new(0.0, 1440.0).expect("valid")
    }

    fn build(sites: &[Site], barge: &Barge, pool: usize, seed: u64) -> Construction {
        let matrix = TravelMatrix::build(&EuclideanProvider::unit_speed(), sites).expect("builds");
        let mut rng = StdRng::seed_from_u64(seed);
        construct_route(sites, &matrix, barge, pool, &mut rng)
    }

    #[test]
    fn test_greedy_visits_nearest_first() {
        let sites = vec![
            Site::depot("PORT0", 0.0, 0.0, day()),
            Site::new("S01", 5.0, 0.0, 10, 0.0, day()),
            Site::new("S02", 1.0, 0.0, 10, 0.0, day()),
        ];
        let barge = Barge::new(100, day());
        let built = build(&sites, &barge, 1, 0);
        assert_eq!(built.sequence, vec![2, 1]);
        assert!(built.unassigned.is_empty());
    }

    #[test]
    fn test_respects_windows_via_deferral() {
        // S02's window forces it late even though it is nearest
        let sites = vec![
            Site::depot("PORT0", 0.0, 0.0, day()),
            Site::new("S01", 2.0, 0.0, 10, 0.0, day()),
            Site::new("S02", 1.0, 0.0, 10, 0.0, TimeWindow::new(50.0, 60.0).expect("valid")),
        ];
        let barge = Barge::new(100, day());
        let built = build(&sites, &barge, 1, 0);
        assert_eq!(built.sequence.len(), 2);
        assert!(built.unassigned.is_empty());
    }

    #[test]
    fn test_unreachable_window_reported_unassigned() {
        let sites = vec![
            Site::depot("PORT0", 0.0, 0.0, day()),
            Site::new("S01", 100.0, 0.0, 10, 0.0, TimeWindow::new(0.0, 5.0).expect("valid")),
        ];
        let barge = Barge::new(100, day());
        let built = build(&sites, &barge, 1, 0);
        assert!(built.sequence.is_empty());
        assert_eq!(built.unassigned, vec![1]);
    }

    #[test]
    fn test_capacity_limits_assignment() {
        let sites = vec![
            Site::depot("PORT0", 0.0, 0.0, day()),
            Site::new("S01", 1.0, 0.0, 8, 0.0, day()),
            Site::new("S02", 2.0, 0.0, 8, 0.0, day()),
        ];
        let barge = Barge::new(10, day());
        let built = build(&sites, &barge, 1, 0);
        assert_eq!(built.sequence.len(), 1);
        assert_eq!(built.unassigned.len(), 1);
    }

    #[test]
    fn test_pool_of_one_is_deterministic() {
        let sites = vec![
            Site::depot("PORT0", 0.0, 0.0, day()),
            Site::new("S01", 3.0, 1.0, 5, 0.0, day()),
            Site::new("S02", 1.0, 2.0, 5, 0.0, day()),
            Site::new("S03", 2.0, 4.0, 5, 0.0, day()),
        ];
        let barge = Barge::new(100, day());
        let a = build(&sites, &barge, 1, 1);
        let b = build(&sites, &barge, 1, 99);
        assert_eq!(a.sequence, b.sequence);
    }

    #[test]
    fn test_randomized_pool_still_covers_all() {
        let sites = vec![
            Site::depot("PORT0", 0.0, 0.0, day()),
            Site::new("S01", 3.0, 1.0, 5, 0.0, day()),
            Site::new("S02", 1.0, 2.0, 5, 0.0, day()),
            Site::new("S03", 2.0, 4.0, 5, 0.0, day()),
        ];
        let barge = Barge::new(100, day());
        for seed in 0..5 {
            let built = build(&sites, &barge, 3, seed);
            let mut seq = built.sequence.clone();
            seq.sort_unstable();
            assert_eq!(seq, vec![1, 2, 3]);
            assert!(built.unassigned.is_empty());
        }
    }
}
