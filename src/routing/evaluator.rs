//! Route evaluation: schedule replay and constraint checking.

use serde::Serialize;

use super::matrix::TravelMatrix;
use super::route::{Route, Stop};
use super::site::{Barge, Site};

/// A constraint violation found while replaying a visit sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Violation {
    /// Total delivered load exceeds barge capacity.
    CapacityExceeded {
        /// Load that exceeded capacity.
        load: u64,
        /// Barge capacity.
        capacity: u64,
    },
    /// Arrival after a site's window closed.
    WindowMissed {
        /// Site where the violation occurred.
        site_id: String,
        /// Actual arrival time.
        arrival: f64,
        /// Window close.
        latest: f64,
    },
    /// Return to the depot after working hours end.
    WorkingHoursExceeded {
        /// Return time at the depot.
        return_time: f64,
        /// Working-day end.
        latest: f64,
    },
}

/// Replays visit sequences into timed, loaded routes and checks the
/// capacity, time-window, and working-hours constraints.
///
/// # Examples
///
/// ```
/// use barge_dispatch::routing::{
///     Barge, EuclideanProvider, RouteEvaluator, Site, TimeWindow, TravelMatrix,
/// };
///
/// let day = TimeWindow::new(0.0, 1440.0).unwrap();
/// let sites = vec![
///     Site::depot("PORT0", 0.0, 0.0, day),
///     Site::new("S01", 3.0, 4.0, 10, 15.0, day),
/// ];
/// let matrix = TravelMatrix::build(&EuclideanProvider::unit_speed(), &sites).unwrap();
/// let barge = Barge::new(100, day);
///
/// let evaluator = RouteEvaluator::new(&sites, &matrix, &barge);
/// let (route, violations) = evaluator.build_route(&[1]);
/// assert!(violations.is_empty());
/// assert_eq!(route.total_delivered(), 10);
/// ```
pub struct RouteEvaluator<'a> {
    sites: &'a [Site],
    matrix: &'a TravelMatrix,
    barge: &'a Barge,
}

impl<'a> RouteEvaluator<'a> {
    /// Creates an evaluator over one run's problem data.
    pub fn new(sites: &'a [Site], matrix: &'a TravelMatrix, barge: &'a Barge) -> Self {
        Self {
            sites,
            matrix,
            barge,
        }
    }

    /// Replays a visit sequence (site indices, depot excluded) into a
    /// timed route, returning it with any violations found.
    ///
    /// The barge departs the depot at the start of working hours; arriving
    /// before a window opens means waiting, arriving after it closes is a
    /// violation.
    pub fn build_route(&self, sequence: &[usize]) -> (Route, Vec<Violation>) {
        let mut violations = Vec::new();
        let mut stops = Vec::with_capacity(sequence.len());

        let mut current_time = self.barge.working_hours().earliest();
        let mut load: u64 = 0;
        let mut total_travel = 0.0;
        let mut total_service = 0.0;
        let mut total_waiting = 0.0;
        let mut prev = 0usize;
        let depart_depot = current_time;

        for &idx in sequence {
            let site = &self.sites[idx];
            let travel = self.matrix.duration(prev, idx);
            total_travel += travel;
            let arrival = current_time + travel;

            if site.window().is_violated(arrival) {
                violations.push(Violation::WindowMissed {
                    site_id: site.id().to_string(),
                    arrival,
                    latest: site.window().latest(),
                });
            }
            let waiting = site.window().waiting_time(arrival);
            total_waiting += waiting;

            let departure = arrival + waiting + site.service_minutes();
            total_service += site.service_minutes();
            load += site.demand_units();

            stops.push(Stop {
                site_index: idx,
                site_id: site.id().to_string(),
                arrival,
                waiting,
                departure,
                delivered: site.demand_units(),
                load_after: load,
            });

            current_time = departure;
            prev = idx;
        }

        let return_travel = self.matrix.duration(prev, 0);
        total_travel += return_travel;
        let return_time = current_time + return_travel;

        if load > self.barge.capacity_units() {
            violations.push(Violation::CapacityExceeded {
                load,
                capacity: self.barge.capacity_units(),
            });
        }
        // A non-finite return time (route through an unconnected pair) can
        // never fit in the working day either.
        if return_time > self.barge.working_hours().latest() || !return_time.is_finite() {
            violations.push(Violation::WorkingHoursExceeded {
                return_time,
                latest: self.barge.working_hours().latest(),
            });
        }

        let route = Route::new(
            stops,
            total_travel,
            total_service,
            total_waiting,
            return_time - depart_depot,
        );
        (route, violations)
    }

    /// Returns `true` if the sequence violates no constraint.
    pub fn is_feasible(&self, sequence: &[usize]) -> bool {
        self.build_route(sequence).1.is_empty()
    }

    /// Cost of a sequence (travel + service), or `f64::INFINITY` when the
    /// sequence is infeasible.
    pub fn feasible_cost(&self, sequence: &[usize]) -> f64 {
        let (route, violations) = self.build_route(sequence);
        if violations.is_empty() {
            route.cost()
        } else {
            f64::INFINITY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{EuclideanProvider, TimeWindow};

    fn day() -> TimeWindow {
        TimeWindow::new(0.0, 1440.0).expect("valid")
    }

    fn setup(capacity: u64) -> (Vec<Site>, TravelMatrix, Barge) {
        let sites = vec![
            Site::depot("PORT0", 0.0, 0.0, day()),
            Site::new("S01", 10.0, 0.0, 5, 10.0, day()),
            Site::new("S02", 20.0, 0.0, 5, 10.0, TimeWindow::new(50.0, 60.0).expect("valid")),
        ];
        let matrix =
            TravelMatrix::build(&EuclideanProvider::unit_speed(), &sites).expect("builds");
        let barge = Barge::new(capacity, TimeWindow::new(0.0, 200.0).expect("valid"));
        (sites, matrix, barge)
    }

    #[test]
    fn test_empty_sequence() {
        let (sites, matrix, barge) = setup(20);
        let evaluator = RouteEvaluator::new(&sites, &matrix, &barge);
        let (route, violations) = evaluator.build_route(&[]);
        assert!(route.is_empty());
        assert!(violations.is_empty());
        assert_eq!(route.elapsed(), 0.0);
    }

    #[test]
    fn test_timing_with_waiting() {
        let (sites, matrix, barge) = setup(20);
        let evaluator = RouteEvaluator::new(&sites, &matrix, &barge);
        // S01: arrive 10, service until 20. S02: arrive 30, wait to 50,
        // depart 60. Return 80.
        let (route, violations) = evaluator.build_route(&[1, 2]);
        assert!(violations.is_empty());
        let stops = route.stops();
        assert!((stops[0].arrival - 10.0).abs() < 1e-10);
        assert!((stops[0].departure - 20.0).abs() < 1e-10);
        assert!((stops[1].arrival - 30.0).abs() < 1e-10);
        assert!((stops[1].waiting - 20.0).abs() < 1e-10);
        assert!((stops[1].departure - 60.0).abs() < 1e-10);
        assert!((route.elapsed() - 80.0).abs() < 1e-10);
        // Cost counts travel (40) + service (20), not waiting
        assert!((route.cost() - 60.0).abs() < 1e-10);
        assert!((route.total_waiting() - 20.0).abs() < 1e-10);
    }

    #[test]
    fn test_window_missed() {
        let (sites, matrix, barge) = setup(20);
        let evaluator = RouteEvaluator::new(&sites, &matrix, &barge);
        // Arriving before the window opens means waiting, not a violation
        let (_, violations) = evaluator.build_route(&[2]);
        assert!(violations.is_empty());

        let mut sites2 = sites.clone();
        sites2[2] = Site::new("S02", 20.0, 0.0, 5, 10.0, TimeWindow::new(0.0, 15.0).expect("valid"));
        let matrix2 =
            TravelMatrix::build(&EuclideanProvider::unit_speed(), &sites2).expect("builds");
        let evaluator2 = RouteEvaluator::new(&sites2, &matrix2, &barge);
        let (_, violations) = evaluator2.build_route(&[2]);
        assert!(matches!(
            violations[0],
            Violation::WindowMissed { arrival, latest, .. } if arrival == 20.0 && latest == 15.0
        ));
    }

    #[test]
    fn test_capacity_exceeded() {
        let (sites, matrix, barge) = setup(7);
        let evaluator = RouteEvaluator::new(&sites, &matrix, &barge);
        let (_, violations) = evaluator.build_route(&[1, 2]);
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::CapacityExceeded { load: 10, capacity: 7 })));
    }

    #[test]
    fn test_working_hours_exceeded() {
        let (sites, matrix, _) = setup(20);
        let barge = Barge::new(20, TimeWindow::new(0.0, 70.0).expect("valid"));
        let evaluator = RouteEvaluator::new(&sites, &matrix, &barge);
        // Return at 80 > 70
        let (_, violations) = evaluator.build_route(&[1, 2]);
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::WorkingHoursExceeded { .. })));
    }

    #[test]
    fn test_feasible_cost() {
        let (sites, matrix, barge) = setup(20);
        let evaluator = RouteEvaluator::new(&sites, &matrix, &barge);
        assert!(evaluator.feasible_cost(&[1, 2]).is_finite());
        let tight = Barge::new(1, barge.working_hours());
        let evaluator = RouteEvaluator::new(&sites, &matrix, &tight);
        assert!(evaluator.feasible_cost(&[1, 2]).is_infinite());
    }
}
