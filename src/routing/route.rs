//! Route and stop types.

use serde::{Deserialize, Serialize};

/// A single delivery stop on the route.
///
/// Times are minutes from midnight; load is the cumulative units delivered
/// after serving this stop (the barge leaves the depot carrying the route
/// total, so this never exceeding capacity is the capacity invariant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    /// Index of the site in the run's site slice (never 0, the depot).
    pub site_index: usize,
    /// Site identifier.
    pub site_id: String,
    /// Arrival time at the site.
    pub arrival: f64,
    /// Time spent waiting for the window to open.
    pub waiting: f64,
    /// Departure time (service start + service duration).
    pub departure: f64,
    /// Units delivered at this stop.
    pub delivered: u64,
    /// Cumulative units delivered after this stop.
    pub load_after: u64,
}

/// An ordered delivery route for the barge.
///
/// The depot is implicit at both ends: `stops` holds only demanding sites.
/// Cost is total travel plus total service time; waiting counts toward
/// elapsed time (and the working-hours check) but not toward cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    stops: Vec<Stop>,
    total_travel: f64,
    total_service: f64,
    total_waiting: f64,
    elapsed: f64,
}

impl Route {
    /// Assembles a route from its computed stops and totals. Used by the
    /// evaluator; callers obtain routes from the solver.
    pub(crate) fn new(
        stops: Vec<Stop>,
        total_travel: f64,
        total_service: f64,
        total_waiting: f64,
        elapsed: f64,
    ) -> Self {
        Self {
            stops,
            total_travel,
            total_service,
            total_waiting,
            elapsed,
        }
    }

    /// Ordered stops, depot excluded.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Number of delivery stops.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Returns `true` if the route has no stops.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Site indices in visit order.
    pub fn site_indices(&self) -> Vec<usize> {
        self.stops.iter().map(|s| s.site_index).collect()
    }

    /// Site identifiers in visit order.
    pub fn site_ids(&self) -> Vec<&str> {
        self.stops.iter().map(|s| s.site_id.as_str()).collect()
    }

    /// Total travel minutes including the return to the depot.
    pub fn total_travel(&self) -> f64 {
        self.total_travel
    }

    /// Total service minutes across all stops.
    pub fn total_service(&self) -> f64 {
        self.total_service
    }

    /// Total minutes spent waiting for windows to open.
    pub fn total_waiting(&self) -> f64 {
        self.total_waiting
    }

    /// Minutes from depot departure to the return at the depot.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Total units delivered.
    pub fn total_delivered(&self) -> u64 {
        self.stops.last().map_or(0, |s| s.load_after)
    }

    /// Objective value: travel plus service time.
    pub fn cost(&self) -> f64 {
        self.total_travel + self.total_service
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(site_index: usize, id: &str, delivered: u64, load_after: u64) -> Stop {
        Stop {
            site_index,
            site_id: id.to_string(),
            arrival: 0.0,
            waiting: 0.0,
            departure: 0.0,
            delivered,
            load_after,
        }
    }

    #[test]
    fn test_empty_route() {
        let route = Route::new(vec![], 0.0, 0.0, 0.0, 0.0);
        assert!(route.is_empty());
        assert_eq!(route.total_delivered(), 0);
        assert_eq!(route.cost(), 0.0);
    }

    #[test]
    fn test_route_accessors() {
        let stops = vec![stop(2, "S02", 10, 10), stop(1, "S01", 5, 15)];
        let route = Route::new(stops, 40.0, 20.0, 5.0, 70.0);
        assert_eq!(route.len(), 2);
        assert_eq!(route.site_indices(), vec![2, 1]);
        assert_eq!(route.site_ids(), vec!["S02", "S01"]);
        assert_eq!(route.total_delivered(), 15);
        assert!((route.cost() - 60.0).abs() < 1e-10);
        assert_eq!(route.elapsed(), 70.0);
    }
}
