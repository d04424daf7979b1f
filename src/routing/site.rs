//! Site, time window, and barge types.

use serde::{Deserialize, Serialize};

/// An arrival time window, in minutes from midnight.
///
/// The barge must arrive no later than `latest` and may arrive as early as
/// `earliest` (waiting is allowed if early).
///
/// # Examples
///
/// ```
/// use barge_dispatch::routing::TimeWindow;
///
/// let tw = TimeWindow::new(480.0, 1020.0).unwrap();
/// assert!(tw.contains(600.0));
/// assert!(tw.is_violated(1021.0));
/// assert_eq!(tw.waiting_time(400.0), 80.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    earliest: f64,
    latest: f64,
}

impl TimeWindow {
    /// Creates a new window.
    ///
    /// Returns `None` if `earliest > latest` or either bound is non-finite.
    pub fn new(earliest: f64, latest: f64) -> Option<Self> {
        if !earliest.is_finite() || !latest.is_finite() || earliest > latest {
            return None;
        }
        Some(Self { earliest, latest })
    }

    /// Earliest allowable service start.
    pub fn earliest(&self) -> f64 {
        self.earliest
    }

    /// Latest allowable arrival.
    pub fn latest(&self) -> f64 {
        self.latest
    }

    /// Width of the window. Tighter windows have less slack.
    pub fn slack(&self) -> f64 {
        self.latest - self.earliest
    }

    /// Returns `true` if `time` falls within the window.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.earliest && time <= self.latest
    }

    /// Waiting time when arriving at `arrival`; zero if within or after
    /// the window.
    pub fn waiting_time(&self, arrival: f64) -> f64 {
        (self.earliest - arrival).max(0.0)
    }

    /// Returns `true` if arriving at `arrival` violates the window.
    pub fn is_violated(&self, arrival: f64) -> bool {
        arrival > self.latest
    }
}

/// Site master data: everything known about a site except its demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSpec {
    /// Site identifier.
    pub id: String,
    /// X-coordinate (or longitude).
    pub x: f64,
    /// Y-coordinate (or latitude).
    pub y: f64,
    /// Unloading time at the site, in minutes.
    pub service_minutes: f64,
    /// Allowed arrival window.
    pub window: TimeWindow,
}

impl SiteSpec {
    /// Creates a site spec.
    pub fn new(id: &str, x: f64, y: f64, service_minutes: f64, window: TimeWindow) -> Self {
        Self {
            id: id.to_string(),
            x,
            y,
            service_minutes,
            window,
        }
    }
}

/// A delivery site (or the depot) in a routing run.
///
/// Index 0 in a site slice is the depot by convention: zero demand, zero
/// service duration, and a window spanning the working day.
///
/// # Examples
///
/// ```
/// use barge_dispatch::routing::{Site, TimeWindow};
///
/// let day = TimeWindow::new(0.0, 1440.0).unwrap();
/// let depot = Site::depot("PORT0", 0.0, 0.0, day);
/// assert_eq!(depot.demand_units(), 0);
///
/// let site = Site::new("S01", 3.0, 4.0, 25, 30.0, TimeWindow::new(480.0, 900.0).unwrap());
/// assert_eq!(site.demand_units(), 25);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    id: String,
    x: f64,
    y: f64,
    demand_units: u64,
    service_minutes: f64,
    window: TimeWindow,
}

impl Site {
    /// Creates a demanding site.
    pub fn new(
        id: &str,
        x: f64,
        y: f64,
        demand_units: u64,
        service_minutes: f64,
        window: TimeWindow,
    ) -> Self {
        Self {
            id: id.to_string(),
            x,
            y,
            demand_units,
            service_minutes,
            window,
        }
    }

    /// Creates the depot: zero demand and service, window = working day.
    pub fn depot(id: &str, x: f64, y: f64, working_day: TimeWindow) -> Self {
        Self::new(id, x, y, 0, 0.0, working_day)
    }

    /// Combines master data with a forecasted demand.
    pub fn from_spec(spec: &SiteSpec, demand_units: u64) -> Self {
        Self::new(
            &spec.id,
            spec.x,
            spec.y,
            demand_units,
            spec.service_minutes,
            spec.window,
        )
    }

    /// Site identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// X-coordinate.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Y-coordinate.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Units to deliver.
    pub fn demand_units(&self) -> u64 {
        self.demand_units
    }

    /// Unloading time in minutes.
    pub fn service_minutes(&self) -> f64 {
        self.service_minutes
    }

    /// Arrival window.
    pub fn window(&self) -> TimeWindow {
        self.window
    }

    /// Euclidean distance to another site.
    pub fn distance_to(&self, other: &Site) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// The barge operating the route.
///
/// # Examples
///
/// ```
/// use barge_dispatch::routing::{Barge, TimeWindow};
///
/// let barge = Barge::new(200, TimeWindow::new(360.0, 1200.0).unwrap());
/// assert_eq!(barge.capacity_units(), 200);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Barge {
    capacity_units: u64,
    working_hours: TimeWindow,
}

impl Barge {
    /// Creates a barge with the given total capacity and working hours.
    pub fn new(capacity_units: u64, working_hours: TimeWindow) -> Self {
        Self {
            capacity_units,
            working_hours,
        }
    }

    /// Total volumetric capacity in units.
    pub fn capacity_units(&self) -> u64 {
        self.capacity_units
    }

    /// Working-day window; the route departs at its start and must return
    /// before its end.
    pub fn working_hours(&self) -> TimeWindow {
        self.working_hours
    }
}
