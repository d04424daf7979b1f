//! Travel time and distance matrix.
//!
//! Travel data comes from an external provider; the matrix only shapes it
//! for the solver and is built once per optimization run. The diagonal is
//! zero and never consulted. A missing or non-finite leg to or from the
//! depot fails the run with `UnreachableSite`; a missing leg between two
//! non-depot sites is stored as infinite and excluded by feasibility
//! checking instead.

use crate::error::{PlanError, Result};

use super::site::Site;

/// Supplies pairwise travel legs. The planner treats this as an external
/// collaborator (a geospatial routing service, a lookup table, ...).
pub trait TravelTimeProvider {
    /// Travel `(minutes, distance)` from one site to another, or `None`
    /// when the pair cannot be connected.
    fn leg(&self, from: &Site, to: &Site) -> Option<(f64, f64)>;
}

/// Straight-line provider: distance is Euclidean, duration is distance
/// divided by a constant speed. Useful for tests and open water.
#[derive(Debug, Clone)]
pub struct EuclideanProvider {
    speed: f64,
}

impl EuclideanProvider {
    /// Creates a provider with the given speed in distance units per minute.
    ///
    /// Returns `None` if `speed` is not strictly positive and finite.
    pub fn new(speed: f64) -> Option<Self> {
        if !speed.is_finite() || speed <= 0.0 {
            return None;
        }
        Some(Self { speed })
    }

    /// Unit-speed provider: travel minutes equal distance.
    pub fn unit_speed() -> Self {
        Self { speed: 1.0 }
    }
}

impl TravelTimeProvider for EuclideanProvider {
    fn leg(&self, from: &Site, to: &Site) -> Option<(f64, f64)> {
        let distance = from.distance_to(to);
        Some((distance / self.speed, distance))
    }
}

/// Dense travel matrix over a run's sites (index 0 = depot).
///
/// # Examples
///
/// ```
/// use barge_dispatch::routing::{EuclideanProvider, Site, TimeWindow, TravelMatrix};
///
/// let day = TimeWindow::new(0.0, 1440.0).unwrap();
/// let sites = vec![
///     Site::depot("PORT0", 0.0, 0.0, day),
///     Site::new("S01", 3.0, 4.0, 10, 15.0, day),
/// ];
/// let matrix = TravelMatrix::build(&EuclideanProvider::unit_speed(), &sites).unwrap();
/// assert!((matrix.duration(0, 1) - 5.0).abs() < 1e-10);
/// assert_eq!(matrix.duration(1, 1), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct TravelMatrix {
    durations: Vec<f64>,
    distances: Vec<f64>,
    size: usize,
}

impl TravelMatrix {
    /// Builds the matrix by querying the provider for every ordered pair.
    ///
    /// Fails with [`PlanError::UnreachableSite`] when a depot leg is
    /// missing or non-finite.
    pub fn build(provider: &dyn TravelTimeProvider, sites: &[Site]) -> Result<Self> {
        let n = sites.len();
        let mut matrix = Self {
            durations: vec![0.0; n * n],
            distances: vec![0.0; n * n],
            size: n,
        };

        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let leg = provider
                    .leg(&sites[i], &sites[j])
                    .filter(|(d, t)| d.is_finite() && t.is_finite() && *d >= 0.0 && *t >= 0.0);
                match leg {
                    Some((minutes, distance)) => {
                        matrix.durations[i * n + j] = minutes;
                        matrix.distances[i * n + j] = distance;
                    }
                    None if i == 0 || j == 0 => {
                        let site = if i == 0 { &sites[j] } else { &sites[i] };
                        return Err(PlanError::UnreachableSite {
                            site_id: site.id().to_string(),
                        });
                    }
                    None => {
                        matrix.durations[i * n + j] = f64::INFINITY;
                        matrix.distances[i * n + j] = f64::INFINITY;
                    }
                }
            }
        }
        Ok(matrix)
    }

    /// Travel minutes from site `from` to site `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn duration(&self, from: usize, to: usize) -> f64 {
        self.durations[from * self.size + to]
    }

    /// Travel distance from site `from` to site `to`.
    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distances[from * self.size + to]
    }

    /// Number of sites covered, depot included.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if durations are symmetric within `tol`.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if (self.duration(i, j) - self.duration(j, i)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }
}
