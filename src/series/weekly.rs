//! Site-product weekly series types.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// A single daily sales observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// Delivery site identifier.
    pub site_id: String,
    /// Product identifier.
    pub product_id: String,
    /// Calendar date of the sale.
    pub date: NaiveDate,
    /// Units sold on that date.
    pub quantity: f64,
}

impl SalesRecord {
    /// Creates a new record.
    pub fn new(site_id: &str, product_id: &str, date: NaiveDate, quantity: f64) -> Self {
        Self {
            site_id: site_id.to_string(),
            product_id: product_id.to_string(),
            date,
            quantity,
        }
    }
}

/// Returns the Monday of the ISO week containing `date`.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use barge_dispatch::series::week_start_of;
///
/// let thursday = NaiveDate::from_ymd_opt(2026, 4, 16).unwrap();
/// let monday = NaiveDate::from_ymd_opt(2026, 4, 13).unwrap();
/// assert_eq!(week_start_of(thursday), monday);
/// assert_eq!(week_start_of(monday), monday);
/// ```
pub fn week_start_of(date: NaiveDate) -> NaiveDate {
    let back = date.weekday().num_days_from_monday() as u64;
    date - Days::new(back)
}

/// One site-product weekly demand series.
///
/// Week starts are strictly increasing Mondays with no gaps: weeks with no
/// recorded sales carry an explicit zero, keeping the series regular for
/// both forecast model classes.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use barge_dispatch::series::SiteProductSeries;
///
/// let start = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
/// let s = SiteProductSeries::new("S01", "P1", start, vec![3.0, 0.0, 5.0]).unwrap();
/// assert_eq!(s.len(), 3);
/// assert_eq!(s.next_week(), NaiveDate::from_ymd_opt(2026, 1, 26).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SiteProductSeries {
    site_id: String,
    product_id: String,
    first_week: NaiveDate,
    quantities: Vec<f64>,
}

impl SiteProductSeries {
    /// Creates a series from its first week start and consecutive weekly
    /// quantities.
    ///
    /// Returns `None` if `first_week` is not a Monday, the quantities are
    /// empty, or any quantity is non-finite or negative.
    pub fn new(
        site_id: &str,
        product_id: &str,
        first_week: NaiveDate,
        quantities: Vec<f64>,
    ) -> Option<Self> {
        if week_start_of(first_week) != first_week || quantities.is_empty() {
            return None;
        }
        if quantities.iter().any(|q| !q.is_finite() || *q < 0.0) {
            return None;
        }
        Some(Self {
            site_id: site_id.to_string(),
            product_id: product_id.to_string(),
            first_week,
            quantities,
        })
    }

    /// Site identifier.
    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    /// Product identifier.
    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    /// Number of weeks in the series.
    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    /// Returns `true` if the series has no weeks.
    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    /// Weekly quantities in chronological order.
    pub fn quantities(&self) -> &[f64] {
        &self.quantities
    }

    /// Monday of the first week.
    pub fn first_week(&self) -> NaiveDate {
        self.first_week
    }

    /// Monday of the last observed week.
    pub fn last_week(&self) -> NaiveDate {
        self.first_week + Days::new(7 * (self.quantities.len() as u64 - 1))
    }

    /// Monday of the week immediately after the last observed week, i.e.
    /// the first forecastable week.
    pub fn next_week(&self) -> NaiveDate {
        self.last_week() + Days::new(7)
    }

    /// Splits the series into a training head and a holdout tail of
    /// `holdout` weeks. A holdout of zero (or one exceeding the series
    /// length) yields an empty tail.
    pub fn train_holdout(&self, holdout: usize) -> (&[f64], &[f64]) {
        if holdout == 0 || holdout >= self.quantities.len() {
            return (&self.quantities, &[]);
        }
        self.quantities.split_at(self.quantities.len() - holdout)
    }
}
