//! Weekly demand series and the daily-to-weekly aggregator.
//!
//! Raw sales history arrives as daily `(site, product, date, quantity)`
//! records. The aggregator sums them into ISO-week (Monday-start) buckets,
//! producing one gap-free [`SiteProductSeries`] per site-product pair for
//! the forecasting stage.

mod aggregate;
mod weekly;

pub use aggregate::{aggregate_weekly, Aggregation};
pub use weekly::{week_start_of, SalesRecord, SiteProductSeries};
