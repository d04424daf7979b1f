//! Daily-to-weekly aggregation.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use tracing::debug;

use crate::error::{PlanError, Result};

use super::{week_start_of, SalesRecord, SiteProductSeries};

/// Output of the weekly aggregator.
///
/// Series that fail the minimum-history check are reported in `skipped`
/// rather than aborting the run; one short series must not block the rest.
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// Gap-free weekly series, ordered by (site_id, product_id).
    pub series: Vec<SiteProductSeries>,
    /// Per-series rejections, each an `InsufficientHistory` error.
    pub skipped: Vec<PlanError>,
}

/// Aggregates daily sales records into weekly site-product series.
///
/// Quantities falling in the same ISO week are summed. Weeks with no
/// recorded sales between a series' first and last observed week are filled
/// with zero, so every series is regular. Series shorter than `min_weeks`
/// are skipped with an [`PlanError::InsufficientHistory`] entry.
///
/// Returns [`PlanError::EmptyData`] when `records` is empty.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use barge_dispatch::series::{aggregate_weekly, SalesRecord};
///
/// let d = |day| NaiveDate::from_ymd_opt(2026, 3, day).unwrap();
/// let records = vec![
///     SalesRecord::new("S01", "P1", d(2), 3.0),  // week of Mar 2
///     SalesRecord::new("S01", "P1", d(5), 4.0),  // same week
///     SalesRecord::new("S01", "P1", d(16), 2.0), // week of Mar 16, gap before
/// ];
/// let agg = aggregate_weekly(&records, 1).unwrap();
/// assert_eq!(agg.series.len(), 1);
/// assert_eq!(agg.series[0].quantities(), &[7.0, 0.0, 2.0]);
/// ```
pub fn aggregate_weekly(records: &[SalesRecord], min_weeks: usize) -> Result<Aggregation> {
    if records.is_empty() {
        return Err(PlanError::EmptyData);
    }

    // Group by key, then bucket by week start. BTreeMap keeps both the
    // series order and the week order deterministic.
    let mut buckets: BTreeMap<(String, String), BTreeMap<NaiveDate, f64>> = BTreeMap::new();
    for record in records {
        let key = (record.site_id.clone(), record.product_id.clone());
        let week = week_start_of(record.date);
        *buckets.entry(key).or_default().entry(week).or_insert(0.0) += record.quantity;
    }

    let mut series = Vec::new();
    let mut skipped = Vec::new();

    for ((site_id, product_id), weeks) in buckets {
        let (first, last) = match (weeks.keys().next(), weeks.keys().next_back()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => continue,
        };

        let mut quantities = Vec::new();
        let mut week = first;
        while week <= last {
            quantities.push(weeks.get(&week).copied().unwrap_or(0.0));
            week = week + Days::new(7);
        }

        if quantities.len() < min_weeks {
            debug!(
                %site_id,
                %product_id,
                weeks = quantities.len(),
                min_weeks,
                "skipping series with insufficient history"
            );
            skipped.push(PlanError::InsufficientHistory {
                site_id,
                product_id,
                needed: min_weeks,
                got: quantities.len(),
            });
            continue;
        }

        let s = SiteProductSeries::new(&site_id, &product_id, first, quantities).ok_or_else(
            || PlanError::InvalidParameter(format!("malformed series for {site_id}/{product_id}")),
        )?;
        series.push(s);
    }

    Ok(Aggregation { series, skipped })
}
