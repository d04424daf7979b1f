//! Error types for the barge-dispatch pipeline.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for planner operations.
pub type Result<T> = std::result::Result<T, PlanError>;

/// Errors that can occur while aggregating history or fitting forecast models.
///
/// Per-series errors (`InsufficientHistory`, `ModelFit`) are isolated by the
/// pipeline: one failing site-product does not abort the others. The routing
/// stage surfaces `UnreachableSite` for the whole run, since a missing travel
/// edge invalidates every candidate route.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum PlanError {
    /// Input record set is empty.
    #[error("empty input data")]
    EmptyData,

    /// Too few weeks of history to support a holdout split plus model fitting.
    #[error("insufficient history for site {site_id} product {product_id}: need at least {needed} weeks, got {got}")]
    InsufficientHistory {
        site_id: String,
        product_id: String,
        needed: usize,
        got: usize,
    },

    /// A forecast model failed to fit (degenerate series, singular estimate).
    #[error("model fit failed: {0}")]
    ModelFit(String),

    /// The travel-time provider cannot connect a site to the depot.
    #[error("site {site_id} is unreachable from the depot")]
    UnreachableSite { site_id: String },

    /// Invalid configuration or parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = PlanError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = PlanError::InsufficientHistory {
            site_id: "S01".to_string(),
            product_id: "P7".to_string(),
            needed: 16,
            got: 5,
        };
        assert_eq!(
            err.to_string(),
            "insufficient history for site S01 product P7: need at least 16 weeks, got 5"
        );

        let err = PlanError::UnreachableSite {
            site_id: "S09".to_string(),
        };
        assert_eq!(err.to_string(), "site S09 is unreachable from the depot");
    }

    #[test]
    fn test_errors_clone_and_compare() {
        let err = PlanError::ModelFit("all-zero series".to_string());
        assert_eq!(err, err.clone());
    }
}
