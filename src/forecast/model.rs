//! Forecast model contract.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The class of model behind a forecast.
///
/// Ordered by simplicity: a naive forecast has no free parameters, the
/// smoothing model has two or three, the trend model has the most. The
/// selector uses this rank to break error ties in favor of the simpler
/// model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelKind {
    /// Repeat-the-mean fallback.
    Naive,
    /// Level/trend/seasonal exponential smoothing.
    Smoothing,
    /// Differenced autoregressive/moving-average model.
    Trend,
}

/// Common interface for forecast models.
///
/// Object-safe, so candidates can be handled uniformly as
/// `Box<dyn ForecastModel>`.
///
/// # Examples
///
/// ```
/// use barge_dispatch::forecast::{ForecastModel, NaiveFallback};
///
/// let mut model = NaiveFallback::new();
/// model.fit(&[4.0, 6.0]).unwrap();
/// let fc = model.forecast(2).unwrap();
/// assert_eq!(fc, vec![5.0, 5.0]);
/// ```
pub trait ForecastModel {
    /// Fits the model to a weekly series.
    fn fit(&mut self, values: &[f64]) -> Result<()>;

    /// Forecasts the next `horizon` weeks. Fails if the model has not
    /// been fitted.
    fn forecast(&self, horizon: usize) -> Result<Vec<f64>>;

    /// The model class.
    fn kind(&self) -> ModelKind;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_simplicity_order() {
        assert!(ModelKind::Naive < ModelKind::Smoothing);
        assert!(ModelKind::Smoothing < ModelKind::Trend);
    }
}
