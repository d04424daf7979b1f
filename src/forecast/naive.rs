//! Naive fallback forecast.

use crate::error::{PlanError, Result};

use super::model::{ForecastModel, ModelKind};

/// Repeats the training-window mean.
///
/// Used when both candidate models fail on a series (all-zero demand,
/// degenerate fits); the selector flags such results as degraded rather
/// than aborting the run.
#[derive(Debug, Clone, Default)]
pub struct NaiveFallback {
    mean: Option<f64>,
}

impl NaiveFallback {
    /// Creates an unfitted fallback model.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ForecastModel for NaiveFallback {
    fn fit(&mut self, values: &[f64]) -> Result<()> {
        if values.is_empty() {
            return Err(PlanError::EmptyData);
        }
        self.mean = Some(values.iter().sum::<f64>() / values.len() as f64);
        Ok(())
    }

    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        let mean = self.mean.ok_or_else(|| {
            PlanError::ModelFit("naive model must be fitted before forecasting".to_string())
        })?;
        Ok(vec![mean; horizon])
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Naive
    }
}
