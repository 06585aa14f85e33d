//! Forecasting models used by the engine

use crate::error::{ForecastError, Result};

pub mod sarima;
pub mod trees;

/// Point forecast with a two-sided confidence interval.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalForecast {
    pub mean: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

impl IntervalForecast {
    pub fn new(mean: Vec<f64>, lower: Vec<f64>, upper: Vec<f64>) -> Result<Self> {
        if mean.len() != lower.len() || mean.len() != upper.len() {
            return Err(ForecastError::ForecastUnavailable(format!(
                "interval lengths diverge: mean {}, lower {}, upper {}",
                mean.len(),
                lower.len(),
                upper.len()
            )));
        }
        Ok(Self { mean, lower, upper })
    }

    pub fn horizon(&self) -> usize {
        self.mean.len()
    }
}
