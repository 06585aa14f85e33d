//! Error types for the venue_forecast crate

use thiserror::Error;

/// Custom error types for the venue_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Malformed request data (negative sales, bad month strings, bad horizon)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Fewer monthly observations than the pipeline can work with
    #[error("Insufficient history: need at least {min} monthly points, got {got}")]
    InsufficientHistory { min: usize, got: usize },

    /// Location store unreachable or empty. Recovered locally by the
    /// exogenous fallback chain, never a hard failure on its own.
    #[error("Location data unavailable: {0}")]
    DataUnavailable(String),

    /// Primary model failed to fit or produced non-finite output
    #[error("Forecast unavailable: {0}")]
    ForecastUnavailable(String),

    /// Secondary model failed. Internal only: logged, and the pipeline
    /// degrades to primary-model output.
    #[error("Secondary model degraded: {0}")]
    SecondaryModelDegraded(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl ForecastError {
    /// True for errors the surrounding HTTP layer should surface as a
    /// client-side problem rather than a server failure.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ForecastError::InvalidInput(_) | ForecastError::InsufficientHistory { .. }
        )
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::InvalidInput(format!("serialization error: {}", err))
    }
}
