//! Wire-facing request types and the validating ingestion boundary
//!
//! One explicit mapping from the external payload shape to the internal
//! types, failing fast on anything unmappable. No per-field key probing:
//! the payload either matches this schema or the request is rejected.

use crate::costs::CostAssumptions;
use crate::engine::PreparedRequest;
use crate::error::{ForecastError, Result};
use crate::series::{SalesHistory, SalesPoint};
use crate::store::Location;
use serde::{Deserialize, Serialize};

fn default_horizon() -> u32 {
    12
}

/// The incoming forecast request as the HTTP layer hands it over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastRequest {
    /// Historical monthly sales, at least three points, oldest first.
    pub series: Vec<SalesPoint>,
    /// One-time upfront investment amount.
    pub capex: i64,
    /// Number of future months to project.
    #[serde(default = "default_horizon")]
    pub horizon_months: u32,
    /// Per-field overrides of the cost assumptions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assumptions: Option<AssumptionOverrides>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

/// Optional per-field overrides; unset fields fall back to the defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssumptionOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cogs_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labor_base: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utilities: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketing: Option<i64>,
}

impl AssumptionOverrides {
    /// Merge the overrides onto the default assumptions.
    pub fn resolve(&self) -> CostAssumptions {
        let defaults = CostAssumptions::default();
        CostAssumptions {
            cogs_rate: self.cogs_rate.unwrap_or(defaults.cogs_rate),
            labor_base: self.labor_base.unwrap_or(defaults.labor_base),
            rent: self.rent.unwrap_or(defaults.rent),
            utilities: self.utilities.unwrap_or(defaults.utilities),
            marketing: self.marketing.unwrap_or(defaults.marketing),
        }
    }
}

impl ForecastRequest {
    /// Validate and map into the engine's request type.
    pub fn prepare(self) -> Result<PreparedRequest> {
        if self.horizon_months == 0 {
            return Err(ForecastError::InvalidInput(
                "horizon_months must be positive".to_string(),
            ));
        }
        if self.capex < 0 {
            return Err(ForecastError::InvalidInput(format!(
                "capex must be non-negative, got {}",
                self.capex
            )));
        }

        let history = SalesHistory::from_points(&self.series)?;

        let assumptions = self
            .assumptions
            .as_ref()
            .map(AssumptionOverrides::resolve)
            .unwrap_or_default();
        if !(0.0..1.0).contains(&assumptions.cogs_rate) {
            return Err(ForecastError::InvalidInput(format!(
                "cogs_rate must be in [0, 1), got {}",
                assumptions.cogs_rate
            )));
        }

        let location = match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Location { lat, lon }),
            (None, None) => None,
            _ => {
                return Err(ForecastError::InvalidInput(
                    "lat and lon must be provided together".to_string(),
                ))
            }
        };

        Ok(PreparedRequest {
            history,
            capex: self.capex,
            horizon: self.horizon_months as usize,
            assumptions,
            location,
        })
    }
}
