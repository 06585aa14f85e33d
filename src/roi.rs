//! Quick single-month ROI simulation
//!
//! A flat what-if calculation alongside the full forecasting pipeline: given
//! steady monthly sales and costs, how profitable is a month and how long
//! until the upfront investment is recovered.

use crate::config::PAYBACK_SENTINEL;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiRequest {
    pub monthly_sales: i64,
    pub rent: i64,
    #[serde(default = "default_cogs_rate")]
    pub cogs_rate: f64,
    #[serde(default = "default_labor")]
    pub labor: i64,
    #[serde(default = "default_other_cost")]
    pub other_cost: i64,
    #[serde(default = "default_capex")]
    pub capex: i64,
}

fn default_cogs_rate() -> f64 {
    0.35
}

fn default_labor() -> i64 {
    3_000_000
}

fn default_other_cost() -> i64 {
    500_000
}

fn default_capex() -> i64 {
    30_000_000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiOutcome {
    pub monthly_profit: i64,
    /// Months until the investment is recovered, or the sentinel when the
    /// operation never turns a profit.
    pub payback_month: u32,
    /// Profit as a fraction of sales, rounded to three decimals.
    pub margin_rate: f64,
}

/// Run the flat simulation.
pub fn simulate_roi(request: &RoiRequest) -> Result<RoiOutcome> {
    if request.monthly_sales <= 0 {
        return Err(ForecastError::InvalidInput(format!(
            "monthly_sales must be positive, got {}",
            request.monthly_sales
        )));
    }

    let cogs = (request.monthly_sales as f64 * request.cogs_rate) as i64;
    let opex = request.rent + request.labor + request.other_cost + cogs;
    let profit = request.monthly_sales - opex;
    let margin = profit as f64 / request.monthly_sales as f64;

    let payback_month = if profit > 0 {
        (request.capex / profit.max(1)).max(1) as u32
    } else {
        PAYBACK_SENTINEL
    };

    Ok(RoiOutcome {
        monthly_profit: profit,
        payback_month,
        margin_rate: (margin * 1000.0).round() / 1000.0,
    })
}
