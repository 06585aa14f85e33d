//! Monthly cost model: turns a sales figure into fixed cost and profit lines

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};

/// Cost assumptions applied to every forecasted month.
///
/// Immutable per forecast run. Amounts are in currency units; the defaults
/// match a small single-location retail operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostAssumptions {
    /// Fraction of sales spent on cost of goods.
    pub cogs_rate: f64,
    /// Fixed monthly labor cost.
    pub labor_base: i64,
    /// Fixed monthly rent.
    pub rent: i64,
    /// Fixed monthly utilities.
    pub utilities: i64,
    /// Fixed monthly marketing spend.
    pub marketing: i64,
}

impl Default for CostAssumptions {
    fn default() -> Self {
        Self {
            cogs_rate: 0.35,
            labor_base: 3_200_000,
            rent: 1_500_000,
            utilities: 500_000,
            marketing: 200_000,
        }
    }
}

/// Cost breakdown for a single month of sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostLines {
    pub cogs: i64,
    pub labor: i64,
    pub rent: i64,
    pub utilities: i64,
    pub marketing: i64,
    /// Signed; a loss-making month is not clamped.
    pub profit: i64,
}

/// Compute the cost breakdown for one month of sales.
///
/// Pure: identical inputs always yield identical lines.
/// `cogs = floor(sales * cogs_rate)` and
/// `profit = sales - (cogs + labor + rent + utilities + marketing)`.
pub fn compute_costs(sales: i64, assumptions: &CostAssumptions) -> Result<CostLines> {
    if sales < 0 {
        return Err(ForecastError::InvalidInput(format!(
            "sales must be non-negative, got {}",
            sales
        )));
    }

    let cogs = (sales as f64 * assumptions.cogs_rate).floor() as i64;
    let fixed =
        assumptions.labor_base + assumptions.rent + assumptions.utilities + assumptions.marketing;

    Ok(CostLines {
        cogs,
        labor: assumptions.labor_base,
        rent: assumptions.rent,
        utilities: assumptions.utilities,
        marketing: assumptions.marketing,
        profit: sales - (cogs + fixed),
    })
}
