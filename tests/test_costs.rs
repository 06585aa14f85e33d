use assert_approx_eq::assert_approx_eq;
use pretty_assertions::assert_eq;
use venue_forecast::costs::{compute_costs, CostAssumptions};
use venue_forecast::roi::{simulate_roi, RoiRequest};
use venue_forecast::ForecastError;

#[test]
fn test_cogs_is_floored() {
    let assumptions = CostAssumptions::default();
    let lines = compute_costs(10_000_001, &assumptions).unwrap();

    // 10_000_001 * 0.35 = 3_500_000.35 -> floor
    assert_eq!(lines.cogs, 3_500_000);
}

#[test]
fn test_profit_identity() {
    let assumptions = CostAssumptions::default();
    let sales = 14_000_000;
    let lines = compute_costs(sales, &assumptions).unwrap();

    assert_eq!(
        lines.profit,
        sales - (lines.cogs + lines.labor + lines.rent + lines.utilities + lines.marketing)
    );
}

#[test]
fn test_losses_are_not_clamped() {
    let assumptions = CostAssumptions::default();
    let lines = compute_costs(1_000_000, &assumptions).unwrap();
    assert!(lines.profit < 0);
}

#[test]
fn test_cost_model_is_idempotent() {
    let assumptions = CostAssumptions {
        cogs_rate: 0.42,
        labor_base: 2_500_000,
        rent: 1_200_000,
        utilities: 400_000,
        marketing: 150_000,
    };
    let first = compute_costs(9_876_543, &assumptions).unwrap();
    let second = compute_costs(9_876_543, &assumptions).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_negative_sales_rejected() {
    let result = compute_costs(-1, &CostAssumptions::default());
    assert!(matches!(
        result.unwrap_err(),
        ForecastError::InvalidInput(_)
    ));
}

#[test]
fn test_roi_simulation() {
    let request = RoiRequest {
        monthly_sales: 20_000_000,
        rent: 1_500_000,
        cogs_rate: 0.35,
        labor: 3_000_000,
        other_cost: 500_000,
        capex: 30_000_000,
    };
    let outcome = simulate_roi(&request).unwrap();

    // cogs = 7_000_000, opex = 12_000_000, profit = 8_000_000
    assert_eq!(outcome.monthly_profit, 8_000_000);
    assert_eq!(outcome.payback_month, 3);
    assert_approx_eq!(outcome.margin_rate, 0.4, 1e-9);
}

#[test]
fn test_roi_unprofitable_hits_sentinel() {
    let request = RoiRequest {
        monthly_sales: 5_000_000,
        rent: 2_000_000,
        cogs_rate: 0.35,
        labor: 3_000_000,
        other_cost: 500_000,
        capex: 30_000_000,
    };
    let outcome = simulate_roi(&request).unwrap();

    assert!(outcome.monthly_profit < 0);
    assert_eq!(outcome.payback_month, 999);
}

#[test]
fn test_roi_rejects_non_positive_sales() {
    let request = RoiRequest {
        monthly_sales: 0,
        rent: 1_000_000,
        cogs_rate: 0.35,
        labor: 3_000_000,
        other_cost: 500_000,
        capex: 30_000_000,
    };
    assert!(matches!(
        simulate_roi(&request).unwrap_err(),
        ForecastError::InvalidInput(_)
    ));
}
