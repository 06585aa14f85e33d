use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use venue_forecast::config::PAYBACK_SENTINEL;
use venue_forecast::costs::CostAssumptions;
use venue_forecast::engine::{ForecastEngine, PreparedRequest};
use venue_forecast::series::{SalesHistory, SalesPoint, YearMonth};
use venue_forecast::store::{Location, MemoryLocationStore};

const LAT: f64 = 37.5665;
const LON: f64 = 126.9780;

fn history(sales: &[i64]) -> SalesHistory {
    let start: YearMonth = "2024-01".parse().unwrap();
    let points: Vec<SalesPoint> = sales
        .iter()
        .enumerate()
        .map(|(i, &s)| SalesPoint {
            month: start.plus_months(i as u32),
            sales: s,
        })
        .collect();
    SalesHistory::from_points(&points).unwrap()
}

fn request(sales: &[i64], capex: i64, location: Option<Location>) -> PreparedRequest {
    PreparedRequest {
        history: history(sales),
        capex,
        horizon: 12,
        assumptions: CostAssumptions::default(),
        location,
    }
}

const SIX_MONTHS: [i64; 6] = [
    14_000_000, 15_000_000, 13_000_000, 16_000_000, 17_000_000, 18_000_000,
];

#[tokio::test]
async fn test_forecast_without_location() {
    let store = MemoryLocationStore::new();
    let engine = ForecastEngine::default();
    let report = engine
        .run(&request(&SIX_MONTHS, 30_000_000, None), &store)
        .await
        .unwrap();

    assert_eq!(report.forecast.len(), 12);
    assert!(!report.model.contains("exog"));

    // Months continue the historical axis.
    assert_eq!(report.forecast[0].month.to_string(), "2024-07");
    assert_eq!(report.forecast[11].month.to_string(), "2025-06");

    for row in &report.forecast {
        assert!(row.sales >= 0);
        assert!(row.sales_pi[0] <= row.sales);
        assert!(row.sales <= row.sales_pi[1]);
        assert_eq!(
            row.profit,
            row.sales - (row.cogs + row.labor + row.rent + row.utilities + row.marketing)
        );
    }

    assert!(report.payback_month == PAYBACK_SENTINEL || (1..=12).contains(&report.payback_month));
    assert!((0.0..=0.998).contains(&report.payback_prob_12m));
    assert!(!report.explain.is_empty());
}

#[tokio::test]
async fn test_forecast_with_foot_traffic() {
    let store = MemoryLocationStore::new().with_quarterly(LAT, LON, "2024Q2", 30_000);
    let engine = ForecastEngine::default();
    let report = engine
        .run(
            &request(&SIX_MONTHS, 30_000_000, Some(Location { lat: LAT, lon: LON })),
            &store,
        )
        .await
        .unwrap();

    assert!(report.model.contains("exog"));
    assert!(report
        .explain
        .iter()
        .any(|line| line.contains("30,000")));
    assert!(report
        .explain
        .iter()
        .any(|line| line.contains("quarterly aggregate")));
}

#[tokio::test]
async fn test_long_history_enables_ensemble() {
    // 24 observed months gives the secondary model plenty of training rows.
    let sales: Vec<i64> = (0..24)
        .map(|i| 12_000_000 + 200_000 * i + 400_000 * (i % 3))
        .collect();
    let store = MemoryLocationStore::new();
    let engine = ForecastEngine::default();
    let report = engine
        .run(&request(&sales, 30_000_000, None), &store)
        .await
        .unwrap();

    assert!(report.model.contains("ensemble"));
    assert_eq!(report.forecast.len(), 12);
    // 24 months from 2024-01 end at 2025-12; the forecast continues from there.
    assert_eq!(report.forecast[0].month.to_string(), "2026-01");
    for row in &report.forecast {
        assert!(row.sales_pi[0] <= row.sales && row.sales <= row.sales_pi[1]);
    }
}

#[tokio::test]
async fn test_declining_series_clamps_at_zero() {
    let sales = [9_000_000, 6_000_000, 3_500_000, 1_500_000, 400_000, 50_000];
    let store = MemoryLocationStore::new();
    let engine = ForecastEngine::default();
    let report = engine
        .run(&request(&sales, 30_000_000, None), &store)
        .await
        .unwrap();

    for row in &report.forecast {
        assert!(row.sales >= 0);
        assert!(row.sales_pi[0] >= 0);
        assert!(row.sales_pi[0] <= row.sales && row.sales <= row.sales_pi[1]);
    }
    // Nothing here ever covers fixed costs.
    assert_eq!(report.payback_month, PAYBACK_SENTINEL);
}

#[tokio::test]
async fn test_unreachable_capex_hits_sentinel() {
    let store = MemoryLocationStore::new();
    let engine = ForecastEngine::default();
    let report = engine
        .run(&request(&SIX_MONTHS, 9_000_000_000_000, None), &store)
        .await
        .unwrap();

    assert_eq!(report.payback_month, PAYBACK_SENTINEL);
}

#[tokio::test]
async fn test_tiny_capex_pays_back_in_first_profitable_month() {
    let sales = [40_000_000, 41_000_000, 42_000_000, 43_000_000, 44_000_000, 45_000_000];
    let store = MemoryLocationStore::new();
    let engine = ForecastEngine::default();
    let report = engine.run(&request(&sales, 1, None), &store).await.unwrap();

    assert_eq!(report.payback_month, 1);
    assert!(report.payback_prob_12m <= 0.998);
}

#[tokio::test]
async fn test_seeded_runs_are_reproducible() {
    let store = MemoryLocationStore::new().with_quarterly(LAT, LON, "2024Q2", 30_000);
    let engine = ForecastEngine::default();
    let prepared = request(&SIX_MONTHS, 30_000_000, Some(Location { lat: LAT, lon: LON }));

    let mut rng_a = StdRng::seed_from_u64(1234);
    let mut rng_b = StdRng::seed_from_u64(1234);
    let report_a = engine
        .run_with_rng(&prepared, &store, &mut rng_a)
        .await
        .unwrap();
    let report_b = engine
        .run_with_rng(&prepared, &store, &mut rng_b)
        .await
        .unwrap();

    assert_eq!(report_a, report_b);
}

#[tokio::test]
async fn test_different_seeds_perturb_the_mean() {
    let store = MemoryLocationStore::new();
    let engine = ForecastEngine::default();
    let prepared = request(&SIX_MONTHS, 30_000_000, None);

    let mut rng_a = StdRng::seed_from_u64(1);
    let mut rng_b = StdRng::seed_from_u64(2);
    let report_a = engine
        .run_with_rng(&prepared, &store, &mut rng_a)
        .await
        .unwrap();
    let report_b = engine
        .run_with_rng(&prepared, &store, &mut rng_b)
        .await
        .unwrap();

    let sales_a: Vec<i64> = report_a.forecast.iter().map(|r| r.sales).collect();
    let sales_b: Vec<i64> = report_b.forecast.iter().map(|r| r.sales).collect();
    assert_ne!(sales_a, sales_b);
}

#[tokio::test]
async fn test_gappy_history_still_forecasts() {
    // A hole in the axis: March is missing.
    let points = vec![
        SalesPoint {
            month: "2024-01".parse().unwrap(),
            sales: 14_000_000,
        },
        SalesPoint {
            month: "2024-02".parse().unwrap(),
            sales: 15_000_000,
        },
        SalesPoint {
            month: "2024-04".parse().unwrap(),
            sales: 16_000_000,
        },
        SalesPoint {
            month: "2024-05".parse().unwrap(),
            sales: 17_000_000,
        },
    ];
    let prepared = PreparedRequest {
        history: SalesHistory::from_points(&points).unwrap(),
        capex: 30_000_000,
        horizon: 6,
        assumptions: CostAssumptions::default(),
        location: None,
    };
    let store = MemoryLocationStore::new();
    let engine = ForecastEngine::default();
    let report = engine.run(&prepared, &store).await.unwrap();

    assert_eq!(report.forecast.len(), 6);
    assert_eq!(report.forecast[0].month.to_string(), "2024-06");
}
