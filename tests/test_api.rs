use assert_approx_eq::assert_approx_eq;
use pretty_assertions::assert_eq;
use venue_forecast::api::ForecastRequest;
use venue_forecast::engine::ForecastEngine;
use venue_forecast::store::MemoryLocationStore;
use venue_forecast::ForecastError;

fn base_payload() -> serde_json::Value {
    serde_json::json!({
        "series": [
            {"month": "2024-01", "sales": 14_000_000},
            {"month": "2024-02", "sales": 15_000_000},
            {"month": "2024-03", "sales": 13_000_000},
            {"month": "2024-04", "sales": 16_000_000},
            {"month": "2024-05", "sales": 17_000_000},
            {"month": "2024-06", "sales": 18_000_000}
        ],
        "capex": 30_000_000
    })
}

fn parse(payload: serde_json::Value) -> ForecastRequest {
    serde_json::from_value(payload).unwrap()
}

#[test]
fn test_minimal_payload_defaults() {
    let request = parse(base_payload());
    assert_eq!(request.horizon_months, 12);
    assert!(request.assumptions.is_none());
    assert!(request.lat.is_none());

    let prepared = request.prepare().unwrap();
    assert_eq!(prepared.horizon, 12);
    assert_eq!(prepared.capex, 30_000_000);
    assert!(prepared.location.is_none());
    assert_approx_eq!(prepared.assumptions.cogs_rate, 0.35, 1e-12);
    assert_eq!(prepared.assumptions.labor_base, 3_200_000);
    assert_eq!(prepared.assumptions.rent, 1_500_000);
    assert_eq!(prepared.assumptions.utilities, 500_000);
    assert_eq!(prepared.assumptions.marketing, 200_000);
}

#[test]
fn test_partial_assumption_overrides() {
    let mut payload = base_payload();
    payload["assumptions"] = serde_json::json!({"cogs_rate": 0.40, "rent": 2_000_000});

    let prepared = parse(payload).prepare().unwrap();
    assert_approx_eq!(prepared.assumptions.cogs_rate, 0.40, 1e-12);
    assert_eq!(prepared.assumptions.rent, 2_000_000);
    // Untouched fields keep their defaults.
    assert_eq!(prepared.assumptions.labor_base, 3_200_000);
    assert_eq!(prepared.assumptions.marketing, 200_000);
}

#[test]
fn test_location_requires_both_coordinates() {
    let mut payload = base_payload();
    payload["lat"] = serde_json::json!(37.5665);
    let result = parse(payload).prepare();
    assert!(matches!(
        result.unwrap_err(),
        ForecastError::InvalidInput(_)
    ));

    let mut payload = base_payload();
    payload["lat"] = serde_json::json!(37.5665);
    payload["lon"] = serde_json::json!(126.9780);
    let prepared = parse(payload).prepare().unwrap();
    assert!(prepared.location.is_some());
}

#[test]
fn test_zero_horizon_rejected() {
    let mut payload = base_payload();
    payload["horizon_months"] = serde_json::json!(0);
    assert!(parse(payload).prepare().is_err());
}

#[test]
fn test_negative_capex_rejected() {
    let mut payload = base_payload();
    payload["capex"] = serde_json::json!(-1);
    assert!(parse(payload).prepare().is_err());
}

#[test]
fn test_out_of_range_cogs_rate_rejected() {
    let mut payload = base_payload();
    payload["assumptions"] = serde_json::json!({"cogs_rate": 1.0});
    let result = parse(payload).prepare();
    assert!(matches!(
        result.unwrap_err(),
        ForecastError::InvalidInput(_)
    ));
}

#[test]
fn test_short_series_rejected() {
    let payload = serde_json::json!({
        "series": [
            {"month": "2024-01", "sales": 14_000_000},
            {"month": "2024-02", "sales": 15_000_000}
        ],
        "capex": 30_000_000
    });
    let result = parse(payload).prepare();
    assert!(matches!(
        result.unwrap_err(),
        ForecastError::InsufficientHistory { min: 3, got: 2 }
    ));
}

#[test]
fn test_malformed_month_fails_deserialization() {
    let payload = serde_json::json!({
        "series": [
            {"month": "2024/01", "sales": 14_000_000},
            {"month": "2024-02", "sales": 15_000_000},
            {"month": "2024-03", "sales": 13_000_000}
        ],
        "capex": 30_000_000
    });
    assert!(serde_json::from_value::<ForecastRequest>(payload).is_err());
}

#[tokio::test]
async fn test_report_wire_shape() {
    let prepared = parse(base_payload()).prepare().unwrap();
    let store = MemoryLocationStore::new();
    let report = ForecastEngine::default().run(&prepared, &store).await.unwrap();

    let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

    assert_eq!(value["forecast"].as_array().unwrap().len(), 12);
    let first = &value["forecast"][0];
    assert_eq!(first["month"], "2024-07");
    for key in [
        "sales",
        "sales_pi",
        "cogs",
        "labor",
        "rent",
        "utilities",
        "marketing",
        "profit",
    ] {
        assert!(first.get(key).is_some(), "missing key {key}");
    }
    assert_eq!(first["sales_pi"].as_array().unwrap().len(), 2);

    assert!(value.get("payback_month").is_some());
    assert!(value.get("payback_prob_12m").is_some());
    assert!(value["model"].as_str().unwrap().contains("SARIMA"));
    assert!(value["explain"].as_array().unwrap().len() >= 3);
}
