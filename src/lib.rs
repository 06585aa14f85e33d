//! # Venue Forecast
//!
//! A Rust library for estimating the financial outlook of a candidate
//! business location: it turns a short historical monthly sales series, plus
//! an optional geographic foot-traffic signal, into a multi-month sales
//! forecast with uncertainty bounds, per-month cost/profit lines, and a
//! payback-period estimate.
//!
//! ## Pipeline
//!
//! - **Exogenous signal** ([`exog`]): a monthly foot-traffic series derived
//!   from quarterly aggregates in the location store, with raw-point and
//!   category-count fallbacks.
//! - **Primary model** ([`models::sarima`]): seasonal ARIMA
//!   (1,1,1)(1,1,1,12), optionally with the foot-traffic regressor.
//! - **Secondary model** ([`models::trees`]): bagged regression trees on
//!   lag/calendar/exog features, blended 0.6/0.4 when enough history exists.
//! - **Cost model** ([`costs`]): fixed cost lines and signed profit per
//!   forecasted month.
//! - **Report** ([`report`]): payback month, payback probability, and
//!   human-readable explanation lines.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use venue_forecast::api::ForecastRequest;
//! use venue_forecast::engine::ForecastEngine;
//! use venue_forecast::store::MemoryLocationStore;
//!
//! # async fn run() -> venue_forecast::Result<()> {
//! let payload = r#"{
//!     "series": [
//!         {"month": "2024-01", "sales": 14000000},
//!         {"month": "2024-02", "sales": 15000000},
//!         {"month": "2024-03", "sales": 13000000}
//!     ],
//!     "capex": 30000000
//! }"#;
//!
//! let request: ForecastRequest = serde_json::from_str(payload)?;
//! let prepared = request.prepare()?;
//!
//! let store = MemoryLocationStore::new();
//! let engine = ForecastEngine::default();
//! let report = engine.run(&prepared, &store).await?;
//!
//! println!("payback month: {}", report.payback_month);
//! # Ok(())
//! # }
//! ```
//!
//! Forecast output is intentionally non-deterministic across repeated calls
//! (a small uniform perturbation is applied to each month); use
//! [`engine::ForecastEngine::run_with_rng`] with a seeded RNG when exact
//! reproducibility is required.

pub mod api;
pub mod config;
pub mod costs;
pub mod engine;
pub mod error;
pub mod exog;
pub mod models;
pub mod report;
pub mod roi;
pub mod series;
pub mod store;

// Re-export commonly used types
pub use crate::api::ForecastRequest;
pub use crate::config::EngineConfig;
pub use crate::costs::{compute_costs, CostAssumptions, CostLines};
pub use crate::engine::{ForecastEngine, PreparedRequest};
pub use crate::error::{ForecastError, Result};
pub use crate::exog::{ExogOutcome, ExogSignal, ExogSource};
pub use crate::report::{ForecastReport, ForecastedMonth};
pub use crate::series::{SalesHistory, SalesPoint, YearMonth};
pub use crate::store::{Location, LocationStore, MemoryLocationStore, PlaceRecord};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
