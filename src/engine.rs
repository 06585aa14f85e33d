//! Forecast engine: the end-to-end pipeline for one request
//!
//! Normalizes the history, builds the exogenous signal, fits the primary
//! seasonal model, optionally blends in the bagged-trees secondary model,
//! applies calendar weighting and the monthly random perturbation, clamps
//! and rounds, rolls up costs, and computes the payback figures. One request
//! is one unit of work; nothing is cached or shared between requests.

use crate::config::EngineConfig;
use crate::costs::{compute_costs, CostAssumptions};
use crate::error::Result;
use crate::exog::{ExogBuilder, ExogOutcome};
use crate::models::sarima::SeasonalArima;
use crate::models::trees::BaggedTrees;
use crate::report::{assemble, ForecastReport, ForecastedMonth, ReportContext};
use crate::series::SalesHistory;
use crate::store::{Location, LocationStore};
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use tracing::{debug, warn};

/// A validated forecast request, produced by the ingestion boundary.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub history: SalesHistory,
    /// One-time upfront investment to recover.
    pub capex: i64,
    /// Number of future months to project.
    pub horizon: usize,
    pub assumptions: CostAssumptions,
    pub location: Option<Location>,
}

/// The forecasting pipeline. Construct once and reuse freely: it holds only
/// configuration, so concurrent requests share no mutable state.
#[derive(Debug, Clone, Default)]
pub struct ForecastEngine {
    config: EngineConfig,
}

impl ForecastEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the pipeline with the thread-local RNG. Output is intentionally
    /// non-deterministic across repeated calls with identical input; use
    /// [`ForecastEngine::run_with_rng`] to pin the random source.
    pub async fn run(
        &self,
        request: &PreparedRequest,
        store: &dyn LocationStore,
    ) -> Result<ForecastReport> {
        self.run_with_rng(request, store, &mut rand::thread_rng())
            .await
    }

    /// Run the pipeline with an injected random source, so a deterministic
    /// harness can seed it and get reproducible output.
    pub async fn run_with_rng<R: Rng + ?Sized>(
        &self,
        request: &PreparedRequest,
        store: &dyn LocationStore,
        rng: &mut R,
    ) -> Result<ForecastReport> {
        let history = &request.history;
        let horizon = request.horizon;

        // Exogenous signal over the historical window and the horizon.
        let exog = ExogBuilder::new(self.config.exog.clone())
            .build(store, history.start(), history.len(), horizon, request.location)
            .await;

        // Primary model on the dense series.
        let dense = history.interpolated();
        let fitted = SeasonalArima::new().fit(
            &dense,
            exog.signal.as_ref().map(|s| s.hist.as_slice()),
        )?;
        let primary = fitted.forecast(
            horizon,
            exog.signal.as_ref().map(|s| s.future.as_slice()),
            self.config.interval_alpha,
        )?;

        // Optional secondary model, blended 0.6/0.4. The secondary
        // contributes no interval information; the primary interval is
        // scaled by the blend weight instead.
        let mut mean = primary.mean.clone();
        let mut lower = primary.lower.clone();
        let mut upper = primary.upper.clone();
        let mut ensemble = false;
        match self.secondary_forecast(history, &dense, &exog, horizon, rng) {
            Ok(Some(secondary)) => {
                let alpha = self.config.blend_weight;
                for i in 0..horizon {
                    mean[i] = alpha * primary.mean[i] + (1.0 - alpha) * secondary[i];
                    lower[i] = primary.lower[i] * alpha;
                    upper[i] = primary.upper[i] * alpha;
                }
                ensemble = true;
            }
            Ok(None) => {
                debug!("secondary model skipped: not enough usable training rows");
            }
            Err(err) => {
                warn!(error = %err, "secondary model degraded; using primary output only");
            }
        }

        // Calendar weighting by actual quarter position, then the random
        // monthly perturbation on the mean only.
        let first_month = history.last_month().next();
        let noise = Uniform::new_inclusive(self.config.noise_low, self.config.noise_high);
        let mut rows = Vec::with_capacity(horizon);
        for i in 0..horizon {
            let month = first_month.plus_months(i as u32);
            let weight = self.config.exog.quarter_weights[month.quarter_position()];
            let mut m = mean[i] * weight * noise.sample(rng);
            let mut lo = lower[i] * weight;
            let mut hi = upper[i] * weight;

            // Clamp at zero, then widen the bounds to contain the perturbed
            // mean so the interval invariant survives the noise step.
            m = m.max(0.0);
            lo = lo.max(0.0).min(m);
            hi = hi.max(0.0).max(m);

            let sales = m.floor() as i64;
            let sales_pi = [lo.floor() as i64, hi.ceil() as i64];
            let lines = compute_costs(sales, &request.assumptions)?;
            rows.push(ForecastedMonth::new(month, sales, sales_pi, lines));
        }

        let payback_month = self.payback_month(&rows, request.capex);
        let payback_prob = self.payback_probability(&rows);

        Ok(assemble(
            rows,
            payback_month,
            payback_prob,
            ReportContext {
                assumptions: &request.assumptions,
                exog: &exog,
                exog_coef: fitted.exog_coef(),
                ensemble,
                quarter_weights: self.config.exog.quarter_weights,
                noise_low: self.config.noise_low,
                noise_high: self.config.noise_high,
            },
        ))
    }

    /// Train the bagged trees on lag/calendar/exog features and forecast
    /// recursively. Returns `Ok(None)` when the history cannot support it.
    fn secondary_forecast<R: Rng + ?Sized>(
        &self,
        history: &SalesHistory,
        dense: &[f64],
        exog: &ExogOutcome,
        horizon: usize,
        rng: &mut R,
    ) -> Result<Option<Vec<f64>>> {
        let values = history.values();
        let exog_hist = exog.signal.as_ref().map(|s| s.hist.as_slice());
        let exog_future = exog.signal.as_ref().map(|s| s.future.as_slice());

        // Training rows need the observation and all three lags; rows
        // touching a gap are dropped rather than imputed.
        let mut rows: Vec<Vec<f64>> = Vec::new();
        let mut targets: Vec<f64> = Vec::new();
        for t in 3..values.len() {
            let (Some(y), Some(lag1), Some(lag2), Some(lag3)) =
                (values[t], values[t - 1], values[t - 2], values[t - 3])
            else {
                continue;
            };
            let month = history.month_at(t);
            let ex = exog_hist.map_or(0.0, |x| x[t]);
            rows.push(vec![
                month.month() as f64,
                month.quarter() as f64,
                ex,
                lag1,
                lag2,
                lag3,
            ]);
            targets.push(y);
        }

        if rows.len() < self.config.min_secondary_rows {
            return Ok(None);
        }

        let fitted = BaggedTrees::new(self.config.trees.clone()).fit(&rows, &targets, rng)?;

        // Recursive forecast: seed with the last three known values and roll
        // the window forward one month at a time.
        let first_month = history.last_month().next();
        let mut window: Vec<f64> = dense[dense.len() - 3..].to_vec();
        let mut predictions = Vec::with_capacity(horizon);
        for i in 0..horizon {
            let month = first_month.plus_months(i as u32);
            let ex = exog_future.map_or(0.0, |x| x[i]);
            let row = vec![
                month.month() as f64,
                month.quarter() as f64,
                ex,
                window[2],
                window[1],
                window[0],
            ];
            let predicted = fitted.predict(&row);
            predictions.push(predicted);
            window.push(predicted);
            window.remove(0);
        }

        Ok(Some(predictions))
    }

    /// First 1-based month at which cumulative profit reaches the upfront
    /// investment; the sentinel when total profit is non-positive or the
    /// threshold is never reached within the horizon.
    fn payback_month(&self, rows: &[ForecastedMonth], capex: i64) -> u32 {
        let total: i64 = rows.iter().map(|r| r.profit).sum();
        if total <= 0 {
            return self.config.payback_sentinel;
        }
        let mut cumulative = 0i64;
        for (i, row) in rows.iter().enumerate() {
            cumulative += row.profit;
            if cumulative >= capex {
                return (i + 1) as u32;
            }
        }
        self.config.payback_sentinel
    }

    /// Fraction of the first `min(12, horizon)` months with strictly
    /// positive profit, capped.
    fn payback_probability(&self, rows: &[ForecastedMonth]) -> f64 {
        let window = rows.len().min(12);
        if window == 0 {
            return 0.0;
        }
        let positive = rows[..window].iter().filter(|r| r.profit > 0).count();
        (positive as f64 / window as f64).min(self.config.payback_prob_cap)
    }
}
