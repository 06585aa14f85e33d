//! Seasonal ARIMA primary model
//!
//! Fixed (1,1,1)(1,1,1,12) order, with an optional exogenous regressor
//! handled as regression-with-ARIMA-errors: the slope is estimated by
//! ordinary least squares without an intercept (the exogenous level subsumes
//! it), and the ARMA structure is estimated on the residual series by a
//! Hannan-Rissanen style two-stage least-squares fit. Estimation is
//! deliberately pragmatic rather than full maximum likelihood: short series
//! must fit, so stationarity and invertibility are not strictly enforced and
//! seasonal terms are dropped automatically when the series is too short to
//! support them.

use crate::error::{ForecastError, Result};
use crate::models::IntervalForecast;
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

/// Seasonal period in months.
const SEASON: usize = 12;

/// Coefficients are clamped into this band so long-horizon recursions stay
/// bounded without rejecting a fit outright.
const COEF_BAND: f64 = 0.99;

/// Seasonal ARIMA model specification. The order is fixed; construct and
/// call [`SeasonalArima::fit`].
#[derive(Debug, Clone, Default)]
pub struct SeasonalArima;

/// A fitted seasonal ARIMA model ready to forecast.
#[derive(Debug, Clone)]
pub struct FittedSeasonalArima {
    phi: f64,
    theta: f64,
    seasonal_phi: f64,
    seasonal_theta: f64,
    sigma2: f64,
    beta: Option<f64>,
    seasonal: bool,
    /// Regression-adjusted series (observations minus the exogenous term).
    z: Vec<f64>,
    /// Differenced series the ARMA recursion runs on.
    w: Vec<f64>,
    /// Innovations aligned to `w`.
    residuals: Vec<f64>,
}

impl SeasonalArima {
    pub fn new() -> Self {
        Self
    }

    /// Fit to a dense monthly series, optionally with an aligned exogenous
    /// regressor.
    pub fn fit(&self, y: &[f64], exog: Option<&[f64]>) -> Result<FittedSeasonalArima> {
        if y.len() < 3 {
            return Err(ForecastError::InsufficientHistory {
                min: 3,
                got: y.len(),
            });
        }
        if let Some(x) = exog {
            if x.len() != y.len() {
                return Err(ForecastError::InvalidInput(format!(
                    "exogenous series length {} does not match history length {}",
                    x.len(),
                    y.len()
                )));
            }
        }

        // Exogenous slope by OLS through the origin.
        let beta = exog.and_then(|x| {
            let sxx: f64 = x.iter().map(|v| v * v).sum();
            if sxx > 0.0 {
                let sxy: f64 = x.iter().zip(y).map(|(a, b)| a * b).sum();
                Some(sxy / sxx)
            } else {
                None
            }
        });

        let z: Vec<f64> = match (beta, exog) {
            (Some(b), Some(x)) => y.iter().zip(x).map(|(v, e)| v - b * e).collect(),
            _ => y.to_vec(),
        };

        // Seasonal differencing needs a full cycle plus headroom.
        let seasonal = z.len() >= SEASON + 3;
        let w = difference(&z, seasonal);
        let (phi, theta, seasonal_phi, seasonal_theta) = estimate_arma(&w, seasonal);
        let residuals = innovations(&w, phi, theta, seasonal_phi, seasonal_theta);

        let sigma2 = if residuals.is_empty() {
            0.0
        } else {
            residuals.iter().map(|e| e * e).sum::<f64>() / residuals.len() as f64
        };

        if ![phi, theta, seasonal_phi, seasonal_theta, sigma2]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(ForecastError::ForecastUnavailable(
                "estimation produced non-finite parameters".to_string(),
            ));
        }

        debug!(
            phi,
            theta, seasonal_phi, seasonal_theta, sigma2, seasonal, "seasonal ARIMA fitted"
        );

        Ok(FittedSeasonalArima {
            phi,
            theta,
            seasonal_phi,
            seasonal_theta,
            sigma2,
            beta,
            seasonal,
            z,
            w,
            residuals,
        })
    }
}

impl FittedSeasonalArima {
    /// Estimated exogenous regression coefficient, if one was fitted.
    pub fn exog_coef(&self) -> Option<f64> {
        self.beta
    }

    /// Forecast `horizon` months ahead with a two-sided `alpha` interval.
    pub fn forecast(
        &self,
        horizon: usize,
        future_exog: Option<&[f64]>,
        alpha: f64,
    ) -> Result<IntervalForecast> {
        if horizon == 0 {
            return Err(ForecastError::InvalidInput(
                "forecast horizon must be positive".to_string(),
            ));
        }
        if let (Some(_), Some(x)) = (self.beta, future_exog) {
            if x.len() < horizon {
                return Err(ForecastError::InvalidInput(format!(
                    "future exogenous series length {} is shorter than horizon {}",
                    x.len(),
                    horizon
                )));
            }
        }

        // Extend the differenced series recursively; future innovations are
        // their expectation, zero.
        let n_w = self.w.len();
        let mut w_ext = self.w.clone();
        let mut e_ext = self.residuals.clone();
        for _ in 0..horizon {
            let t = w_ext.len();
            let mut next = self.phi * lag(&w_ext, t, 1) + self.theta * lag(&e_ext, t, 1);
            if self.seasonal {
                next += self.seasonal_phi * lag(&w_ext, t, SEASON)
                    + self.seasonal_theta * lag(&e_ext, t, SEASON);
            }
            w_ext.push(next);
            e_ext.push(0.0);
        }

        // Invert the differencing back onto the observation scale.
        let n_z = self.z.len();
        let mut z_ext = self.z.clone();
        for h in 0..horizon {
            let t = z_ext.len();
            let w_fut = w_ext[n_w + h];
            let next = if self.seasonal {
                w_fut + z_ext[t - 1] + z_ext[t - SEASON] - z_ext[t - SEASON - 1]
            } else {
                w_fut + z_ext[t - 1]
            };
            z_ext.push(next);
        }

        let mean: Vec<f64> = (0..horizon)
            .map(|h| {
                let base = z_ext[n_z + h];
                match (self.beta, future_exog) {
                    (Some(b), Some(x)) => base + b * x[h],
                    _ => base,
                }
            })
            .collect();

        // Interval half-widths from the innovation variance and cumulated
        // psi-weights; the seasonal contribution to the variance is ignored,
        // which slightly understates very long horizons.
        let normal = Normal::new(0.0, 1.0).map_err(|e| {
            ForecastError::ForecastUnavailable(format!("normal quantile unavailable: {}", e))
        })?;
        let z_alpha = normal.inverse_cdf(1.0 - alpha / 2.0);

        let mut psi = vec![0.0; horizon + 1];
        psi[0] = 1.0;
        for j in 1..=horizon {
            psi[j] = self.phi * psi[j - 1] + if j == 1 { self.theta } else { 0.0 };
        }
        // Integrate once for the d=1 differencing.
        let mut cum = vec![0.0; horizon + 1];
        let mut acc = 0.0;
        for (j, p) in psi.iter().enumerate() {
            acc += p;
            cum[j] = acc;
        }

        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        let mut var_acc = 0.0;
        for (h, m) in mean.iter().enumerate() {
            var_acc += cum[h] * cum[h];
            let half = z_alpha * (self.sigma2 * var_acc).sqrt();
            lower.push(m - half);
            upper.push(m + half);
        }

        if !mean.iter().chain(&lower).chain(&upper).all(|v| v.is_finite()) {
            return Err(ForecastError::ForecastUnavailable(
                "forecast produced non-finite values".to_string(),
            ));
        }

        IntervalForecast::new(mean, lower, upper)
    }
}

/// Read the `k`-step lag ending just before index `t`, zero when unavailable.
fn lag(values: &[f64], t: usize, k: usize) -> f64 {
    if t >= k {
        values[t - k]
    } else {
        0.0
    }
}

/// Apply D=1 seasonal differencing (when enabled) followed by d=1 regular
/// differencing.
fn difference(z: &[f64], seasonal: bool) -> Vec<f64> {
    let stage: Vec<f64> = if seasonal {
        z.windows(SEASON + 1).map(|w| w[SEASON] - w[0]).collect()
    } else {
        z.to_vec()
    };
    stage.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Hannan-Rissanen two-stage estimate of (phi, theta, seasonal_phi,
/// seasonal_theta) on the differenced series. Shrinks to fewer terms when
/// the series cannot support them; never fails outright.
fn estimate_arma(w: &[f64], seasonal: bool) -> (f64, f64, f64, f64) {
    if w.len() < 2 {
        return (0.0, 0.0, 0.0, 0.0);
    }

    // Stage 1: AR(1) by lag-1 autocorrelation, residuals from it.
    let den: f64 = w.iter().map(|v| v * v).sum();
    let num: f64 = w.windows(2).map(|p| p[0] * p[1]).sum();
    let phi0 = if den > 0.0 {
        (num / den).clamp(-COEF_BAND, COEF_BAND)
    } else {
        0.0
    };
    let mut e0 = vec![0.0; w.len()];
    for t in 1..w.len() {
        e0[t] = w[t] - phi0 * w[t - 1];
    }

    // Stage 2: least squares of w[t] on lagged values and stage-1 residuals.
    let use_seasonal = seasonal && w.len() > SEASON + 4;
    let k = if use_seasonal { 4 } else { 2 };
    let start = if use_seasonal { SEASON } else { 1 };
    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut targets: Vec<f64> = Vec::new();
    for t in start..w.len() {
        let mut row = vec![w[t - 1], e0[t - 1]];
        if use_seasonal {
            row.push(w[t - SEASON]);
            row.push(e0[t - SEASON]);
        }
        rows.push(row);
        targets.push(w[t]);
    }

    if rows.len() <= k {
        return (phi0, 0.0, 0.0, 0.0);
    }

    match least_squares(&rows, &targets, k) {
        Some(coef) => {
            let phi = coef[0].clamp(-COEF_BAND, COEF_BAND);
            let theta = coef[1].clamp(-COEF_BAND, COEF_BAND);
            let (sphi, stheta) = if use_seasonal {
                (
                    coef[2].clamp(-COEF_BAND, COEF_BAND),
                    coef[3].clamp(-COEF_BAND, COEF_BAND),
                )
            } else {
                (0.0, 0.0)
            };
            (phi, theta, sphi, stheta)
        }
        None => (phi0, 0.0, 0.0, 0.0),
    }
}

/// One-step-ahead innovations of the fitted recursion over `w`.
fn innovations(w: &[f64], phi: f64, theta: f64, seasonal_phi: f64, seasonal_theta: f64) -> Vec<f64> {
    let mut e = vec![0.0; w.len()];
    for t in 0..w.len() {
        let pred = phi * lag(w, t, 1)
            + theta * lag(&e, t, 1)
            + seasonal_phi * lag(w, t, SEASON)
            + seasonal_theta * lag(&e, t, SEASON);
        e[t] = w[t] - pred;
    }
    e
}

/// Solve the k-variable least-squares problem via its normal equations with
/// partial-pivot Gaussian elimination. Returns `None` when singular.
fn least_squares(rows: &[Vec<f64>], targets: &[f64], k: usize) -> Option<Vec<f64>> {
    let mut ata = vec![vec![0.0; k]; k];
    let mut atb = vec![0.0; k];
    for (row, &t) in rows.iter().zip(targets) {
        for i in 0..k {
            for j in 0..k {
                ata[i][j] += row[i] * row[j];
            }
            atb[i] += row[i] * t;
        }
    }

    for col in 0..k {
        let pivot = (col..k).max_by(|&a, &b| {
            ata[a][col]
                .abs()
                .partial_cmp(&ata[b][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if ata[pivot][col].abs() < 1e-12 {
            return None;
        }
        ata.swap(col, pivot);
        atb.swap(col, pivot);
        for r in (col + 1)..k {
            let factor = ata[r][col] / ata[col][col];
            for c in col..k {
                ata[r][c] -= factor * ata[col][c];
            }
            atb[r] -= factor * atb[col];
        }
    }

    let mut x = vec![0.0; k];
    for col in (0..k).rev() {
        let mut sum = atb[col];
        for c in (col + 1)..k {
            sum -= ata[col][c] * x[c];
        }
        x[col] = sum / ata[col][col];
    }
    x.iter().all(|v| v.is_finite()).then_some(x)
}
