//! Exogenous foot-traffic signal builder
//!
//! Derives a monthly-resolution foot-traffic series for the historical window
//! and the forecast horizon from the location store, walking an ordered
//! fallback chain: quarterly aggregate at widening radii, then the maximum
//! raw place-record value in a small bounding box, then a count-based proxy
//! over a target category. A store failure is a fallback trigger, never a
//! hard error.

use crate::config::ExogConfig;
use crate::series::YearMonth;
use crate::store::{Location, LocationStore};
use tracing::{debug, warn};

/// How (or why not) the base quarterly value was derived.
#[derive(Debug, Clone, PartialEq)]
pub enum ExogSource {
    /// Quarterly foot-traffic aggregate found within `radius_m` metres.
    QuarterlyAggregate { radius_m: f64 },
    /// No quarterly data; used the maximum foot traffic among raw records.
    RawPointMax,
    /// Neither quarterly nor raw data; synthesized from nearby category counts.
    CategoryProxy { category: String, count: usize },
    /// No coordinates were supplied with the request.
    NoLocation,
    /// The store had nothing usable near the coordinate.
    NoData,
    /// The store could not be queried at all.
    StoreUnavailable,
}

impl ExogSource {
    /// Human-readable line for the forecast explanation.
    pub fn describe(&self) -> String {
        match self {
            ExogSource::QuarterlyAggregate { radius_m } => format!(
                "foot traffic taken from the latest quarterly aggregate within {:.0}m",
                radius_m
            ),
            ExogSource::RawPointMax => {
                "no quarterly aggregate nearby; used the maximum foot traffic from raw place records"
                    .to_string()
            }
            ExogSource::CategoryProxy { category, count } => format!(
                "no quarterly or raw foot-traffic data; base estimated from {} nearby {} places",
                count, category
            ),
            ExogSource::NoLocation => "no exogenous input: no location provided".to_string(),
            ExogSource::NoData => {
                "no exogenous input: no foot-traffic data near the location".to_string()
            }
            ExogSource::StoreUnavailable => {
                "no exogenous input: location store unavailable".to_string()
            }
        }
    }
}

/// Monthly foot-traffic series aligned to the historical axis plus horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct ExogSignal {
    /// Base quarterly population value the series was derived from.
    pub base: u64,
    /// One value per historical month.
    pub hist: Vec<f64>,
    /// One value per horizon month.
    pub future: Vec<f64>,
}

/// Result of a build: the signal when one could be derived, and always the
/// source/reason for the explanation lines.
#[derive(Debug, Clone, PartialEq)]
pub struct ExogOutcome {
    pub signal: Option<ExogSignal>,
    pub source: ExogSource,
}

impl ExogOutcome {
    fn absent(source: ExogSource) -> Self {
        Self {
            signal: None,
            source,
        }
    }
}

/// Builds the exogenous series for one forecast request.
#[derive(Debug, Clone)]
pub struct ExogBuilder {
    config: ExogConfig,
}

impl ExogBuilder {
    pub fn new(config: ExogConfig) -> Self {
        Self { config }
    }

    /// Walk the fallback chain and expand the base quarterly value into
    /// monthly values over the historical window and the horizon.
    pub async fn build(
        &self,
        store: &dyn LocationStore,
        hist_start: YearMonth,
        hist_len: usize,
        horizon: usize,
        location: Option<Location>,
    ) -> ExogOutcome {
        let loc = match location {
            Some(loc) => loc,
            None => return ExogOutcome::absent(ExogSource::NoLocation),
        };

        let (base, source) = match self.resolve_base(store, loc).await {
            Ok(resolved) => resolved,
            Err(err) => {
                warn!(error = %err, lat = loc.lat, lon = loc.lon, "location store query failed; forecasting without exogenous input");
                return ExogOutcome::absent(ExogSource::StoreUnavailable);
            }
        };

        match base {
            Some(base) if base > 0 => {
                debug!(base, source = ?source, "exogenous base resolved");
                let hist = self.monthly_values(base, hist_start, hist_len);
                let future_start = hist_start.plus_months(hist_len as u32);
                let future = self.monthly_values(base, future_start, horizon);
                ExogOutcome {
                    signal: Some(ExogSignal { base, hist, future }),
                    source,
                }
            }
            _ => ExogOutcome::absent(source),
        }
    }

    /// First success wins: quarterly aggregate at widening radii, raw-point
    /// maximum, category-count proxy.
    async fn resolve_base(
        &self,
        store: &dyn LocationStore,
        loc: Location,
    ) -> crate::error::Result<(Option<u64>, ExogSource)> {
        for &radius_m in &self.config.quarter_radii_m {
            if let Some(value) = store
                .recent_quarterly_aggregate(loc.lat, loc.lon, radius_m)
                .await?
            {
                return Ok((Some(value), ExogSource::QuarterlyAggregate { radius_m }));
            }
        }

        let d = self.config.bbox_half_deg;
        let places = store
            .places_in_bbox(loc.lat - d, loc.lon - d, loc.lat + d, loc.lon + d)
            .await?;

        let raw_max = places
            .iter()
            .filter_map(|p| p.foot_traffic)
            .filter(|&v| v > 0)
            .max();
        if let Some(value) = raw_max {
            return Ok((Some(value), ExogSource::RawPointMax));
        }

        let prefix = self.config.proxy_category.to_lowercase();
        let count = places
            .iter()
            .filter(|p| p.category.to_lowercase().starts_with(&prefix))
            .count();
        if count > 0 {
            let value = self.config.proxy_floor + self.config.proxy_step * count as u64;
            return Ok((
                Some(value),
                ExogSource::CategoryProxy {
                    category: self.config.proxy_category.clone(),
                    count,
                },
            ));
        }

        Ok((None, ExogSource::NoData))
    }

    /// Quarter-to-month expansion: each month gets `base * weight / 3`, the
    /// weight chosen by the month's position within its calendar quarter.
    fn monthly_values(&self, base: u64, start: YearMonth, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| {
                let month = start.plus_months(i as u32);
                base as f64 * self.config.quarter_weights[month.quarter_position()] / 3.0
            })
            .collect()
    }
}
