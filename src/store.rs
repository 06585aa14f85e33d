//! Location store collaborator interface
//!
//! The forecasting core only reads from the store: the most recent quarterly
//! foot-traffic aggregate near a coordinate, and raw place records inside a
//! bounding box. Implementations convert their technical errors into
//! [`ForecastError::DataUnavailable`] before they cross this boundary.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Rough degrees-per-metre conversion used for radius filters.
pub const DEG_PER_METRE: f64 = 1.0 / 111_000.0;

/// A geographic coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

/// A single point-of-interest record from the location store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub category: String,
    /// Recorded foot traffic for this point, when the source dataset has it.
    pub foot_traffic: Option<u64>,
}

/// Read-only access to place and foot-traffic data.
#[async_trait]
pub trait LocationStore: Send + Sync {
    /// Most recent quarterly foot-traffic aggregate within `radius_m` metres
    /// of the coordinate, or `None` when the area has no quarterly data.
    async fn recent_quarterly_aggregate(
        &self,
        lat: f64,
        lon: f64,
        radius_m: f64,
    ) -> Result<Option<u64>>;

    /// All place records inside the bounding box.
    async fn places_in_bbox(
        &self,
        min_lat: f64,
        min_lon: f64,
        max_lat: f64,
        max_lon: f64,
    ) -> Result<Vec<PlaceRecord>>;
}

/// One quarterly foot-traffic sample held by [`MemoryLocationStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct QuarterlySample {
    pub lat: f64,
    pub lon: f64,
    /// Quarter label, e.g. `"2024Q2"`. Labels order chronologically as
    /// strings.
    pub quarter: String,
    pub foot_traffic: u64,
}

/// In-memory location store for tests and embedders without a database.
#[derive(Debug, Clone, Default)]
pub struct MemoryLocationStore {
    quarterly: Vec<QuarterlySample>,
    places: Vec<PlaceRecord>,
}

impl MemoryLocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quarterly(mut self, lat: f64, lon: f64, quarter: &str, foot_traffic: u64) -> Self {
        self.quarterly.push(QuarterlySample {
            lat,
            lon,
            quarter: quarter.to_string(),
            foot_traffic,
        });
        self
    }

    pub fn with_place(mut self, place: PlaceRecord) -> Self {
        self.places.push(place);
        self
    }
}

#[async_trait]
impl LocationStore for MemoryLocationStore {
    async fn recent_quarterly_aggregate(
        &self,
        lat: f64,
        lon: f64,
        radius_m: f64,
    ) -> Result<Option<u64>> {
        let d = radius_m * DEG_PER_METRE;
        let in_range: Vec<&QuarterlySample> = self
            .quarterly
            .iter()
            .filter(|s| (s.lat - lat).abs() <= d && (s.lon - lon).abs() <= d)
            .collect();
        // Most recent quarter first, then the maximum sample within it.
        let latest = match in_range.iter().map(|s| s.quarter.as_str()).max() {
            Some(q) => q,
            None => return Ok(None),
        };
        Ok(in_range
            .iter()
            .filter(|s| s.quarter == latest)
            .map(|s| s.foot_traffic)
            .max())
    }

    async fn places_in_bbox(
        &self,
        min_lat: f64,
        min_lon: f64,
        max_lat: f64,
        max_lon: f64,
    ) -> Result<Vec<PlaceRecord>> {
        Ok(self
            .places
            .iter()
            .filter(|p| {
                p.lat >= min_lat && p.lat <= max_lat && p.lon >= min_lon && p.lon <= max_lon
            })
            .cloned()
            .collect())
    }
}
