//! Tunable configuration for the forecasting pipeline
//!
//! The geographic thresholds used by the exogenous-signal fallback chain vary
//! between deployments, so they live here as plain config structs with
//! documented defaults instead of magic numbers at the call sites.

/// Payback month reported when cumulative profit never recovers the upfront
/// investment within the horizon.
pub const PAYBACK_SENTINEL: u32 = 999;

/// Configuration for the exogenous foot-traffic signal builder.
#[derive(Debug, Clone)]
pub struct ExogConfig {
    /// Widening search radii, in metres, tried in order when looking up the
    /// most recent quarterly foot-traffic aggregate.
    pub quarter_radii_m: Vec<f64>,
    /// Half-width, in degrees, of the bounding box used for raw place-record
    /// queries (0.002 degrees is roughly 220 m).
    pub bbox_half_deg: f64,
    /// Category prefix counted by the last-resort proxy fallback.
    pub proxy_category: String,
    /// Proxy base value when only category counts are available:
    /// `proxy_floor + proxy_step * count`.
    pub proxy_floor: u64,
    pub proxy_step: u64,
    /// Within-quarter month weights (first/second/third month of a calendar
    /// quarter). Each monthly value is `base * weight / 3`.
    pub quarter_weights: [f64; 3],
}

impl Default for ExogConfig {
    fn default() -> Self {
        Self {
            quarter_radii_m: vec![100.0, 500.0, 2000.0],
            bbox_half_deg: 0.002,
            proxy_category: "cafe".to_string(),
            proxy_floor: 8000,
            proxy_step: 2000,
            quarter_weights: [0.98, 1.00, 1.02],
        }
    }
}

/// Configuration for the bagged regression trees used as the secondary model.
#[derive(Debug, Clone)]
pub struct TreesConfig {
    /// Number of bootstrap trees in the bag.
    pub n_trees: usize,
    /// Maximum tree depth.
    pub max_depth: usize,
    /// Minimum number of rows in a leaf.
    pub min_leaf: usize,
    /// Number of randomly chosen features considered per split.
    pub max_split_features: usize,
}

impl Default for TreesConfig {
    fn default() -> Self {
        Self {
            n_trees: 300,
            max_depth: 6,
            min_leaf: 2,
            max_split_features: 3,
        }
    }
}

/// Configuration for the forecast engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Primary-model share of the ensemble blend. The secondary model gets
    /// the complement and contributes no interval information.
    pub blend_weight: f64,
    /// Bounds of the uniform multiplicative perturbation applied to each
    /// forecasted month's mean.
    pub noise_low: f64,
    pub noise_high: f64,
    /// Two-sided significance level of the forecast interval.
    pub interval_alpha: f64,
    /// Minimum usable training rows before the secondary model runs at all.
    pub min_secondary_rows: usize,
    /// Sentinel value reported when payback is not reachable.
    pub payback_sentinel: u32,
    /// Upper cap on the reported 12-month payback probability.
    pub payback_prob_cap: f64,
    pub exog: ExogConfig,
    pub trees: TreesConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            blend_weight: 0.6,
            noise_low: 0.90,
            noise_high: 1.10,
            interval_alpha: 0.05,
            min_secondary_rows: 6,
            payback_sentinel: PAYBACK_SENTINEL,
            payback_prob_cap: 0.998,
            exog: ExogConfig::default(),
            trees: TreesConfig::default(),
        }
    }
}
