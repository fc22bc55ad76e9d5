//! Thresholds and speed model for route risk scoring.

use serde::{Deserialize, Serialize};

/// Configuration for the route risk engine.
///
/// Defaults carry the operational constants; tests and production both run
/// against `RiskRules::default()` unless a deployment overrides them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskRules {
    /// Maximum spacing between route samples in meters
    pub sample_interval_m: f64,
    /// Nominal travel speed with no flood risk (m/s)
    pub base_speed_mps: f64,
    /// Fraction of speed lost at flood probability 1.0
    pub risk_slowdown: f64,
    /// Lower clamp on the per-pair speed factor
    pub min_speed_factor: f64,
    /// Weight of the worst sample in the overall score
    pub max_risk_weight: f64,
    /// Weight of the average sample in the overall score
    pub average_risk_weight: f64,
    /// Overall risk above which a route is not recommended
    pub overall_risk_limit: f64,
    /// Single-point risk above which a route is not recommended
    pub max_risk_limit: f64,
    /// High-risk segment count above which a route is not recommended
    pub max_high_risk_segments: usize,
    /// Lower clamp for edge traffic speed (km/h)
    pub min_traffic_speed_kmh: f64,
    /// Upper clamp for edge traffic speed (km/h)
    pub max_traffic_speed_kmh: f64,
}

impl Default for RiskRules {
    fn default() -> Self {
        Self {
            sample_interval_m: 100.0,
            base_speed_mps: 10.0,
            risk_slowdown: 0.7,
            min_speed_factor: 0.3,
            max_risk_weight: 0.6,
            average_risk_weight: 0.4,
            overall_risk_limit: 0.6,
            max_risk_limit: 0.8,
            max_high_risk_segments: 3,
            min_traffic_speed_kmh: 5.0,
            max_traffic_speed_kmh: 100.0,
        }
    }
}
