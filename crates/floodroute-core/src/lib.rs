//! Flood-risk-aware route costing.
//!
//! Geodesic primitives, risk sample value types, and an engine that turns
//! point-wise flood predictions into route-level metrics and shortest-path
//! edge weights. The prediction backend is injected via [`FloodPredictor`].

pub mod engine;
pub mod error;
pub mod geodesy;
pub mod models;
pub mod predict;
pub mod rules;

pub use engine::{
    compare_routes, detect_segments, flood_severity, route_advisories, EdgeCostRequest,
    RouteRiskEngine,
};
pub use error::{GeodesyError, PredictionError, RiskEngineError};
pub use geodesy::{haversine_distance, EARTH_RADIUS_M};
pub use models::{Coordinate, RiskLevel, RiskSample, RouteRiskAnalysis, RouteSegment};
pub use predict::FloodPredictor;
pub use rules::RiskRules;
