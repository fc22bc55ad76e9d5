//! End-to-end route analysis scenarios against stub predictors.

use async_trait::async_trait;
use chrono::Utc;
use floodroute_core::engine::RouteRiskEngine;
use floodroute_core::error::PredictionError;
use floodroute_core::geodesy::haversine_distance;
use floodroute_core::models::{Coordinate, RiskLevel, RiskSample};
use floodroute_core::predict::FloodPredictor;

/// Returns `hot` probability inside `radius_m` of the hotspot, `cold`
/// everywhere else.
struct HotspotPredictor {
    hotspot: Coordinate,
    radius_m: f64,
    hot: f64,
    cold: f64,
}

#[async_trait]
impl FloodPredictor for HotspotPredictor {
    async fn predict_batch(
        &self,
        points: &[Coordinate],
    ) -> Result<Vec<RiskSample>, PredictionError> {
        Ok(points
            .iter()
            .map(|point| {
                let probability = if haversine_distance(*point, self.hotspot) <= self.radius_m {
                    self.hot
                } else {
                    self.cold
                };
                RiskSample::new(*point, probability, probability * 0.5, Utc::now())
            })
            .collect())
    }
}

// ~1km route in three waypoints, ~500m per leg.
fn three_point_route() -> Vec<Coordinate> {
    vec![
        Coordinate::new(37.7749, -122.4194),
        Coordinate::new(37.7794, -122.4194),
        Coordinate::new(37.7839, -122.4194),
    ]
}

#[tokio::test]
async fn dry_route_is_recommended() {
    let route = three_point_route();
    let engine = RouteRiskEngine::new(HotspotPredictor {
        hotspot: route[1],
        radius_m: 0.0,
        hot: 0.05,
        cold: 0.05,
    });

    let analysis = engine.analyze_route(&route).await.unwrap();

    assert!((analysis.total_distance_m - 1000.0).abs() < 20.0);
    assert!(analysis.overall_risk < 0.1);
    assert!(analysis.is_recommended);
    assert!(analysis.segments.is_empty());

    // first point + ceil(len/100) per leg
    let expected_samples: usize = 1 + route
        .windows(2)
        .map(|pair| (haversine_distance(pair[0], pair[1]) / 100.0).ceil() as usize)
        .sum::<usize>();
    assert_eq!(analysis.samples.len(), expected_samples);
}

#[tokio::test]
async fn severe_midpoint_rejects_route() {
    let route = three_point_route();
    let engine = RouteRiskEngine::new(HotspotPredictor {
        hotspot: route[1],
        radius_m: 30.0,
        hot: 0.9,
        cold: 0.05,
    });

    let analysis = engine.analyze_route(&route).await.unwrap();

    assert_eq!(analysis.max_risk, 0.9);
    assert!(!analysis.is_recommended);
    assert_eq!(analysis.segments.len(), 1);
    assert_eq!(analysis.segments[0].risk_level, RiskLevel::Severe);
    assert_eq!(analysis.segments[0].sample_count(), 1);
}

#[tokio::test]
async fn samples_stay_within_interval() {
    let route = three_point_route();
    let engine = RouteRiskEngine::new(HotspotPredictor {
        hotspot: route[0],
        radius_m: 0.0,
        hot: 0.0,
        cold: 0.0,
    });

    let analysis = engine.analyze_route(&route).await.unwrap();
    for pair in analysis.samples.windows(2) {
        let spacing = haversine_distance(pair[0].coordinate, pair[1].coordinate);
        assert!(spacing <= 100.0 + 1e-6, "spacing {spacing} exceeds interval");
    }
}

#[tokio::test]
async fn comparison_prefers_the_safer_route() {
    let route = three_point_route();
    let dry_engine = RouteRiskEngine::new(HotspotPredictor {
        hotspot: route[1],
        radius_m: 0.0,
        hot: 0.05,
        cold: 0.05,
    });
    let wet_engine = RouteRiskEngine::new(HotspotPredictor {
        hotspot: route[1],
        radius_m: 30.0,
        hot: 0.9,
        cold: 0.05,
    });

    let dry = dry_engine.analyze_route(&route).await.unwrap();
    let wet = wet_engine.analyze_route(&route).await.unwrap();

    let preferred = floodroute_core::compare_routes(&wet, &dry);
    assert!(preferred.is_recommended);
    assert!(preferred.overall_risk < wet.overall_risk);
}
