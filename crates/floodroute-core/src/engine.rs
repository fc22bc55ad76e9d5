//! Route risk aggregation and edge costing.
//!
//! Turns point-wise flood predictions into route-level metrics, advisory
//! text, and scalar edge weights consumable by an external shortest-path
//! search. The engine itself runs no search and keeps no state between
//! calls; concurrent queries are safe whenever the predictor is.

use crate::error::{PredictionError, RiskEngineError};
use crate::geodesy::{haversine_distance, interpolate};
use crate::models::{Coordinate, RiskLevel, RiskSample, RouteRiskAnalysis, RouteSegment};
use crate::predict::FloodPredictor;
use crate::rules::RiskRules;

/// Parameters for a single edge cost query.
#[derive(Debug, Clone, Copy)]
pub struct EdgeCostRequest {
    /// Precomputed edge length; measured via haversine when absent.
    pub distance_m: Option<f64>,
    /// Current traffic speed, clamped to the configured range.
    pub traffic_speed_kmh: f64,
    /// Rain intensity multiplier, floored at 1.0.
    pub rain_multiplier: f64,
}

impl Default for EdgeCostRequest {
    fn default() -> Self {
        Self {
            distance_m: None,
            traffic_speed_kmh: 40.0,
            rain_multiplier: 1.0,
        }
    }
}

/// Route risk engine over an injected prediction backend.
pub struct RouteRiskEngine<P> {
    predictor: P,
    rules: RiskRules,
}

impl<P: FloodPredictor> RouteRiskEngine<P> {
    pub fn new(predictor: P) -> Self {
        Self::with_rules(predictor, RiskRules::default())
    }

    pub fn with_rules(predictor: P, rules: RiskRules) -> Self {
        Self { predictor, rules }
    }

    pub fn rules(&self) -> &RiskRules {
        &self.rules
    }

    /// Resample a polyline so consecutive points are at most the configured
    /// interval apart.
    ///
    /// Each original segment contributes `ceil(length / interval)` evenly
    /// spaced points including its own endpoint; the original first point
    /// always leads the result.
    pub fn sample_route(&self, path: &[Coordinate]) -> Result<Vec<Coordinate>, RiskEngineError> {
        let Some(first) = path.first() else {
            return Err(RiskEngineError::EmptyRoute);
        };

        let mut sampled = vec![*first];
        for pair in path.windows(2) {
            let (start, end) = (pair[0], pair[1]);
            let length_m = haversine_distance(start, end);
            let steps = (length_m / self.rules.sample_interval_m).ceil() as usize;
            for step in 1..=steps {
                sampled.push(interpolate(start, end, step as f64 / steps as f64));
            }
        }
        Ok(sampled)
    }

    /// Analyze a full route: sample, predict in one batch, aggregate.
    ///
    /// A predictor failure is fatal to the query; no partial analysis is
    /// produced and nothing is retried here.
    pub async fn analyze_route(
        &self,
        path: &[Coordinate],
    ) -> Result<RouteRiskAnalysis, RiskEngineError> {
        let sampled = self.sample_route(path)?;
        let samples = self.predictor.predict_batch(&sampled).await?;
        if samples.len() != sampled.len() {
            return Err(PredictionError::BatchShape {
                expected: sampled.len(),
                got: samples.len(),
            }
            .into());
        }

        let total_distance_m = path_length_m(path);
        let max_risk = samples
            .iter()
            .map(|sample| sample.flood_probability)
            .fold(0.0, f64::max);
        let average_risk = if samples.is_empty() {
            0.0
        } else {
            samples
                .iter()
                .map(|sample| sample.flood_probability)
                .sum::<f64>()
                / samples.len() as f64
        };
        let overall_risk =
            self.rules.max_risk_weight * max_risk + self.rules.average_risk_weight * average_risk;

        let segments = detect_segments(&samples);
        let estimated_time_s = self.estimated_time_s(&samples, total_distance_m);
        let is_recommended = self.recommend(overall_risk, max_risk, &segments);

        tracing::debug!(
            samples = samples.len(),
            segments = segments.len(),
            overall_risk,
            "route analyzed"
        );

        Ok(RouteRiskAnalysis {
            samples,
            overall_risk,
            max_risk,
            average_risk,
            total_distance_m,
            estimated_time_s,
            is_recommended,
            segments,
        })
    }

    /// Analyze the straight route between two points.
    pub async fn analyze_between(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteRiskAnalysis, RiskEngineError> {
        self.analyze_route(&[origin, destination]).await
    }

    /// Cost in hours for a single graph edge, risk-sampled at its midpoint.
    ///
    /// The midpoint sample stands in for the whole edge; edges are expected
    /// to be short relative to flood extents. Severity enters the cost as a
    /// multiplicative factor so a search routes around severe edges instead
    /// of merely discounting them.
    pub async fn edge_cost(
        &self,
        start: Coordinate,
        end: Coordinate,
        request: EdgeCostRequest,
    ) -> Result<f64, RiskEngineError> {
        let distance_m = request
            .distance_m
            .unwrap_or_else(|| haversine_distance(start, end));
        let midpoint = interpolate(start, end, 0.5);
        let sample = self.predictor.predict(midpoint).await?;

        let speed_kmh = request.traffic_speed_kmh.clamp(
            self.rules.min_traffic_speed_kmh,
            self.rules.max_traffic_speed_kmh,
        );
        let rain = request.rain_multiplier.max(1.0);
        let severity = flood_severity(sample.flood_probability);

        Ok((distance_m / 1000.0 / speed_kmh) * (1.0 + severity) * rain)
    }

    // All four rejection conditions are independent short-circuits.
    fn recommend(&self, overall_risk: f64, max_risk: f64, segments: &[RouteSegment]) -> bool {
        if overall_risk > self.rules.overall_risk_limit {
            return false;
        }
        if max_risk > self.rules.max_risk_limit {
            return false;
        }
        if segments
            .iter()
            .any(|segment| segment.risk_level == RiskLevel::Severe)
        {
            return false;
        }
        let high_risk = segments
            .iter()
            .filter(|segment| segment.is_high_risk())
            .count();
        high_risk <= self.rules.max_high_risk_segments
    }

    /// Total travel time in seconds; risk slows each sampled stretch.
    ///
    /// The worse probability of each consecutive pair drives its speed
    /// factor, consistent with the worst-point bias of the overall score.
    fn estimated_time_s(&self, samples: &[RiskSample], total_distance_m: f64) -> f64 {
        if samples.len() < 2 {
            return total_distance_m / self.rules.base_speed_mps;
        }
        let mut total_s = 0.0;
        for pair in samples.windows(2) {
            let distance_m = haversine_distance(pair[0].coordinate, pair[1].coordinate);
            let probability = pair[0].flood_probability.max(pair[1].flood_probability);
            let factor = (1.0 - self.rules.risk_slowdown * probability)
                .clamp(self.rules.min_speed_factor, 1.0);
            total_s += distance_m / (self.rules.base_speed_mps * factor);
        }
        total_s
    }
}

/// Convex severity transform of flood probability for edge costing.
///
/// Super-linear above 0.6 so severe-risk edges become disproportionately
/// expensive rather than mildly discounted.
pub fn flood_severity(probability: f64) -> f64 {
    if probability < 0.1 {
        0.0
    } else if probability < 0.3 {
        probability * 0.5
    } else if probability < 0.6 {
        probability * 2.0
    } else {
        probability * probability * 10.0
    }
}

/// Find maximal contiguous warning-level runs in an ordered sample list.
///
/// A run opens at the first sample requiring a warning and closes when the
/// level changes, the warning ends, or the list ends.
pub fn detect_segments(samples: &[RiskSample]) -> Vec<RouteSegment> {
    let mut segments = Vec::new();
    let mut open: Option<(usize, RiskLevel)> = None;

    for (index, sample) in samples.iter().enumerate() {
        let level = sample.risk_level();
        match open {
            Some((start, open_level)) if sample.requires_warning() => {
                if level != open_level {
                    segments.push(close_segment(samples, start, index - 1, open_level));
                    open = Some((index, level));
                }
            }
            Some((start, open_level)) => {
                segments.push(close_segment(samples, start, index - 1, open_level));
                open = None;
            }
            None if sample.requires_warning() => {
                open = Some((index, level));
            }
            None => {}
        }
    }

    if let Some((start, level)) = open {
        segments.push(close_segment(samples, start, samples.len() - 1, level));
    }

    segments
}

fn close_segment(
    samples: &[RiskSample],
    start: usize,
    end: usize,
    level: RiskLevel,
) -> RouteSegment {
    let mut length_m = 0.0;
    for pair in samples[start..=end].windows(2) {
        length_m += haversine_distance(pair[0].coordinate, pair[1].coordinate);
    }
    RouteSegment {
        risk_level: level,
        start_index: start,
        end_index: end,
        length_m,
    }
}

/// Prefer the lower-risk of two analyses.
///
/// Ties fall through overall risk, then max risk, then distance. A full tie
/// yields `second`; that final tie-break is arbitrary but kept stable for
/// existing consumers.
pub fn compare_routes<'a>(
    first: &'a RouteRiskAnalysis,
    second: &'a RouteRiskAnalysis,
) -> &'a RouteRiskAnalysis {
    if first.overall_risk < second.overall_risk {
        return first;
    }
    if second.overall_risk < first.overall_risk {
        return second;
    }
    if first.max_risk < second.max_risk {
        return first;
    }
    if second.max_risk < first.max_risk {
        return second;
    }
    if first.total_distance_m < second.total_distance_m {
        return first;
    }
    second
}

/// Human-readable advisory lines for an analysis, most important first.
///
/// Wording is presentation text; the ordering and thresholds are what
/// downstream consumers rely on.
pub fn route_advisories(analysis: &RouteRiskAnalysis) -> Vec<String> {
    let mut advisories = Vec::new();

    if !analysis.is_recommended {
        advisories.push("Route not recommended: significant flood risk detected".to_string());
    }

    if analysis.max_risk > 0.8 {
        advisories.push("Severe flooding expected on parts of this route".to_string());
    } else if analysis.max_risk > 0.6 {
        advisories.push("High flood risk on parts of this route".to_string());
    } else if analysis.max_risk > 0.3 {
        advisories.push("Moderate flood risk along this route".to_string());
    }

    let high_risk_m = analysis.high_risk_distance_m();
    if high_risk_m > 1_000.0 {
        advisories.push(format!(
            "{:.1} km of the route passes through high-risk areas",
            high_risk_m / 1000.0
        ));
    }

    advisories.push(format!(
        "Estimated travel time: {:.0} min",
        analysis.estimated_time_s / 60.0
    ));

    advisories
}

fn path_length_m(path: &[Coordinate]) -> f64 {
    path.windows(2)
        .map(|pair| haversine_distance(pair[0], pair[1]))
        .sum()
}
