//! Core value types for flood risk assessment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A WGS84 position in decimal degrees.
///
/// Latitude in [-90, 90], longitude in [-180, 180]. Ranges are a caller
/// contract; construction does not validate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Flood risk classification, in ascending order of severity.
///
/// The ordering is load-bearing: thresholds and predicates compare ordinal
/// positions, not just names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    Minimal,
    Low,
    Moderate,
    High,
    Severe,
}

impl RiskLevel {
    /// Bucket a flood probability into a level.
    ///
    /// Boundaries are inclusive-low/exclusive-high except the top bucket.
    pub fn from_probability(probability: f64) -> Self {
        if probability < 0.1 {
            Self::Minimal
        } else if probability < 0.3 {
            Self::Low
        } else if probability < 0.6 {
            Self::Moderate
        } else if probability < 0.8 {
            Self::High
        } else {
            Self::Severe
        }
    }

    /// Ordinal position used by the wire representation.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(Self::Minimal),
            1 => Some(Self::Low),
            2 => Some(Self::Moderate),
            3 => Some(Self::High),
            4 => Some(Self::Severe),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Severe => "severe",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// Levels travel as their ordinal so downstream consumers can compare and
// bucket without knowing the label set.
impl Serialize for RiskLevel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.ordinal())
    }
}

impl<'de> Deserialize<'de> for RiskLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let ordinal = u8::deserialize(deserializer)?;
        Self::from_ordinal(ordinal)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid risk level ordinal {ordinal}")))
    }
}

/// A point-wise flood prediction for one coordinate.
///
/// The risk level is always derived from the probability; it is never stored
/// or set independently, so sample state cannot go inconsistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RiskSampleRecord", into = "RiskSampleRecord")]
pub struct RiskSample {
    pub coordinate: Coordinate,
    /// Flood probability in [0, 1]
    pub flood_probability: f64,
    /// Predicted inundation depth in meters
    pub flood_depth_m: f64,
    pub timestamp: DateTime<Utc>,
    /// Diagnostic model features attached by the prediction backend
    pub features: Option<HashMap<String, f64>>,
}

impl RiskSample {
    pub fn new(
        coordinate: Coordinate,
        flood_probability: f64,
        flood_depth_m: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            coordinate,
            flood_probability,
            flood_depth_m,
            timestamp,
            features: None,
        }
    }

    /// Attach diagnostic features.
    pub fn with_features(mut self, features: HashMap<String, f64>) -> Self {
        self.features = Some(features);
        self
    }

    /// Level derived from the flood probability.
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_probability(self.flood_probability)
    }

    /// Minimal or low risk.
    pub fn is_safe(&self) -> bool {
        self.risk_level() <= RiskLevel::Low
    }

    /// Moderate or worse; the sample opens or extends a warning segment.
    pub fn requires_warning(&self) -> bool {
        self.risk_level() >= RiskLevel::Moderate
    }

    /// High or worse; routing should steer around this point.
    pub fn should_avoid(&self) -> bool {
        self.risk_level() >= RiskLevel::High
    }
}

/// Flat wire representation of a sample.
///
/// The coordinate is split into two numeric fields and the derived level is
/// stored as its ordinal for consumers that cannot rebucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RiskSampleRecord {
    lat: f64,
    lon: f64,
    flood_probability: f64,
    flood_depth_m: f64,
    risk_level: RiskLevel,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    features: Option<HashMap<String, f64>>,
}

impl From<RiskSample> for RiskSampleRecord {
    fn from(sample: RiskSample) -> Self {
        Self {
            lat: sample.coordinate.lat,
            lon: sample.coordinate.lon,
            flood_probability: sample.flood_probability,
            flood_depth_m: sample.flood_depth_m,
            risk_level: sample.risk_level(),
            timestamp: sample.timestamp,
            features: sample.features,
        }
    }
}

impl TryFrom<RiskSampleRecord> for RiskSample {
    type Error = String;

    // The stored ordinal is audited against the probability instead of
    // trusted; a mismatch means the record was edited out-of-band.
    fn try_from(record: RiskSampleRecord) -> Result<Self, String> {
        let derived = RiskLevel::from_probability(record.flood_probability);
        if derived != record.risk_level {
            return Err(format!(
                "risk level '{}' does not match probability {} (expected '{}')",
                record.risk_level, record.flood_probability, derived
            ));
        }
        Ok(Self {
            coordinate: Coordinate::new(record.lat, record.lon),
            flood_probability: record.flood_probability,
            flood_depth_m: record.flood_depth_m,
            timestamp: record.timestamp,
            features: record.features,
        })
    }
}

/// A maximal contiguous run of warning-level samples along a route.
///
/// Produced only by segment detection; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub risk_level: RiskLevel,
    /// Index of the first sample in the run
    pub start_index: usize,
    /// Index of the last sample in the run (inclusive)
    pub end_index: usize,
    /// Distance covered by the run's consecutive samples
    pub length_m: f64,
}

impl RouteSegment {
    pub fn sample_count(&self) -> usize {
        self.end_index - self.start_index + 1
    }

    /// High or severe; counts toward the recommendation cutoff.
    pub fn is_high_risk(&self) -> bool {
        self.risk_level >= RiskLevel::High
    }
}

/// Aggregate risk picture for one route query.
///
/// Recomputed wholesale per query; there is no incremental update path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRiskAnalysis {
    pub samples: Vec<RiskSample>,
    /// Blend of max and average risk, biased toward the worst point
    pub overall_risk: f64,
    pub max_risk: f64,
    pub average_risk: f64,
    /// Length of the original (unsampled) path
    pub total_distance_m: f64,
    pub estimated_time_s: f64,
    pub is_recommended: bool,
    pub segments: Vec<RouteSegment>,
}

impl RouteRiskAnalysis {
    /// Level bucket of the overall risk score.
    pub fn overall_level(&self) -> RiskLevel {
        RiskLevel::from_probability(self.overall_risk)
    }

    /// Combined length of high-risk segments.
    pub fn high_risk_distance_m(&self) -> f64 {
        self.segments
            .iter()
            .filter(|segment| segment.is_high_risk())
            .map(|segment| segment.length_m)
            .sum()
    }
}
