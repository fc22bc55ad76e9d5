//! Flood inference backend HTTP client.

use async_trait::async_trait;
use chrono::Utc;
use floodroute_core::error::PredictionError;
use floodroute_core::models::{Coordinate, RiskSample};
use floodroute_core::predict::FloodPredictor;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// HTTP client for the flood inference service.
///
/// Batch calls are atomic: any transport failure, non-success status, or
/// response shape mismatch fails the whole request with no partial results.
/// Nothing is retried at this layer.
pub struct InferenceClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct PointDto {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Serialize)]
struct BatchRequest {
    points: Vec<PointDto>,
}

#[derive(Debug, Deserialize)]
struct PredictionDto {
    flood_probability: f64,
    #[serde(default)]
    flood_depth_m: f64,
    #[serde(default)]
    features: Option<HashMap<String, f64>>,
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    predictions: Vec<PredictionDto>,
}

impl InferenceClient {
    /// Create a client for the given backend.
    /// An empty token disables the Authorization header.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let token = token.into();
        let auth_token = if token.trim().is_empty() {
            None
        } else {
            Some(token)
        };
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
            auth_token,
        }
    }

    /// Update auth token at runtime (rotation, refresh).
    pub fn set_auth_token(&mut self, token: Option<String>) {
        self.auth_token = token
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_token.as_deref() {
            Some(token) => request.header("Authorization", format!("Bearer {token}")),
            None => request,
        }
    }

    async fn post_batch(&self, points: &[Coordinate]) -> Result<BatchResponse, PredictionError> {
        let url = format!("{}/v1/predict/batch", self.base_url);
        let body = BatchRequest {
            points: points
                .iter()
                .map(|point| PointDto {
                    lat: point.lat,
                    lon: point.lon,
                })
                .collect(),
        };

        let started = Instant::now();
        let response = self
            .apply_auth(self.client.post(&url).json(&body))
            .send()
            .await
            .map_err(|err| PredictionError::Backend(err.to_string()))?;

        if !response.status().is_success() {
            return Err(PredictionError::Backend(format!(
                "inference backend returned {}",
                response.status()
            )));
        }

        let parsed: BatchResponse = response
            .json()
            .await
            .map_err(|err| PredictionError::Backend(err.to_string()))?;

        tracing::debug!(
            points = points.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch prediction completed"
        );

        Ok(parsed)
    }
}

#[async_trait]
impl FloodPredictor for InferenceClient {
    async fn predict_batch(
        &self,
        points: &[Coordinate],
    ) -> Result<Vec<RiskSample>, PredictionError> {
        let response = self.post_batch(points).await?;
        if response.predictions.len() != points.len() {
            return Err(PredictionError::BatchShape {
                expected: points.len(),
                got: response.predictions.len(),
            });
        }

        let timestamp = Utc::now();
        Ok(points
            .iter()
            .zip(response.predictions)
            .map(|(point, dto)| {
                let sample =
                    RiskSample::new(*point, dto.flood_probability, dto.flood_depth_m, timestamp);
                match dto.features {
                    Some(features) => sample.with_features(features),
                    None => sample,
                }
            })
            .collect())
    }
}
