//! Injected flood prediction capability.

use crate::error::PredictionError;
use crate::models::{Coordinate, RiskSample};
use async_trait::async_trait;

/// Point-wise flood risk prediction backend.
///
/// Implementations must be safe for concurrent use; the engine holds no
/// locks around calls. Batch results preserve request order and length and
/// fail atomically: a backend failure yields no partial results.
#[async_trait]
pub trait FloodPredictor: Send + Sync {
    /// Predict risk for a single point.
    async fn predict(&self, point: Coordinate) -> Result<RiskSample, PredictionError> {
        let samples = self.predict_batch(&[point]).await?;
        samples
            .into_iter()
            .next()
            .ok_or(PredictionError::BatchShape {
                expected: 1,
                got: 0,
            })
    }

    /// Predict risk for an ordered list of points.
    async fn predict_batch(
        &self,
        points: &[Coordinate],
    ) -> Result<Vec<RiskSample>, PredictionError>;
}
