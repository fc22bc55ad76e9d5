//! Error taxonomy for the risk engine and its collaborators.
//!
//! Everything here surfaces to the caller unmodified: the engine performs no
//! retries and produces no partial analyses.

use thiserror::Error;

/// Failure reported by the flood prediction collaborator.
#[derive(Debug, Error)]
pub enum PredictionError {
    /// Backend unreachable or returned a failure response.
    #[error("flood prediction backend failed: {0}")]
    Backend(String),
    /// Batch response did not match the request shape.
    #[error("prediction batch returned {got} samples for {expected} points")]
    BatchShape { expected: usize, got: usize },
}

/// Failure in a geometric primitive.
#[derive(Debug, Error)]
pub enum GeodesyError {
    /// The affine transform has a zero determinant and cannot be inverted.
    #[error("affine transform is degenerate (zero determinant)")]
    DegenerateTransform,
}

/// Top-level failure for a route risk query.
#[derive(Debug, Error)]
pub enum RiskEngineError {
    /// The input path had no points.
    #[error("route path is empty")]
    EmptyRoute,
    #[error(transparent)]
    Prediction(#[from] PredictionError),
}
