//! Shared helpers for the floodroute CLI binaries.

pub mod config;

pub use config::Config;

use anyhow::{bail, Context, Result};
use floodroute_core::models::Coordinate;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing from `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

/// Parse a `LAT,LON` argument.
pub fn parse_coordinate(value: &str) -> Result<Coordinate> {
    let Some((lat, lon)) = value.split_once(',') else {
        bail!("expected LAT,LON, got '{value}'");
    };
    Ok(Coordinate::new(
        lat.trim().parse().context("invalid latitude")?,
        lon.trim().parse().context("invalid longitude")?,
    ))
}

/// Load a route from a JSON file holding an array of [lat, lon] pairs.
pub fn load_route(path: &Path) -> Result<Vec<Coordinate>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read route file {}", path.display()))?;
    let pairs: Vec<[f64; 2]> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse route file {}", path.display()))?;
    Ok(pairs
        .into_iter()
        .map(|[lat, lon]| Coordinate::new(lat, lon))
        .collect())
}
