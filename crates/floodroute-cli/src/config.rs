//! CLI configuration from environment.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub inference_url: String,
    pub inference_token: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            inference_url: env::var("FLOODROUTE_INFERENCE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            inference_token: env::var("FLOODROUTE_INFERENCE_TOKEN").unwrap_or_default(),
        }
    }
}
