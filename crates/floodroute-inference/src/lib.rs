//! floodroute-inference - flood inference backend client
//!
//! Handles all communication with the external flood prediction service.

pub mod client;

pub use client::InferenceClient;
