//! Core domain types and logic.

pub mod analysis;
pub mod config_validation;
pub mod error;
pub mod features;
pub mod indicator;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod position;
pub mod predictor;
pub mod price;
pub mod scaler;
pub mod simulator;
