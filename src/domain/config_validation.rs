//! Analysis configuration: validation and assembly.
//!
//! Every key is optional; missing keys take the defaults below. Present keys
//! must parse and be in range, otherwise the run is rejected before any data
//! is read.

use std::str::FromStr;

use serde::Serialize;
use tracing::warn;

use crate::domain::error::PricecastError;
use crate::domain::features::FeatureSet;
use crate::domain::model::{ForestConfig, ModelKind};
use crate::domain::predictor::{DEFAULT_HORIZON, DEFAULT_TRAIN_FRACTION, PredictorParams};
use crate::domain::simulator::DEFAULT_INITIAL_CAPITAL;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_MAX_ROWS: usize = 100_000;

const KNOWN_SECTIONS: &[&str] = &["default", "input", "model", "forest", "features", "trading"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisConfig {
    pub model: ModelKind,
    pub train_fraction: f64,
    pub horizon: usize,
    pub enabled_features: FeatureSet,
    pub simulate_trading: bool,
    pub initial_capital: f64,
    pub forest: ForestConfig,
    pub max_rows: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            model: ModelKind::default(),
            train_fraction: DEFAULT_TRAIN_FRACTION,
            horizon: DEFAULT_HORIZON,
            enabled_features: FeatureSet::all(),
            simulate_trading: false,
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            forest: ForestConfig::default(),
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

impl AnalysisConfig {
    pub fn predictor_params(&self) -> PredictorParams {
        PredictorParams {
            train_fraction: self.train_fraction,
            horizon: self.horizon,
            model: self.model,
            forest: self.forest.clone(),
        }
    }
}

pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), PricecastError> {
    build_analysis_config(config).map(|_| ())
}

pub fn build_analysis_config(config: &dyn ConfigPort) -> Result<AnalysisConfig, PricecastError> {
    let defaults = AnalysisConfig::default();

    for section in config.sections() {
        if !KNOWN_SECTIONS.contains(&section.as_str()) {
            warn!(section = %section, "ignoring unknown config section");
        }
    }

    let max_rows = read_value::<usize>(config, "input", "max_rows")?.unwrap_or(defaults.max_rows);
    if max_rows == 0 {
        return Err(invalid("input", "max_rows", "max_rows must be at least 1"));
    }

    let model = match non_empty(config, "model", "kind") {
        Some(name) => name.parse::<ModelKind>()?,
        None => defaults.model,
    };

    let train_fraction = read_train_fraction(config)?.unwrap_or(defaults.train_fraction);

    let horizon = read_value::<usize>(config, "model", "horizon")?.unwrap_or(defaults.horizon);
    if horizon == 0 {
        return Err(invalid("model", "horizon", "horizon must be at least 1"));
    }

    let forest = read_forest(config)?;

    let enabled_features = match config.get_string("features", "enabled") {
        Some(list) => FeatureSet::parse_list(&list)
            .map_err(|e| invalid("features", "enabled", &e.to_string()))?,
        None => defaults.enabled_features,
    };

    let simulate_trading = match non_empty(config, "trading", "simulate") {
        Some(v) => parse_bool(&v)
            .ok_or_else(|| invalid("trading", "simulate", "simulate must be true or false"))?,
        None => defaults.simulate_trading,
    };

    let initial_capital = read_value::<f64>(config, "trading", "initial_capital")?
        .unwrap_or(defaults.initial_capital);
    if !initial_capital.is_finite() || initial_capital <= 0.0 {
        return Err(invalid(
            "trading",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }

    Ok(AnalysisConfig {
        model,
        train_fraction,
        horizon,
        enabled_features,
        simulate_trading,
        initial_capital,
        forest,
        max_rows,
    })
}

/// `train_fraction` wins over the percentage form `train_size`.
fn read_train_fraction(config: &dyn ConfigPort) -> Result<Option<f64>, PricecastError> {
    if let Some(fraction) = read_value::<f64>(config, "model", "train_fraction")? {
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(invalid(
                "model",
                "train_fraction",
                "train_fraction must be between 0 and 1 (exclusive)",
            ));
        }
        return Ok(Some(fraction));
    }
    if let Some(percent) = read_value::<f64>(config, "model", "train_size")? {
        if !(percent > 0.0 && percent < 100.0) {
            return Err(invalid(
                "model",
                "train_size",
                "train_size must be between 0 and 100 (exclusive)",
            ));
        }
        return Ok(Some(percent / 100.0));
    }
    Ok(None)
}

fn read_forest(config: &dyn ConfigPort) -> Result<ForestConfig, PricecastError> {
    let defaults = ForestConfig::default();

    let n_trees = read_value::<usize>(config, "forest", "n_trees")?.unwrap_or(defaults.n_trees);
    if n_trees == 0 {
        return Err(invalid("forest", "n_trees", "n_trees must be at least 1"));
    }

    let seed = read_value::<u64>(config, "forest", "seed")?.unwrap_or(defaults.seed);

    // 0 means unlimited for both depth and feature count.
    let max_depth = read_value::<usize>(config, "forest", "max_depth")?
        .map_or(defaults.max_depth, |d| (d > 0).then_some(d));
    let max_features = read_value::<usize>(config, "forest", "max_features")?
        .map_or(defaults.max_features, |f| (f > 0).then_some(f));

    let min_samples_split = read_value::<usize>(config, "forest", "min_samples_split")?
        .unwrap_or(defaults.min_samples_split);
    if min_samples_split < 2 {
        return Err(invalid(
            "forest",
            "min_samples_split",
            "min_samples_split must be at least 2",
        ));
    }

    let min_samples_leaf = read_value::<usize>(config, "forest", "min_samples_leaf")?
        .unwrap_or(defaults.min_samples_leaf);
    if min_samples_leaf == 0 {
        return Err(invalid(
            "forest",
            "min_samples_leaf",
            "min_samples_leaf must be at least 1",
        ));
    }

    Ok(ForestConfig {
        n_trees,
        seed,
        max_depth,
        min_samples_split,
        min_samples_leaf,
        max_features,
    })
}

fn non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Strict read: a present but malformed value is an error, never a silent
/// fallback to the default.
fn read_value<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, PricecastError> {
    match non_empty(config, section, key) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|_| {
            invalid(section, key, &format!("cannot parse {:?}", raw))
        }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Some(true),
        "false" | "no" | "0" | "off" => Some(false),
        _ => None,
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> PricecastError {
    PricecastError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
