//! Regression models available to the predictor.

pub mod forest;
pub mod linear;
pub mod tree;

use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, Array2, ArrayView1};
use serde::Serialize;

use crate::domain::error::PricecastError;
use crate::domain::scaler::FittedScaler;

pub use forest::{ForestConfig, RandomForest};
pub use linear::LinearRegression;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ModelKind {
    #[default]
    #[serde(rename = "Linear Regression")]
    LinearRegression,
    #[serde(rename = "Random Forest")]
    RandomForest,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::LinearRegression => write!(f, "Linear Regression"),
            ModelKind::RandomForest => write!(f, "Random Forest"),
        }
    }
}

impl FromStr for ModelKind {
    type Err = PricecastError;

    /// Case-insensitive; spaces, dashes and underscores are interchangeable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "linearregression" | "linear" | "ols" => Ok(ModelKind::LinearRegression),
            "randomforest" | "forest" | "rf" => Ok(ModelKind::RandomForest),
            _ => Err(PricecastError::UnsupportedModel {
                name: s.trim().to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrainedModel {
    Linear(LinearRegression),
    Forest(RandomForest),
}

impl TrainedModel {
    pub fn fit(kind: ModelKind, x: &Array2<f64>, y: &Array1<f64>, forest: &ForestConfig) -> Self {
        match kind {
            ModelKind::LinearRegression => TrainedModel::Linear(LinearRegression::fit(x, y)),
            ModelKind::RandomForest => TrainedModel::Forest(RandomForest::fit(x, y, forest)),
        }
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            TrainedModel::Linear(_) => ModelKind::LinearRegression,
            TrainedModel::Forest(_) => ModelKind::RandomForest,
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        match self {
            TrainedModel::Linear(m) => m.predict(x),
            TrainedModel::Forest(m) => m.predict(x),
        }
    }

    pub fn predict_one(&self, features: ArrayView1<f64>) -> f64 {
        match self {
            TrainedModel::Linear(m) => m.predict_one(features),
            TrainedModel::Forest(m) => m.predict_one(features),
        }
    }
}

/// A fitted scaler paired with the model trained on its output. Raw feature
/// rows go in, predictions come out.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifact {
    pub scaler: FittedScaler,
    pub model: TrainedModel,
}

impl ModelArtifact {
    pub fn predict_raw(&self, row: &[f64]) -> f64 {
        let scaled = self.scaler.transform_row(ArrayView1::from(row));
        self.model.predict_one(scaled.view())
    }

    /// Batch inference over unscaled feature rows.
    pub fn predict_matrix(&self, x: &Array2<f64>) -> Array1<f64> {
        self.model.predict(&self.scaler.transform(x))
    }
}
