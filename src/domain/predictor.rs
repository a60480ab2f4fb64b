//! Chronological train/test fitting and the multi-step forecast.
//!
//! The forecast repeats the model's prediction on the last known feature
//! vector `horizon` times. The vector is never rebuilt from predicted prices,
//! so all future values are identical; callers should treat the forecast as a
//! level estimate, not a path.

use chrono::{Duration, NaiveDate};
use ndarray::s;
use serde::Serialize;
use tracing::{debug, info};

use super::error::PricecastError;
use super::features::FeatureTable;
use super::model::{ForestConfig, ModelArtifact, ModelKind, TrainedModel};
use super::scaler::StandardScaler;

pub const DEFAULT_TRAIN_FRACTION: f64 = 0.8;
pub const DEFAULT_HORIZON: usize = 7;

#[derive(Debug, Clone, PartialEq)]
pub struct PredictorParams {
    pub train_fraction: f64,
    pub horizon: usize,
    pub model: ModelKind,
    pub forest: ForestConfig,
}

impl Default for PredictorParams {
    fn default() -> Self {
        PredictorParams {
            train_fraction: DEFAULT_TRAIN_FRACTION,
            horizon: DEFAULT_HORIZON,
            model: ModelKind::default(),
            forest: ForestConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionMetrics {
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

impl RegressionMetrics {
    /// RMSE, MAE and R² of `predicted` against `actual`.
    ///
    /// When the actual values have zero variance R² is 1.0 for a perfect fit
    /// and 0.0 otherwise.
    pub fn compute(actual: &[f64], predicted: &[f64]) -> Self {
        let n = actual.len().min(predicted.len());
        if n == 0 {
            return RegressionMetrics {
                rmse: 0.0,
                mae: 0.0,
                r2: 0.0,
            };
        }
        let nf = n as f64;

        let mut ss_res = 0.0;
        let mut abs_sum = 0.0;
        for (a, p) in actual.iter().zip(predicted) {
            let e = a - p;
            ss_res += e * e;
            abs_sum += e.abs();
        }

        let mean = actual[..n].iter().sum::<f64>() / nf;
        let ss_tot: f64 = actual[..n].iter().map(|a| (a - mean).powi(2)).sum();

        let r2 = if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else if ss_res == 0.0 {
            1.0
        } else {
            0.0
        };

        RegressionMetrics {
            rmse: (ss_res / nf).sqrt(),
            mae: abs_sum / nf,
            r2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Prediction {
    pub train_size: usize,
    pub test_dates: Vec<NaiveDate>,
    pub test_actual: Vec<f64>,
    pub test_predictions: Vec<f64>,
    pub future_dates: Vec<NaiveDate>,
    pub future_predictions: Vec<f64>,
    pub metrics: RegressionMetrics,
    pub artifact: ModelArtifact,
}

impl Prediction {
    pub fn test_size(&self) -> usize {
        self.test_dates.len()
    }
}

/// Number of training rows for a table of `n` rows.
pub fn train_len(n: usize, train_fraction: f64) -> usize {
    (train_fraction * n as f64).round() as usize
}

pub fn fit_predict(
    table: &FeatureTable,
    params: &PredictorParams,
) -> Result<Prediction, PricecastError> {
    validate_params(params)?;

    let n = table.len();
    let n_train = train_len(n, params.train_fraction);
    if n_train == 0 {
        return Err(PricecastError::InsufficientData {
            stage: "training split".into(),
            rows: n,
            minimum: 1,
        });
    }
    if n_train >= n {
        return Err(PricecastError::InsufficientData {
            stage: "test split".into(),
            rows: n,
            minimum: n_train + 1,
        });
    }
    debug!(train = n_train, test = n - n_train, "chronological split");

    let x = table.matrix();
    let y = table.targets();
    let x_train = x.slice(s![..n_train, ..]).to_owned();
    let y_train = y.slice(s![..n_train]).to_owned();

    let scaler = StandardScaler::fit(&x_train);
    let x_train = scaler.transform(&x_train);

    debug!(model = %params.model, features = scaler.n_features(), "fitting model");
    let model = TrainedModel::fit(params.model, &x_train, &y_train, &params.forest);
    let artifact = ModelArtifact { scaler, model };

    let test_rows = &table.rows[n_train..];
    let test_dates: Vec<NaiveDate> = test_rows.iter().map(|r| r.date).collect();
    let test_actual = y.slice(s![n_train..]).to_vec();
    let test_predictions = artifact
        .predict_matrix(&x.slice(s![n_train.., ..]).to_owned())
        .to_vec();
    let metrics = RegressionMetrics::compute(&test_actual, &test_predictions);

    // n > n_train >= 1, so the table has a last row.
    let last = &table.rows[n - 1];
    let (future_dates, future_predictions) =
        forecast(&artifact, &last.values, last.date, params.horizon)?;

    info!(
        model = %params.model,
        train = n_train,
        test = test_dates.len(),
        rmse = metrics.rmse,
        r2 = metrics.r2,
        "prediction complete"
    );

    Ok(Prediction {
        train_size: n_train,
        test_dates,
        test_actual,
        test_predictions,
        future_dates,
        future_predictions,
        metrics,
        artifact,
    })
}

fn validate_params(params: &PredictorParams) -> Result<(), PricecastError> {
    let f = params.train_fraction;
    if !(f > 0.0 && f < 1.0) {
        return Err(PricecastError::InvalidParameter {
            name: "train_fraction".into(),
            reason: format!("must be strictly between 0 and 1, got {}", f),
        });
    }
    if params.horizon == 0 {
        return Err(PricecastError::InvalidParameter {
            name: "horizon".into(),
            reason: "must be at least 1".into(),
        });
    }
    Ok(())
}

/// Fails instead of overflowing when a future date falls past the calendar.
fn forecast(
    artifact: &ModelArtifact,
    last_features: &[f64],
    last_date: NaiveDate,
    horizon: usize,
) -> Result<(Vec<NaiveDate>, Vec<f64>), PricecastError> {
    let value = artifact.predict_raw(last_features);
    let mut dates = Vec::with_capacity(horizon);
    for step in 1..=horizon {
        let date = i64::try_from(step)
            .ok()
            .and_then(Duration::try_days)
            .and_then(|offset| last_date.checked_add_signed(offset))
            .ok_or_else(|| PricecastError::InvalidParameter {
                name: "horizon".into(),
                reason: format!("{} days after {} is out of the date range", step, last_date),
            })?;
        dates.push(date);
    }
    Ok((dates, vec![value; horizon]))
}
