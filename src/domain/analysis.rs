//! End-to-end analysis: features, prediction and the optional trading run,
//! packed into one serializable report.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use super::config_validation::AnalysisConfig;
use super::error::PricecastError;
use super::features::{self, FeatureName};
use super::metrics::TradingMetrics;
use super::model::ModelKind;
use super::position::{Position, TradeRecord};
use super::predictor::{self, RegressionMetrics};
use super::price::{PricePoint, Series};
use super::simulator::{self, MarkerKind, SignalPoint, TradeMarker};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestPoint {
    pub date: NaiveDate,
    pub actual: f64,
    pub predicted: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradingReport {
    pub signals: Vec<SignalPoint>,
    pub buy_markers: Vec<TradeMarker>,
    pub sell_markers: Vec<TradeMarker>,
    pub trades: Vec<TradeRecord>,
    pub open_position: Option<Position>,
    pub metrics: TradingMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub history: Vec<PricePoint>,
    pub feature_columns: Vec<FeatureName>,
    pub feature_rows: usize,
    pub model: ModelKind,
    pub train_size: usize,
    pub test_size: usize,
    pub test_points: Vec<TestPoint>,
    pub future: Vec<ForecastPoint>,
    pub metrics: RegressionMetrics,
    pub trading: Option<TradingReport>,
}

pub fn run_analysis(
    series: &Series,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, PricecastError> {
    info!(rows = series.len(), "running analysis");

    let table = features::compute(series, &config.enabled_features);
    info!(
        rows = table.len(),
        columns = table.columns.len(),
        "features computed"
    );

    let prediction = predictor::fit_predict(&table, &config.predictor_params())?;

    let test_points = prediction
        .test_dates
        .iter()
        .zip(&prediction.test_actual)
        .zip(&prediction.test_predictions)
        .map(|((&date, &actual), &predicted)| TestPoint {
            date,
            actual,
            predicted,
        })
        .collect();
    let future = prediction
        .future_dates
        .iter()
        .zip(&prediction.future_predictions)
        .map(|(&date, &value)| ForecastPoint { date, value })
        .collect();

    let trading = if config.simulate_trading {
        Some(trading_report(series, config.initial_capital)?)
    } else {
        None
    };

    Ok(AnalysisReport {
        history: series.points().to_vec(),
        feature_columns: table.columns.clone(),
        feature_rows: table.len(),
        model: config.model,
        train_size: prediction.train_size,
        test_size: prediction.test_size(),
        test_points,
        future,
        metrics: prediction.metrics,
        trading,
    })
}

pub fn trading_report(
    series: &Series,
    initial_capital: f64,
) -> Result<TradingReport, PricecastError> {
    let result = simulator::simulate(series, initial_capital)?;
    let (buy_markers, sell_markers): (Vec<_>, Vec<_>) = result
        .markers
        .into_iter()
        .partition(|m| m.kind == MarkerKind::Buy);

    Ok(TradingReport {
        signals: result.signals,
        buy_markers,
        sell_markers,
        trades: result.trades,
        open_position: result.open_position,
        metrics: result.metrics,
    })
}
