//! Feature engine: turns a validated series into model-ready feature rows.
//!
//! Returns and volatility are always computed; moving averages, RSI and MACD
//! are switched on through [`FeatureSet`]. Rows where any selected feature is
//! still in warm-up are dropped, never zero-filled, so the output is a strict
//! date suffix of the input series.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use ndarray::{Array1, Array2};
use serde::Serialize;
use tracing::debug;

use super::error::PricecastError;
use super::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use super::indicator::returns::DEFAULT_VOLATILITY_WINDOW;
use super::indicator::rsi::DEFAULT_PERIOD as RSI_PERIOD;
use super::indicator::{
    IndicatorSeries, IndicatorValue, calculate_macd, calculate_returns, calculate_rsi,
    calculate_sma, calculate_volatility,
};
use super::price::Series;

pub const SHORT_MA_WINDOW: usize = 20;
pub const LONG_MA_WINDOW: usize = 50;

/// Optional indicator groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum FeatureGroup {
    MovingAverage,
    Rsi,
    Macd,
}

impl FromStr for FeatureGroup {
    type Err = PricecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "movingaverage" | "ma" | "sma" => Ok(FeatureGroup::MovingAverage),
            "rsi" => Ok(FeatureGroup::Rsi),
            "macd" => Ok(FeatureGroup::Macd),
            _ => Err(PricecastError::InvalidParameter {
                name: "features".into(),
                reason: format!("unknown feature group '{}'", s.trim()),
            }),
        }
    }
}

impl fmt::Display for FeatureGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureGroup::MovingAverage => write!(f, "Moving Average"),
            FeatureGroup::Rsi => write!(f, "RSI"),
            FeatureGroup::Macd => write!(f, "MACD"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FeatureSet {
    groups: BTreeSet<FeatureGroup>,
}

impl FeatureSet {
    pub fn new<I: IntoIterator<Item = FeatureGroup>>(groups: I) -> Self {
        FeatureSet {
            groups: groups.into_iter().collect(),
        }
    }

    pub fn all() -> Self {
        Self::new([FeatureGroup::MovingAverage, FeatureGroup::Rsi, FeatureGroup::Macd])
    }

    /// Parse a comma separated list such as `moving_average, rsi, macd`.
    /// An empty list selects no optional groups.
    pub fn parse_list(s: &str) -> Result<Self, PricecastError> {
        let groups = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(FeatureGroup::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(groups))
    }

    pub fn contains(&self, group: FeatureGroup) -> bool {
        self.groups.contains(&group)
    }

    pub fn groups(&self) -> impl Iterator<Item = FeatureGroup> + '_ {
        self.groups.iter().copied()
    }

    /// Number of leading series points removed by warm-up.
    pub fn warmup(&self) -> usize {
        let mut warmup = DEFAULT_VOLATILITY_WINDOW;
        if self.contains(FeatureGroup::MovingAverage) {
            warmup = warmup.max(LONG_MA_WINDOW - 1);
        }
        if self.contains(FeatureGroup::Rsi) {
            warmup = warmup.max(RSI_PERIOD);
        }
        warmup
    }

    /// Feature columns produced for this set, in table order.
    pub fn columns(&self) -> Vec<FeatureName> {
        let mut columns = Vec::new();
        if self.contains(FeatureGroup::MovingAverage) {
            columns.push(FeatureName::Ma20);
            columns.push(FeatureName::Ma50);
        }
        if self.contains(FeatureGroup::Rsi) {
            columns.push(FeatureName::Rsi);
        }
        if self.contains(FeatureGroup::Macd) {
            columns.push(FeatureName::Macd);
            columns.push(FeatureName::MacdSignal);
        }
        columns.push(FeatureName::Returns);
        columns.push(FeatureName::Volatility);
        columns
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FeatureName {
    #[serde(rename = "MA20")]
    Ma20,
    #[serde(rename = "MA50")]
    Ma50,
    #[serde(rename = "RSI")]
    Rsi,
    #[serde(rename = "MACD")]
    Macd,
    #[serde(rename = "MACD-Signal")]
    MacdSignal,
    Returns,
    Volatility,
}

impl fmt::Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeatureName::Ma20 => "MA20",
            FeatureName::Ma50 => "MA50",
            FeatureName::Rsi => "RSI",
            FeatureName::Macd => "MACD",
            FeatureName::MacdSignal => "MACD-Signal",
            FeatureName::Returns => "Returns",
            FeatureName::Volatility => "Volatility",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub date: NaiveDate,
    /// Aligned with [`FeatureTable::columns`].
    pub values: Vec<f64>,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    pub columns: Vec<FeatureName>,
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn value(&self, row: usize, name: FeatureName) -> Option<f64> {
        let col = self.columns.iter().position(|c| *c == name)?;
        self.rows.get(row).map(|r| r.values[col])
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    /// Feature values as an `n_rows x n_columns` matrix.
    pub fn matrix(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.rows.len(), self.columns.len()), |(i, j)| {
            self.rows[i].values[j]
        })
    }

    pub fn targets(&self) -> Array1<f64> {
        self.rows.iter().map(|r| r.close).collect()
    }
}

pub fn compute(series: &Series, enabled: &FeatureSet) -> FeatureTable {
    let points = series.points();
    let columns = enabled.columns();

    let mut per_column: Vec<Vec<Option<f64>>> = Vec::with_capacity(columns.len());
    if enabled.contains(FeatureGroup::MovingAverage) {
        per_column.push(column_values(calculate_sma(points, SHORT_MA_WINDOW)));
        per_column.push(column_values(calculate_sma(points, LONG_MA_WINDOW)));
    }
    if enabled.contains(FeatureGroup::Rsi) {
        per_column.push(column_values(calculate_rsi(points, RSI_PERIOD)));
    }
    if enabled.contains(FeatureGroup::Macd) {
        let macd = calculate_macd(points, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL);
        debug!(indicator = %macd.indicator_type, points = macd.values.len(), "indicator computed");
        let (line, signal): (Vec<_>, Vec<_>) = macd
            .values
            .iter()
            .map(|p| match p.value {
                IndicatorValue::Macd { line, signal, .. } if p.valid => {
                    (Some(line), Some(signal))
                }
                _ => (None, None),
            })
            .unzip();
        per_column.push(line);
        per_column.push(signal);
    }
    per_column.push(column_values(calculate_returns(points)));
    per_column.push(column_values(calculate_volatility(
        points,
        DEFAULT_VOLATILITY_WINDOW,
    )));

    let rows = points
        .iter()
        .enumerate()
        .filter_map(|(i, point)| {
            let values = per_column
                .iter()
                .map(|col| col[i].filter(|v| v.is_finite()))
                .collect::<Option<Vec<f64>>>()?;
            Some(FeatureRow {
                date: point.date,
                values,
                close: point.close,
            })
        })
        .collect();

    FeatureTable { columns, rows }
}

fn column_values(series: IndicatorSeries) -> Vec<Option<f64>> {
    debug!(indicator = %series.indicator_type, points = series.values.len(), "indicator computed");
    series.simple_values()
}
