//! Moving-average crossover trading simulation.
//!
//! Long-only, one position at a time. Each bar is handled once, in date
//! order, using only that bar's signal:
//!
//! - Flat and Buy: spend [`CAPITAL_FRACTION`] of cash on whole units.
//! - Long and Sell: sell everything and record the trade.
//! - Anything else: no change.
//!
//! A position still open on the last bar is left open; it appears in
//! [`SimulationResult::open_position`] but not in the ledger or metrics.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use tracing::{debug, info};

use super::error::PricecastError;
use super::features::{LONG_MA_WINDOW, SHORT_MA_WINDOW};
use super::indicator::calculate_sma;
use super::metrics::TradingMetrics;
use super::position::{Position, TradeRecord};
use super::price::{PricePoint, Series};

pub const CAPITAL_FRACTION: f64 = 0.95;
pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    Sell,
    Hold,
    Buy,
}

impl Signal {
    pub fn value(self) -> i8 {
        match self {
            Signal::Sell => -1,
            Signal::Hold => 0,
            Signal::Buy => 1,
        }
    }

    /// Buy when short > long, Sell when short < long, Hold when either is
    /// undefined or they are equal.
    pub fn from_averages(short: Option<f64>, long: Option<f64>) -> Self {
        match (short, long) {
            (Some(s), Some(l)) if s > l => Signal::Buy,
            (Some(s), Some(l)) if s < l => Signal::Sell,
            _ => Signal::Hold,
        }
    }
}

impl Serialize for Signal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.value())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalPoint {
    pub date: NaiveDate,
    pub close: f64,
    pub sma20: Option<f64>,
    pub sma50: Option<f64>,
    pub signal: Signal,
}

pub fn compute_signals(points: &[PricePoint]) -> Vec<SignalPoint> {
    let short = calculate_sma(points, SHORT_MA_WINDOW).simple_values();
    let long = calculate_sma(points, LONG_MA_WINDOW).simple_values();

    points
        .iter()
        .zip(short.into_iter().zip(long))
        .map(|(p, (sma20, sma50))| SignalPoint {
            date: p.date,
            close: p.close,
            sma20,
            sma50,
            signal: Signal::from_averages(sma20, sma50),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Buy,
    Sell,
}

/// A bar on which the state machine changed state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeMarker {
    pub kind: MarkerKind,
    pub date: NaiveDate,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PositionState {
    Flat,
    Long(Position),
}

/// Mutable state of one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub initial_capital: f64,
    pub capital: f64,
    pub position: PositionState,
    pub ledger: Vec<TradeRecord>,
    pub markers: Vec<TradeMarker>,
}

impl SimulationState {
    pub fn new(initial_capital: f64) -> Self {
        SimulationState {
            initial_capital,
            capital: initial_capital,
            position: PositionState::Flat,
            ledger: Vec::new(),
            markers: Vec::new(),
        }
    }

    pub fn step(&mut self, point: &PricePoint, signal: Signal) {
        match (&self.position, signal) {
            (PositionState::Flat, Signal::Buy) => {
                let quantity = (self.capital * CAPITAL_FRACTION / point.close).trunc() as i64;
                self.capital -= quantity as f64 * point.close;
                debug!(date = %point.date, price = point.close, quantity, "enter long");
                self.markers.push(TradeMarker {
                    kind: MarkerKind::Buy,
                    date: point.date,
                    price: point.close,
                });
                self.position = PositionState::Long(Position {
                    quantity,
                    entry_price: point.close,
                    entry_date: point.date,
                });
            }
            (PositionState::Long(position), Signal::Sell) => {
                let trade = position.close(point.close, point.date);
                self.capital += position.market_value(point.close);
                debug!(date = %point.date, price = point.close, pnl = trade.pnl, "exit long");
                self.markers.push(TradeMarker {
                    kind: MarkerKind::Sell,
                    date: point.date,
                    price: point.close,
                });
                self.ledger.push(trade);
                self.position = PositionState::Flat;
            }
            _ => {}
        }
    }

    pub fn open_position(&self) -> Option<&Position> {
        match &self.position {
            PositionState::Long(p) => Some(p),
            PositionState::Flat => None,
        }
    }

    pub fn metrics(&self) -> TradingMetrics {
        TradingMetrics::compute(&self.ledger, self.initial_capital, self.capital)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub signals: Vec<SignalPoint>,
    pub markers: Vec<TradeMarker>,
    pub trades: Vec<TradeRecord>,
    pub open_position: Option<Position>,
    pub metrics: TradingMetrics,
}

/// Run the state machine over precomputed signals.
pub fn simulate_with_signals(
    points: &[PricePoint],
    signals: &[Signal],
    initial_capital: f64,
) -> Result<SimulationState, PricecastError> {
    if points.len() != signals.len() {
        return Err(PricecastError::InvalidParameter {
            name: "signals".into(),
            reason: format!(
                "{} signals for {} price points",
                signals.len(),
                points.len()
            ),
        });
    }
    check_capital(initial_capital)?;

    let mut state = SimulationState::new(initial_capital);
    for (point, &signal) in points.iter().zip(signals) {
        state.step(point, signal);
    }
    Ok(state)
}

pub fn simulate(series: &Series, initial_capital: f64) -> Result<SimulationResult, PricecastError> {
    let points = series.points();
    let signals = compute_signals(points);
    let raw: Vec<Signal> = signals.iter().map(|s| s.signal).collect();

    let state = simulate_with_signals(points, &raw, initial_capital)?;
    let metrics = state.metrics();
    info!(
        trades = metrics.total_trades,
        final_capital = metrics.final_capital,
        open = state.open_position().is_some(),
        "simulation complete"
    );

    let open_position = state.open_position().cloned();
    Ok(SimulationResult {
        signals,
        markers: state.markers,
        trades: state.ledger,
        open_position,
        metrics,
    })
}

fn check_capital(initial_capital: f64) -> Result<(), PricecastError> {
    if initial_capital.is_finite() && initial_capital >= 0.0 {
        Ok(())
    } else {
        Err(PricecastError::InvalidParameter {
            name: "initial_capital".into(),
            reason: format!("must be a non-negative number, got {}", initial_capital),
        })
    }
}
