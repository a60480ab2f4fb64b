//! Trade-ledger statistics.

use serde::Serialize;

use super::position::TradeRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradingMetrics {
    pub total_trades: usize,
    pub profitable_trades: usize,
    pub total_pnl: f64,
    /// Percentage of trades with positive pnl, 0-100.
    pub win_rate: f64,
    /// Mean of the per-trade `return_pct`.
    pub avg_return: f64,
    /// Cash after the last closed trade; an open position is not marked.
    pub final_capital: f64,
}

impl TradingMetrics {
    pub fn compute(trades: &[TradeRecord], initial_capital: f64, final_capital: f64) -> Self {
        if trades.is_empty() {
            return TradingMetrics {
                total_trades: 0,
                profitable_trades: 0,
                total_pnl: 0.0,
                win_rate: 0.0,
                avg_return: 0.0,
                final_capital: initial_capital,
            };
        }

        let total_trades = trades.len();
        let profitable_trades = trades.iter().filter(|t| t.pnl > 0.0).count();
        let total_pnl: f64 = trades.iter().map(|t| t.pnl).sum();
        let avg_return = trades.iter().map(|t| t.return_pct).sum::<f64>() / total_trades as f64;

        TradingMetrics {
            total_trades,
            profitable_trades,
            total_pnl,
            win_rate: profitable_trades as f64 / total_trades as f64 * 100.0,
            avg_return,
            final_capital,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn trade(entry: f64, exit: f64, quantity: i64) -> TradeRecord {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let pnl = (exit - entry) * quantity as f64;
        TradeRecord {
            entry_date: d,
            exit_date: d,
            entry_price: entry,
            exit_price: exit,
            quantity,
            pnl,
            return_pct: pnl / (entry * quantity as f64) * 100.0,
        }
    }

    #[test]
    fn empty_ledger() {
        let m = TradingMetrics::compute(&[], 10_000.0, 123.0);
        assert_eq!(m.total_trades, 0);
        assert_eq!(m.profitable_trades, 0);
        assert_eq!(m.total_pnl, 0.0);
        assert_eq!(m.win_rate, 0.0);
        assert_eq!(m.avg_return, 0.0);
        assert_eq!(m.final_capital, 10_000.0);
    }

    #[test]
    fn mixed_ledger() {
        let trades = vec![trade(100.0, 110.0, 10), trade(50.0, 45.0, 20), trade(10.0, 10.0, 5)];
        let m = TradingMetrics::compute(&trades, 1000.0, 1000.0);

        assert_eq!(m.total_trades, 3);
        assert_eq!(m.profitable_trades, 1);
        assert_relative_eq!(m.total_pnl, 0.0);
        assert_relative_eq!(m.win_rate, 100.0 / 3.0);
        assert_relative_eq!(m.avg_return, (10.0 - 10.0 + 0.0) / 3.0);
        assert_eq!(m.final_capital, 1000.0);
    }

    #[test]
    fn breakeven_is_not_a_win() {
        let m = TradingMetrics::compute(&[trade(10.0, 10.0, 1)], 100.0, 100.0);
        assert_eq!(m.profitable_trades, 0);
        assert_eq!(m.win_rate, 0.0);
    }
}
