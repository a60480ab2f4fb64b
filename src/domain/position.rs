//! Open positions and closed-trade records.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub quantity: i64,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
}

impl Position {
    pub fn cost(&self) -> f64 {
        self.quantity as f64 * self.entry_price
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity as f64 * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.quantity as f64 * (price - self.entry_price)
    }

    /// Close the position, producing the ledger entry.
    pub fn close(&self, exit_price: f64, exit_date: NaiveDate) -> TradeRecord {
        let pnl = self.unrealized_pnl(exit_price);
        let cost = self.cost();
        let return_pct = if self.quantity == 0 || cost == 0.0 {
            0.0
        } else {
            pnl / cost * 100.0
        };
        TradeRecord {
            entry_date: self.entry_date,
            exit_date,
            entry_price: self.entry_price,
            exit_price,
            quantity: self.quantity,
            pnl,
            return_pct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRecord {
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: i64,
    pub pnl: f64,
    /// Percent of the entry cost.
    pub return_pct: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_position() -> Position {
        Position {
            quantity: 100,
            entry_price: 50.0,
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }
    }

    #[test]
    fn market_value() {
        let pos = sample_position();
        assert!((pos.market_value(55.0) - 5500.0).abs() < f64::EPSILON);
        assert!((pos.cost() - 5000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unrealized_pnl_gain_and_loss() {
        let pos = sample_position();
        assert!((pos.unrealized_pnl(55.0) - 500.0).abs() < f64::EPSILON);
        assert!((pos.unrealized_pnl(45.0) - (-500.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn close_builds_trade_record() {
        let pos = sample_position();
        let exit = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let trade = pos.close(60.0, exit);

        assert_eq!(trade.entry_date, pos.entry_date);
        assert_eq!(trade.exit_date, exit);
        assert_eq!(trade.quantity, 100);
        assert!((trade.pnl - 1000.0).abs() < f64::EPSILON);
        assert!((trade.return_pct - 20.0).abs() < 1e-12);
    }

    #[test]
    fn zero_quantity_has_zero_return() {
        let pos = Position {
            quantity: 0,
            ..sample_position()
        };
        let trade = pos.close(60.0, pos.entry_date);
        assert_eq!(trade.pnl, 0.0);
        assert_eq!(trade.return_pct, 0.0);
    }
}
