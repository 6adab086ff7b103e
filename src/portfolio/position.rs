use crate::strategy::Direction;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

//an open position between entry and exit dates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    //sequence number in open order
    pub id: u64,

    pub direction: Direction,

    //capital committed, always > 0
    pub size: f64,

    pub entry_date: NaiveDate,

    //closes on the step whose date equals this exactly
    pub exit_date: NaiveDate,
}

impl Position {
    pub fn new(
        id: u64,
        direction: Direction,
        size: f64,
        entry_date: NaiveDate,
        exit_date: NaiveDate,
    ) -> Self {
        Position {
            id,
            direction,
            size,
            entry_date,
            exit_date,
        }
    }

    //realized pnl given the true percentage change and commission rate
    //commission is charged on notional regardless of outcome
    pub fn realized_pnl(&self, actual_pct_change: f64, commission_rate: f64) -> f64 {
        self.size * actual_pct_change / 100.0 * self.direction.sign()
            - self.size * commission_rate
    }
}

//a closed position with its realized pnl
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub direction: Direction,
    pub size: f64,
    pub profit_loss: f64,
}

impl TradeRecord {
    pub fn from_position(position: &Position, profit_loss: f64) -> Self {
        TradeRecord {
            entry_date: position.entry_date,
            exit_date: position.exit_date,
            direction: position.direction,
            size: position.size,
            profit_loss,
        }
    }

    pub fn is_win(&self) -> bool {
        self.profit_loss > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.profit_loss < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(direction: Direction) -> Position {
        Position::new(
            1,
            direction,
            200_000.0,
            NaiveDate::from_ymd_opt(2023, 1, 6).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 13).unwrap(),
        )
    }

    #[test]
    fn long_pnl_includes_commission() {
        let pnl = position(Direction::Long).realized_pnl(10.0, 0.05);
        assert!((pnl - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn short_profits_from_falling_price() {
        let short = position(Direction::Short);
        assert!((short.realized_pnl(-10.0, 0.0) - 20_000.0).abs() < 1e-9);
        assert!((short.realized_pnl(10.0, 0.05) - (-30_000.0)).abs() < 1e-9);
    }

    #[test]
    fn trade_record_copies_position() {
        let pos = position(Direction::Long);
        let trade = TradeRecord::from_position(&pos, -500.0);
        assert!(trade.is_loss());
        assert!(!trade.is_win());
        assert_eq!(trade.size, 200_000.0);
        assert_eq!(trade.exit_date, pos.exit_date);
    }
}
