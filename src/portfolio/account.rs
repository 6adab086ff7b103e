use crate::portfolio::position::TradeRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

//balances of the simulated account
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    //free capital
    pub cash_balance: f64,

    //capital locked in open positions
    pub committed_balance: f64,

    //initial aum plus realized pnl
    pub portfolio_value: f64,
}

//keeps the portfolio state and the realized-pnl time series
#[derive(Debug, Clone)]
pub struct Accountant {
    initial_aum: f64,
    state: PortfolioState,

    //(close date, portfolio value) after each close
    portfolio_curve: Vec<(NaiveDate, f64)>,

    //(close date, profit/loss) per closed trade
    pnl_series: Vec<(NaiveDate, f64)>,

    //closed trades in close order
    trade_log: Vec<TradeRecord>,
}

impl Accountant {
    pub fn new(initial_aum: f64) -> Self {
        Accountant {
            initial_aum,
            state: PortfolioState {
                cash_balance: initial_aum,
                committed_balance: 0.0,
                portfolio_value: initial_aum,
            },
            portfolio_curve: Vec::new(),
            pnl_series: Vec::new(),
            trade_log: Vec::new(),
        }
    }

    pub fn initial_aum(&self) -> f64 {
        self.initial_aum
    }

    //free capital available for new positions
    pub fn available_balance(&self) -> f64 {
        self.state.cash_balance
    }

    pub fn state(&self) -> PortfolioState {
        self.state
    }

    //moves capital from free to committed when a position opens
    //portfolio value does not change on open
    pub fn commit(&mut self, size: f64) {
        self.state.cash_balance -= size;
        self.state.committed_balance += size;
    }

    //releases a closed position's capital plus its pnl
    pub fn realize(&mut self, date: NaiveDate, trade: TradeRecord) {
        self.state.committed_balance -= trade.size;
        self.state.cash_balance += trade.size + trade.profit_loss;
        self.state.portfolio_value += trade.profit_loss;

        self.portfolio_curve.push((date, self.state.portfolio_value));
        self.pnl_series.push((date, trade.profit_loss));
        self.trade_log.push(trade);
    }

    //hands the recorded series to the caller
    pub fn into_records(self) -> (Vec<(NaiveDate, f64)>, Vec<(NaiveDate, f64)>, Vec<TradeRecord>) {
        (self.portfolio_curve, self.pnl_series, self.trade_log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::Direction;

    fn trade(size: f64, profit_loss: f64) -> TradeRecord {
        TradeRecord {
            entry_date: NaiveDate::from_ymd_opt(2020, 1, 3).unwrap(),
            exit_date: NaiveDate::from_ymd_opt(2020, 1, 10).unwrap(),
            direction: Direction::Long,
            size,
            profit_loss,
        }
    }

    #[test]
    fn open_does_not_move_portfolio_value() {
        let mut acct = Accountant::new(1_000_000.0);
        acct.commit(200_000.0);

        let state = acct.state();
        assert_eq!(state.cash_balance, 800_000.0);
        assert_eq!(state.committed_balance, 200_000.0);
        assert_eq!(state.portfolio_value, 1_000_000.0);

        let (curve, pnl, trades) = acct.into_records();
        assert!(curve.is_empty() && pnl.is_empty() && trades.is_empty());
    }

    #[test]
    fn close_credits_size_and_pnl() {
        let mut acct = Accountant::new(1_000_000.0);
        let date = NaiveDate::from_ymd_opt(2020, 1, 10).unwrap();
        acct.commit(200_000.0);
        acct.realize(date, trade(200_000.0, 10_000.0));

        let state = acct.state();
        assert_eq!(state.cash_balance, 1_010_000.0);
        assert_eq!(state.committed_balance, 0.0);
        assert_eq!(state.portfolio_value, 1_010_000.0);
        assert_eq!(acct.initial_aum(), 1_000_000.0);

        let (curve, pnl, trades) = acct.into_records();
        assert_eq!(curve, vec![(date, 1_010_000.0)]);
        assert_eq!(pnl, vec![(date, 10_000.0)]);
        assert_eq!(trades.len(), 1);
    }
}
