use crate::metrics::timeseries::{max_drawdown, DrawdownPoint};
use crate::portfolio::TradeRecord;
use chrono::NaiveDate;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

//summary metrics for a backtest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub initial_aum: f64,
    pub final_portfolio_value: f64,
    pub total_return_pct: f64,
    pub cagr: f64,
    pub sharpe_ratio: f64,

    //absolute, <= 0
    pub max_drawdown: f64,

    //|max_drawdown| as a percentage of initial aum
    pub max_drawdown_pct: f64,

    pub num_trades: usize,
    pub num_winning_trades: usize,
    pub num_losing_trades: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
}

impl PerformanceMetrics {
    //calculate summary metrics from the closed trades
    //pnl_series holds (close date, pnl) in close order
    pub fn from_trades(
        trades: &[TradeRecord],
        pnl_series: &[(NaiveDate, f64)],
        drawdown_curve: &[DrawdownPoint],
        final_portfolio_value: f64,
        initial_aum: f64,
        annualization_factor: f64,
    ) -> Self {
        let returns: Vec<f64> = pnl_series.iter().map(|(_, pnl)| *pnl).collect();

        let sharpe_ratio = calculate_sharpe_ratio(&returns, annualization_factor);

        let max_dd = max_drawdown(drawdown_curve);

        let years = trading_years(trades);
        let cagr = calculate_cagr(final_portfolio_value, initial_aum, years);

        let stats = calculate_trade_statistics(trades);

        PerformanceMetrics {
            initial_aum,
            final_portfolio_value,
            total_return_pct: (final_portfolio_value - initial_aum) / initial_aum * 100.0,
            cagr,
            sharpe_ratio,
            max_drawdown: max_dd,
            max_drawdown_pct: max_dd.abs() / initial_aum * 100.0,
            num_trades: stats.num_trades,
            num_winning_trades: stats.num_winning_trades,
            num_losing_trades: stats.num_losing_trades,
            win_rate: stats.win_rate,
            profit_factor: stats.profit_factor,
            largest_win: stats.largest_win,
            largest_loss: stats.largest_loss,
        }
    }

    //prints metrics in a formatted table
    pub fn pretty_print_table(&self) {
        let mut table = Table::new();

        table.add_row(Row::new(vec![Cell::new("Metric"), Cell::new("Value")]));

        let rows = [
            ("Initial AUM", format!("${:.2}", self.initial_aum)),
            (
                "Final Portfolio Value",
                format!("${:.2}", self.final_portfolio_value),
            ),
            ("Total Return", format!("{:.2}%", self.total_return_pct)),
            ("CAGR", format!("{:.2}%", self.cagr)),
            ("Sharpe Ratio", format!("{:.3}", self.sharpe_ratio)),
            ("Max Drawdown", format!("${:.2}", self.max_drawdown)),
            ("Max DD %", format!("{:.2}%", self.max_drawdown_pct)),
            ("Number of Trades", format!("{}", self.num_trades)),
            ("Win Rate", format!("{:.2}%", self.win_rate * 100.0)),
            ("Profit Factor", format!("{:.3}", self.profit_factor)),
            ("Largest Win", format!("${:.2}", self.largest_win)),
            ("Largest Loss", format!("${:.2}", self.largest_loss)),
        ];

        for (name, value) in rows {
            table.add_row(Row::new(vec![Cell::new(name), Cell::new(&value)]));
        }

        table.printstd();
    }
}

//annualized mean/std of per-trade pnl, 0 when empty or flat
//uses the population standard deviation
pub fn calculate_sharpe_ratio(returns: &[f64], annualization_factor: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }

    let mean = returns.mean();
    let std_dev = returns.population_std_dev();

    if std_dev == 0.0 || std_dev.is_nan() {
        return 0.0;
    }

    mean / std_dev * annualization_factor
}

//years between the entries of the first and last closed trades, 1 with fewer than two trades
pub fn trading_years(trades: &[TradeRecord]) -> f64 {
    match (trades.first(), trades.last()) {
        (Some(first), Some(last)) if trades.len() >= 2 => {
            (last.entry_date - first.entry_date).num_days() as f64 / 365.25
        }
        _ => 1.0,
    }
}

//compound annual growth rate in percent, 0 over a zero-length span
pub fn calculate_cagr(final_value: f64, initial_aum: f64, years: f64) -> f64 {
    if years == 0.0 {
        return 0.0;
    }
    ((final_value / initial_aum).powf(1.0 / years) - 1.0) * 100.0
}

struct TradeStats {
    num_trades: usize,
    num_winning_trades: usize,
    num_losing_trades: usize,
    win_rate: f64,
    profit_factor: f64,
    largest_win: f64,
    largest_loss: f64,
}

fn calculate_trade_statistics(trades: &[TradeRecord]) -> TradeStats {
    if trades.is_empty() {
        return TradeStats {
            num_trades: 0,
            num_winning_trades: 0,
            num_losing_trades: 0,
            win_rate: 0.0,
            profit_factor: 0.0,
            largest_win: 0.0,
            largest_loss: 0.0,
        };
    }

    let wins: Vec<f64> = trades
        .iter()
        .filter(|t| t.is_win())
        .map(|t| t.profit_loss)
        .collect();
    let losses: Vec<f64> = trades
        .iter()
        .filter(|t| t.is_loss())
        .map(|t| t.profit_loss)
        .collect();

    let total_wins: f64 = wins.iter().sum();
    let total_losses: f64 = losses.iter().sum::<f64>().abs();

    let profit_factor = if total_losses > 0.0 {
        total_wins / total_losses
    } else if total_wins > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    TradeStats {
        num_trades: trades.len(),
        num_winning_trades: wins.len(),
        num_losing_trades: losses.len(),
        win_rate: wins.len() as f64 / trades.len() as f64,
        profit_factor,
        largest_win: wins.iter().fold(0.0f64, |a, &b| a.max(b)),
        largest_loss: losses.iter().fold(0.0f64, |a, &b| a.min(b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::timeseries::calculate_drawdown_curve;
    use crate::strategy::Direction;
    use chrono::Duration;

    fn d(offset_days: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, 3).unwrap() + Duration::days(offset_days)
    }

    fn trade(profit_loss: f64) -> TradeRecord {
        trade_between(d(0), d(7), profit_loss)
    }

    fn trade_between(entry_date: NaiveDate, exit_date: NaiveDate, profit_loss: f64) -> TradeRecord {
        TradeRecord {
            entry_date,
            exit_date,
            direction: Direction::Long,
            size: 100_000.0,
            profit_loss,
        }
    }

    #[test]
    fn sharpe_uses_population_std() {
        //mean 2, population std 1
        let sharpe = calculate_sharpe_ratio(&[1.0, 3.0], 12.0_f64.sqrt());
        assert!((sharpe - 2.0 * 12.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn sharpe_degenerate_inputs() {
        assert_eq!(calculate_sharpe_ratio(&[], 1.0), 0.0);
        assert_eq!(calculate_sharpe_ratio(&[5.0], 1.0), 0.0);
        assert_eq!(calculate_sharpe_ratio(&[5.0, 5.0, 5.0], 1.0), 0.0);
    }

    #[test]
    fn years_and_cagr() {
        assert_eq!(trading_years(&[]), 1.0);
        assert_eq!(trading_years(&[trade(1.0)]), 1.0);

        //measured on entry dates, exits are ignored
        let span = trading_years(&[
            trade_between(d(0), d(100), 1.0),
            trade_between(d(730), d(760), 1.0),
        ]);
        assert!((span - 730.0 / 365.25).abs() < 1e-12);

        //same entry week gives a zero span
        assert_eq!(
            trading_years(&[trade_between(d(0), d(7), 1.0), trade_between(d(0), d(14), 1.0)]),
            0.0
        );

        assert_eq!(calculate_cagr(2_000_000.0, 1_000_000.0, 0.0), 0.0);
        assert!((calculate_cagr(1_010_000.0, 1_000_000.0, 1.0) - 1.0).abs() < 1e-9);
        assert!((calculate_cagr(1_210_000.0, 1_000_000.0, 2.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn empty_trade_set_is_all_zero() {
        let metrics = PerformanceMetrics::from_trades(
            &[],
            &[],
            &[],
            1_000_000.0,
            1_000_000.0,
            12.0_f64.sqrt(),
        );
        assert_eq!(metrics.sharpe_ratio, 0.0);
        assert_eq!(metrics.max_drawdown, 0.0);
        assert_eq!(metrics.max_drawdown_pct, 0.0);
        assert_eq!(metrics.cagr, 0.0);
        assert_eq!(metrics.num_trades, 0);
        assert_eq!(metrics.profit_factor, 0.0);
    }

    #[test]
    fn trade_statistics() {
        let trades = vec![trade(300.0), trade(-100.0), trade(200.0), trade(-50.0)];
        let pnl: Vec<(NaiveDate, f64)> = trades
            .iter()
            .enumerate()
            .map(|(i, t)| (d(7 * (i as i64 + 1)), t.profit_loss))
            .collect();
        let curve = calculate_drawdown_curve(&pnl);

        let metrics =
            PerformanceMetrics::from_trades(&trades, &pnl, &curve, 1_000_350.0, 1_000_000.0, 1.0);

        assert_eq!(metrics.num_trades, 4);
        assert_eq!(metrics.num_winning_trades, 2);
        assert_eq!(metrics.num_losing_trades, 2);
        assert_eq!(metrics.win_rate, 0.5);
        assert!((metrics.profit_factor - 500.0 / 150.0).abs() < 1e-12);
        assert_eq!(metrics.largest_win, 300.0);
        assert_eq!(metrics.largest_loss, -100.0);
        assert_eq!(metrics.max_drawdown, -100.0);
        assert!((metrics.max_drawdown_pct - 0.01).abs() < 1e-12);
    }

    #[test]
    fn profit_factor_without_losses() {
        let trades = vec![trade(10.0)];
        let pnl = vec![(d(7), 10.0)];
        let metrics = PerformanceMetrics::from_trades(&trades, &pnl, &[], 1_000_010.0, 1_000_000.0, 1.0);
        assert!(metrics.profit_factor.is_infinite());
    }
}
