use crate::config::{ConfigError, SimulationConfig};
use crate::data::{FeatureTable, Forecaster};
use crate::metrics::{calculate_drawdown_curve, DrawdownPoint, PerformanceMetrics};
use crate::portfolio::{Accountant, Ledger, Position, TradeRecord};
use crate::signal::{align_signals, AlignedSignals, SignalError};
use crate::strategy::PositionSizer;
use anyhow::Context;
use chrono::NaiveDate;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BacktestError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Signal(#[from] SignalError),
}

//raw model output and realized target on one date axis
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationInputs {
    pub dates: Vec<NaiveDate>,
    pub predictions: Vec<f64>,
    pub truth: Vec<f64>,
}

impl SimulationInputs {
    pub fn new(dates: Vec<NaiveDate>, predictions: Vec<f64>, truth: Vec<f64>) -> Self {
        SimulationInputs {
            dates,
            predictions,
            truth,
        }
    }

    //runs the model over every column except the target
    pub fn from_table(
        table: &FeatureTable,
        forecaster: &dyn Forecaster,
        target_column: &str,
    ) -> anyhow::Result<Self> {
        let truth = table
            .series(target_column)
            .context(format!("Target column '{}' is unusable", target_column))?;

        let features = table.without(&[target_column]);
        let predictions = forecaster
            .predict(&features)
            .context(format!("Model '{}' failed to predict", forecaster.name()))?;

        Ok(SimulationInputs {
            dates: truth.dates().to_vec(),
            predictions,
            truth: truth.values().to_vec(),
        })
    }

    //percentage-change signals for one horizon
    pub fn align(&self, horizon: usize) -> Result<AlignedSignals, SignalError> {
        align_signals(&self.dates, &self.predictions, &self.truth, horizon)
    }
}

//result of a backtest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub config: SimulationConfig,
    pub metrics: PerformanceMetrics,

    //every position opened, in open order
    pub order_book: Vec<Position>,

    //closed positions in close order
    pub trades: Vec<TradeRecord>,

    pub portfolio_curve: Vec<(NaiveDate, f64)>,
    pub pnl_series: Vec<(NaiveDate, f64)>,
    pub drawdown_curve: Vec<DrawdownPoint>,

    //positions whose exit date never matched a step date
    pub open_at_end: Vec<Position>,

    pub signals: AlignedSignals,
}

impl BacktestResult {
    //prints the order book in a formatted table
    pub fn pretty_print_order_book(&self) {
        let mut table = Table::new();

        table.add_row(Row::new(vec![
            Cell::new("Direction"),
            Cell::new("Size"),
            Cell::new("Entry Date"),
            Cell::new("Exit Date"),
        ]));

        for order in &self.order_book {
            table.add_row(Row::new(vec![
                Cell::new(&order.direction.to_string()),
                Cell::new(&format!("{:.2}", order.size)),
                Cell::new(&order.entry_date.format("%Y-%m-%d").to_string()),
                Cell::new(&order.exit_date.format("%Y-%m-%d").to_string()),
            ]));
        }

        table.printstd();
    }
}

//replays one configuration over aligned signals
pub struct BacktestEngine {
    config: SimulationConfig,
    signals: AlignedSignals,
    sizer: PositionSizer,
    ledger: Ledger,
    accountant: Accountant,
}

impl BacktestEngine {
    //creates a new backtest engine
    pub fn new(config: SimulationConfig, signals: AlignedSignals) -> Result<Self, BacktestError> {
        config.validate()?;

        if signals.horizon != config.horizon || signals.is_empty() {
            return Err(SignalError::InvalidHorizon {
                horizon: config.horizon,
                len: signals.len(),
            }
            .into());
        }

        Ok(BacktestEngine {
            sizer: PositionSizer::from_config(&config),
            ledger: Ledger::new(config.commission_rate),
            accountant: Accountant::new(config.initial_aum),
            config,
            signals,
        })
    }

    //exit date for an entry at step i, clamped to the last date
    fn exit_date(&self, i: usize) -> NaiveDate {
        let dates = &self.signals.dates;
        dates
            .get(i + self.config.horizon)
            .or_else(|| dates.last())
            .copied()
            .unwrap_or(dates[i])
    }

    //true change used to realize positions closing at step i
    //i - N below zero wraps once from the end of the true series, further back is an error
    fn realized_change(&self, i: usize) -> Result<f64, SignalError> {
        let horizon = self.config.horizon;
        let len = self.signals.actual.len();

        let idx = if i >= horizon {
            i - horizon
        } else if i + len >= horizon {
            len + i - horizon
        } else {
            return Err(SignalError::InvalidHorizon { horizon, len });
        };

        Ok(self.signals.actual[idx])
    }

    //opens at most one position, then closes every position exiting today
    fn step(&mut self, i: usize) -> Result<(), SignalError> {
        let date = self.signals.dates[i];
        let exit_date = self.exit_date(i);

        if let Some(decision) = self.sizer.decide(
            self.signals.predicted[i],
            date,
            exit_date,
            self.accountant.available_balance(),
        ) {
            self.ledger.open_position(decision, date, exit_date);
            self.accountant.commit(decision.size);
        }

        if !self.ledger.has_exits_on(date) {
            return Ok(());
        }

        let change = self.realized_change(i)?;
        for trade in self.ledger.close_matching(date, change) {
            self.accountant.realize(date, trade);
        }
        Ok(())
    }

    //runs the backtest
    pub fn run(mut self) -> Result<BacktestResult, BacktestError> {
        for i in 0..self.signals.len() {
            self.step(i)?;
        }

        let open_at_end = self.ledger.open_positions();
        if !open_at_end.is_empty() {
            debug!(
                count = open_at_end.len(),
                "positions left open, exit date never matched a step date"
            );
        }

        let state = self.accountant.state();
        let final_portfolio_value = state.portfolio_value;
        let initial_aum = self.accountant.initial_aum();
        let order_book = self.ledger.order_book().to_vec();
        let (portfolio_curve, pnl_series, trades) = self.accountant.into_records();

        let drawdown_curve = calculate_drawdown_curve(&pnl_series);
        let metrics = PerformanceMetrics::from_trades(
            &trades,
            &pnl_series,
            &drawdown_curve,
            final_portfolio_value,
            initial_aum,
            self.config.annualization_factor,
        );

        info!(
            horizon = self.config.horizon,
            trades = metrics.num_trades,
            sharpe = metrics.sharpe_ratio,
            cagr = metrics.cagr,
            final_value = metrics.final_portfolio_value,
            cash = state.cash_balance,
            "backtest complete"
        );

        Ok(BacktestResult {
            config: self.config,
            metrics,
            order_book,
            trades,
            portfolio_curve,
            pnl_series,
            drawdown_curve,
            open_at_end,
            signals: self.signals,
        })
    }
}

//aligns the inputs for the configured horizon and runs one backtest
pub fn run_backtest(
    inputs: &SimulationInputs,
    config: &SimulationConfig,
) -> Result<BacktestResult, BacktestError> {
    config.validate()?;
    let signals = inputs.align(config.horizon)?;
    let engine = BacktestEngine::new(config.clone(), signals)?;
    engine.run()
}
