use crate::config::{SimulationConfig, SweepConfig};
use crate::engine::backtest::{run_backtest, BacktestError, BacktestResult, SimulationInputs};
use prettytable::{Cell, Row, Table};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

//headline numbers of one sweep candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepOutcome {
    pub horizon: usize,
    pub sharpe_ratio: f64,
    pub cagr: f64,
    pub max_drawdown: f64,
    pub max_drawdown_pct: f64,
    pub final_portfolio_value: f64,
    pub num_trades: usize,

    //passes the drawdown floor
    pub eligible: bool,
}

impl SweepOutcome {
    fn from_result(result: &BacktestResult, floor_pct: Option<f64>) -> Self {
        let m = &result.metrics;
        SweepOutcome {
            horizon: result.config.horizon,
            sharpe_ratio: m.sharpe_ratio,
            cagr: m.cagr,
            max_drawdown: m.max_drawdown,
            max_drawdown_pct: m.max_drawdown_pct,
            final_portfolio_value: m.final_portfolio_value,
            num_trades: m.num_trades,
            eligible: floor_pct.map_or(true, |floor| m.max_drawdown_pct <= floor),
        }
    }
}

//all candidates of a sweep plus the chosen horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    //successful candidates in horizon order
    pub outcomes: Vec<SweepOutcome>,

    //horizons that could not be simulated, with the reason
    pub skipped: Vec<(usize, String)>,

    //eligible horizon with the highest sharpe ratio
    pub optimal_horizon: Option<usize>,
}

impl SweepReport {
    pub fn optimal(&self) -> Option<&SweepOutcome> {
        let horizon = self.optimal_horizon?;
        self.outcomes.iter().find(|o| o.horizon == horizon)
    }

    //prints every candidate in a formatted table
    pub fn pretty_print_table(&self) {
        let mut table = Table::new();

        table.add_row(Row::new(vec![
            Cell::new("N"),
            Cell::new("Sharpe"),
            Cell::new("CAGR"),
            Cell::new("Max DD %"),
            Cell::new("Final Value"),
            Cell::new("Trades"),
            Cell::new(""),
        ]));

        for o in &self.outcomes {
            let marker = if Some(o.horizon) == self.optimal_horizon {
                "*"
            } else if !o.eligible {
                "x"
            } else {
                ""
            };

            table.add_row(Row::new(vec![
                Cell::new(&o.horizon.to_string()),
                Cell::new(&format!("{:.3}", o.sharpe_ratio)),
                Cell::new(&format!("{:.2}%", o.cagr)),
                Cell::new(&format!("{:.2}%", o.max_drawdown_pct)),
                Cell::new(&format!("${:.2}", o.final_portfolio_value)),
                Cell::new(&o.num_trades.to_string()),
                Cell::new(marker),
            ]));
        }

        table.printstd();
    }
}

//first eligible candidate with the strictly highest sharpe ratio
//nan sharpe ratios never win
pub fn select_optimal(outcomes: &[SweepOutcome]) -> Option<usize> {
    let mut best: Option<&SweepOutcome> = None;

    for outcome in outcomes.iter().filter(|o| o.eligible) {
        if outcome.sharpe_ratio.is_nan() {
            continue;
        }
        match best {
            Some(b) if outcome.sharpe_ratio <= b.sharpe_ratio => {}
            _ => best = Some(outcome),
        }
    }

    best.map(|o| o.horizon)
}

//runs an independent backtest per horizon in parallel
pub fn sweep_horizons(
    inputs: &SimulationInputs,
    base: &SimulationConfig,
    sweep: &SweepConfig,
) -> Result<SweepReport, BacktestError> {
    sweep.validate()?;
    base.with_horizon(sweep.min_horizon).validate()?;

    let horizons = sweep.horizons();
    let results: Vec<(usize, Result<BacktestResult, BacktestError>)> = horizons
        .par_iter()
        .map(|&horizon| (horizon, run_backtest(inputs, &base.with_horizon(horizon))))
        .collect();

    let mut outcomes = Vec::with_capacity(results.len());
    let mut skipped = Vec::new();

    for (horizon, result) in results {
        match result {
            Ok(result) => {
                outcomes.push(SweepOutcome::from_result(&result, sweep.max_drawdown_floor_pct))
            }
            Err(err) => {
                warn!(horizon, error = %err, "skipping horizon");
                skipped.push((horizon, err.to_string()));
            }
        }
    }

    let optimal_horizon = select_optimal(&outcomes);

    info!(
        candidates = outcomes.len(),
        skipped = skipped.len(),
        optimal = ?optimal_horizon,
        "sweep complete"
    );

    Ok(SweepReport {
        outcomes,
        skipped,
        optimal_horizon,
    })
}
