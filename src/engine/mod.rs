pub mod backtest;
pub mod sweep;

pub use backtest::{
    run_backtest, BacktestEngine, BacktestError, BacktestResult, SimulationInputs,
};
pub use sweep::{select_optimal, sweep_horizons, SweepOutcome, SweepReport};
