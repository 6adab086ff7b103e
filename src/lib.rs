//a Rust-based backtesting engine for forecast-driven commodity trading signals

pub mod config;
pub mod data;
pub mod engine;
pub mod metrics;
pub mod portfolio;
pub mod signal;
pub mod strategy;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{
        BacktestConfiguration, ConfigError, ForecastSource, SimulationConfig, SweepConfig,
    };
    pub use crate::data::{
        load_csv, ColumnForecaster, FeatureTable, Forecaster, LinearForecaster, PriceSeries,
        SeriesError,
    };
    pub use crate::engine::{
        run_backtest, sweep_horizons, BacktestEngine, BacktestError, BacktestResult,
        SimulationInputs, SweepOutcome, SweepReport,
    };
    pub use crate::metrics::{calculate_drawdown_curve, DrawdownPoint, PerformanceMetrics};
    pub use crate::portfolio::{Accountant, Ledger, PortfolioState, Position, TradeRecord};
    pub use crate::signal::{align_signals, percentage_change, AlignedSignals, SignalError};
    pub use crate::strategy::{Direction, PositionSizer, SizingDecision};
}
