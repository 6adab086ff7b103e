pub mod summary;
pub mod timeseries;

pub use summary::{calculate_cagr, calculate_sharpe_ratio, trading_years, PerformanceMetrics};
pub use timeseries::{calculate_drawdown_curve, max_drawdown, DrawdownPoint};
