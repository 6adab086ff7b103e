pub mod percent_change;

pub use percent_change::{align_signals, percentage_change, AlignedSignals, SignalError};
