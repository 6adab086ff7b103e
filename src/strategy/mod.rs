pub mod sizer;

pub use sizer::{Direction, PositionSizer, SizingDecision};
