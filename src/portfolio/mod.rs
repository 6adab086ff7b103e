pub mod account;
pub mod ledger;
pub mod position;

pub use account::{Accountant, PortfolioState};
pub use ledger::Ledger;
pub use position::{Position, TradeRecord};
