use crate::portfolio::position::{Position, TradeRecord};
use crate::strategy::SizingDecision;
use chrono::NaiveDate;
use indexmap::IndexMap;
use tracing::debug;

//open positions indexed by exit date, plus the log of every order opened
#[derive(Debug, Clone)]
pub struct Ledger {
    //exit date -> positions in open order
    open: IndexMap<NaiveDate, Vec<Position>>,

    //every position ever opened, in open order
    order_book: Vec<Position>,

    commission_rate: f64,
    next_id: u64,
}

impl Ledger {
    pub fn new(commission_rate: f64) -> Self {
        Ledger {
            open: IndexMap::new(),
            order_book: Vec::new(),
            commission_rate,
            next_id: 1,
        }
    }

    //records a new open position and returns it
    pub fn open_position(
        &mut self,
        decision: SizingDecision,
        entry_date: NaiveDate,
        exit_date: NaiveDate,
    ) -> Position {
        let position = Position::new(
            self.next_id,
            decision.direction,
            decision.size,
            entry_date,
            exit_date,
        );
        self.next_id += 1;

        debug!(
            id = position.id,
            direction = %position.direction,
            size = position.size,
            %entry_date,
            %exit_date,
            "opened position"
        );

        self.order_book.push(position.clone());
        self.open
            .entry(exit_date)
            .or_default()
            .push(position.clone());

        position
    }

    //closes every position whose exit date equals `date` exactly
    //all of them realize against the same true change
    pub fn close_matching(&mut self, date: NaiveDate, actual_pct_change: f64) -> Vec<TradeRecord> {
        let Some(positions) = self.open.shift_remove(&date) else {
            return Vec::new();
        };

        positions
            .iter()
            .map(|position| {
                let profit_loss = position.realized_pnl(actual_pct_change, self.commission_rate);
                debug!(
                    id = position.id,
                    direction = %position.direction,
                    size = position.size,
                    profit_loss,
                    %date,
                    "closed position"
                );
                TradeRecord::from_position(position, profit_loss)
            })
            .collect()
    }

    //open positions sorted by open order
    pub fn open_positions(&self) -> Vec<Position> {
        let mut positions: Vec<Position> = self.open.values().flatten().cloned().collect();
        positions.sort_by_key(|p| p.id);
        positions
    }

    //true when some open position exits on `date`
    pub fn has_exits_on(&self, date: NaiveDate) -> bool {
        self.open.contains_key(&date)
    }

    pub fn order_book(&self) -> &[Position] {
        &self.order_book
    }
}
