use crate::config::SimulationConfig;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

//trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    //negative forecasts short, everything else (including 0) goes long
    pub fn from_forecast(pct_change: f64) -> Self {
        if pct_change < 0.0 {
            Direction::Short
        } else {
            Direction::Long
        }
    }

    //converts to pnl sign (Long = +1, Short = -1)
    pub fn sign(&self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

//direction and capital chosen for one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizingDecision {
    pub direction: Direction,
    pub size: f64,
}

//turns a forecast into a trade decision
#[derive(Debug, Clone)]
pub struct PositionSizer {
    max_risk_amount: f64,
    threshold: f64,
    min_holding_days: i64,
}

impl PositionSizer {
    pub fn new(max_risk_amount: f64, threshold: f64, min_holding_days: i64) -> Self {
        PositionSizer {
            max_risk_amount,
            threshold,
            min_holding_days,
        }
    }

    //the holding period must span at least `horizon` calendar days
    pub fn from_config(config: &SimulationConfig) -> Self {
        PositionSizer::new(
            config.max_risk_amount(),
            config.threshold,
            config.horizon as i64,
        )
    }

    //capital a forecast asks for before the balance clamp
    pub fn raw_size(&self, pct_change: f64) -> f64 {
        self.max_risk_amount * pct_change.abs() / 100.0
    }

    //returns none when the forecast is below threshold, the holding period
    //is too short, or there is no free capital left
    pub fn decide(
        &self,
        pct_change: f64,
        entry_date: NaiveDate,
        exit_date: NaiveDate,
        available_balance: f64,
    ) -> Option<SizingDecision> {
        if !(pct_change.abs() > self.threshold) {
            return None;
        }

        if (exit_date - entry_date).num_days() < self.min_holding_days {
            return None;
        }

        //insufficient capital clamps instead of failing
        let size = self.raw_size(pct_change).min(available_balance);
        if !(size > 0.0) {
            return None;
        }

        Some(SizingDecision {
            direction: Direction::from_forecast(pct_change),
            size,
        })
    }
}
