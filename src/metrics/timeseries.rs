use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

//a point on the cumulative pnl curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownPoint {
    pub date: NaiveDate,

    //running sum of realized pnl
    pub cumulative: f64,

    //cumulative minus its running max, always <= 0
    pub drawdown: f64,
}

//calculates the cumulative pnl curve with absolute drawdowns
//the running max starts at the first cumulative value, not at zero
pub fn calculate_drawdown_curve(pnl_series: &[(NaiveDate, f64)]) -> Vec<DrawdownPoint> {
    let mut curve = Vec::with_capacity(pnl_series.len());
    let mut cumulative = 0.0;
    let mut peak = f64::NEG_INFINITY;

    for &(date, pnl) in pnl_series {
        cumulative += pnl;
        peak = peak.max(cumulative);

        curve.push(DrawdownPoint {
            date,
            cumulative,
            drawdown: cumulative - peak,
        });
    }

    curve
}

//deepest drawdown on the curve, 0 when empty
pub fn max_drawdown(curve: &[DrawdownPoint]) -> f64 {
    curve
        .iter()
        .map(|point| point.drawdown)
        .fold(0.0, f64::min)
}
