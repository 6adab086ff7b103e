use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    #[error("Invalid horizon {horizon} for a series of length {len}")]
    InvalidHorizon { horizon: usize, len: usize },
    #[error("Division by zero: base value at index {index} is 0")]
    DivisionByZero { index: usize },
}

//n-step-ahead percentage change
//element i is the change from values[i] to values[i + horizon], in percent
pub fn percentage_change(values: &[f64], horizon: usize) -> Result<Vec<f64>, SignalError> {
    if horizon < 1 || horizon >= values.len() {
        return Err(SignalError::InvalidHorizon {
            horizon,
            len: values.len(),
        });
    }

    values
        .iter()
        .zip(&values[horizon..])
        .enumerate()
        .map(|(index, (&base, &ahead))| {
            if base == 0.0 {
                Err(SignalError::DivisionByZero { index })
            } else {
                Ok((ahead - base) / base * 100.0)
            }
        })
        .collect()
}

//predicted and realized change series sharing one date axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedSignals {
    pub horizon: usize,

    //date on which each change is observed
    pub dates: Vec<NaiveDate>,

    pub predicted: Vec<f64>,
    pub actual: Vec<f64>,
}

impl AlignedSignals {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

//computes both change series and truncates them to a common length
//dates[i] is the source date at i + horizon
pub fn align_signals(
    dates: &[NaiveDate],
    predictions: &[f64],
    truth: &[f64],
    horizon: usize,
) -> Result<AlignedSignals, SignalError> {
    let mut predicted = percentage_change(predictions, horizon)?;
    let mut actual = percentage_change(truth, horizon)?;

    if predicted.len() != actual.len() {
        warn!(
            predicted = predicted.len(),
            actual = actual.len(),
            "prediction and truth lengths differ, truncating to the shorter"
        );
    }

    let available_dates = dates.len().saturating_sub(horizon);
    let min_len = predicted.len().min(actual.len()).min(available_dates);
    if min_len == 0 {
        return Err(SignalError::InvalidHorizon {
            horizon,
            len: dates.len(),
        });
    }

    predicted.truncate(min_len);
    actual.truncate(min_len);

    Ok(AlignedSignals {
        horizon,
        dates: dates[horizon..horizon + min_len].to_vec(),
        predicted,
        actual,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn weekly(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2020, 1, 3).unwrap();
        (0..n).map(|i| start + Duration::weeks(i as i64)).collect()
    }

    #[test]
    fn one_step_changes() {
        let pct = percentage_change(&[100.0, 110.0, 90.0, 120.0], 1).unwrap();
        assert_eq!(pct.len(), 3);
        assert!((pct[0] - 10.0).abs() < 1e-12);
        assert!((pct[1] - (-18.181818181818183)).abs() < 1e-9);
        assert!((pct[2] - 33.333333333333336).abs() < 1e-9);
    }

    #[test]
    fn multi_step_changes() {
        let pct = percentage_change(&[100.0, 110.0, 90.0, 120.0], 2).unwrap();
        assert_eq!(pct.len(), 2);
        assert!((pct[0] - (-10.0)).abs() < 1e-12);
        assert!((pct[1] - 9.090909090909092).abs() < 1e-9);
    }

    #[test]
    fn invalid_horizons() {
        let values = [1.0, 2.0, 3.0];
        assert_eq!(
            percentage_change(&values, 0),
            Err(SignalError::InvalidHorizon { horizon: 0, len: 3 })
        );
        assert_eq!(
            percentage_change(&values, 3),
            Err(SignalError::InvalidHorizon { horizon: 3, len: 3 })
        );
        assert!(percentage_change(&[], 1).is_err());
    }

    #[test]
    fn zero_base_is_an_error() {
        assert_eq!(
            percentage_change(&[1.0, 0.0, 2.0], 1),
            Err(SignalError::DivisionByZero { index: 1 })
        );
        //zero in the look-ahead slot is fine
        assert_eq!(percentage_change(&[2.0, 0.0], 1), Ok(vec![-100.0]));
    }

    #[test]
    fn alignment_truncates_to_shorter_series() {
        let dates = weekly(6);
        let predictions = [1.0, 2.0, 3.0, 4.0, 5.0];
        let truth = [10.0, 11.0, 12.0, 13.0, 14.0, 15.0];

        let aligned = align_signals(&dates, &predictions, &truth, 2).unwrap();
        assert_eq!(aligned.len(), 3);
        assert_eq!(aligned.predicted.len(), 3);
        assert_eq!(aligned.actual.len(), 3);
        assert_eq!(aligned.dates, dates[2..5].to_vec());
        assert!((aligned.actual[0] - 20.0).abs() < 1e-12);
    }

    #[test]
    fn alignment_propagates_errors() {
        let dates = weekly(3);
        assert!(matches!(
            align_signals(&dates, &[1.0, 2.0, 3.0], &[0.0, 1.0, 2.0], 1),
            Err(SignalError::DivisionByZero { index: 0 })
        ));
        assert!(matches!(
            align_signals(&dates, &[1.0, 2.0, 3.0], &[1.0, 1.0, 2.0], 5),
            Err(SignalError::InvalidHorizon { .. })
        ));
    }
}
