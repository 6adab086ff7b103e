use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("Series is empty")]
    Empty,
    #[error("Dates are not increasing at index {index}")]
    UnorderedDates { index: usize },
    #[error("Duplicate date: {date}")]
    DuplicateDate { date: NaiveDate },
    #[error("Length mismatch: {dates} dates but {values} values")]
    LengthMismatch { dates: usize, values: usize },
    #[error("Unknown column: {0}")]
    MissingColumn(String),
}

//checks that dates are strictly increasing
fn check_dates(dates: &[NaiveDate]) -> Result<(), SeriesError> {
    for (index, pair) in dates.windows(2).enumerate() {
        if pair[1] == pair[0] {
            return Err(SeriesError::DuplicateDate { date: pair[1] });
        }
        if pair[1] < pair[0] {
            return Err(SeriesError::UnorderedDates { index: index + 1 });
        }
    }
    Ok(())
}

//ordered (date, value) pairs with strictly increasing dates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl PriceSeries {
    //creates a validated series
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self, SeriesError> {
        if dates.len() != values.len() {
            return Err(SeriesError::LengthMismatch {
                dates: dates.len(),
                values: values.len(),
            });
        }
        if dates.is_empty() {
            return Err(SeriesError::Empty);
        }
        check_dates(&dates)?;

        Ok(PriceSeries { dates, values })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

}

//date-indexed table of named numeric columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTable {
    dates: Vec<NaiveDate>,
    columns: IndexMap<String, Vec<f64>>,
}

impl FeatureTable {
    //creates an empty table over the given date axis
    pub fn new(dates: Vec<NaiveDate>) -> Result<Self, SeriesError> {
        check_dates(&dates)?;
        Ok(FeatureTable {
            dates,
            columns: IndexMap::new(),
        })
    }

    //adds or replaces a column
    pub fn insert_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), SeriesError> {
        if values.len() != self.dates.len() {
            return Err(SeriesError::LengthMismatch {
                dates: self.dates.len(),
                values: values.len(),
            });
        }
        self.columns.insert(name.into(), values);
        Ok(())
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(|v| v.as_slice())
    }

    //column names in file order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    //returns a copy without the named columns
    pub fn without(&self, excluded: &[&str]) -> FeatureTable {
        let columns = self
            .columns
            .iter()
            .filter(|(name, _)| !excluded.contains(&name.as_str()))
            .map(|(name, values)| (name.clone(), values.clone()))
            .collect();

        FeatureTable {
            dates: self.dates.clone(),
            columns,
        }
    }

    //builds a price series from one column
    pub fn series(&self, name: &str) -> Result<PriceSeries, SeriesError> {
        let values = self
            .column(name)
            .ok_or_else(|| SeriesError::MissingColumn(name.to_string()))?;
        PriceSeries::new(self.dates.clone(), values.to_vec())
    }
}
