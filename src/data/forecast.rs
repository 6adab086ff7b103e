use crate::data::series::FeatureTable;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

//a fitted model that maps a feature table to one prediction per row
//shared read-only across sweep workers
pub trait Forecaster: Send + Sync {
    fn predict(&self, features: &FeatureTable) -> Result<Vec<f64>>;

    //returns the model name
    fn name(&self) -> &str;
}

//predictions exported by an external model as a table column
#[derive(Debug, Clone)]
pub struct ColumnForecaster {
    column: String,
}

impl ColumnForecaster {
    pub fn new(column: impl Into<String>) -> Self {
        ColumnForecaster {
            column: column.into(),
        }
    }
}

impl Forecaster for ColumnForecaster {
    fn predict(&self, features: &FeatureTable) -> Result<Vec<f64>> {
        features
            .column(&self.column)
            .map(|values| values.to_vec())
            .ok_or_else(|| anyhow::anyhow!("Prediction column '{}' not found", self.column))
    }

    fn name(&self) -> &str {
        &self.column
    }
}

//linear baseline: intercept + sum(coefficient * feature)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearForecaster {
    pub intercept: f64,
    pub coefficients: IndexMap<String, f64>,
}

impl LinearForecaster {
    pub fn new(intercept: f64, coefficients: IndexMap<String, f64>) -> Self {
        LinearForecaster {
            intercept,
            coefficients,
        }
    }

    //load coefficients from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .context(format!("Failed to read model file {:?}", path))?;
        let model: LinearForecaster = serde_json::from_str(&contents)
            .context(format!("Failed to parse model file {:?}", path))?;
        Ok(model)
    }
}

impl Forecaster for LinearForecaster {
    fn predict(&self, features: &FeatureTable) -> Result<Vec<f64>> {
        let mut predictions = vec![self.intercept; features.len()];

        for (name, &coef) in &self.coefficients {
            let column = features
                .column(name)
                .ok_or_else(|| anyhow::anyhow!("Feature '{}' required by model is missing", name))?;

            for (pred, &x) in predictions.iter_mut().zip(column) {
                *pred += coef * x;
            }
        }

        Ok(predictions)
    }

    fn name(&self) -> &str {
        "linear"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn table() -> FeatureTable {
        let dates = vec![
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
        ];
        let mut table = FeatureTable::new(dates).unwrap();
        table.insert_column("storage", vec![1.0, 2.0]).unwrap();
        table.insert_column("imports", vec![10.0, 20.0]).unwrap();
        table.insert_column("pred", vec![3.0, 4.0]).unwrap();
        table
    }

    #[test]
    fn column_forecaster_reads_column() {
        let model = ColumnForecaster::new("pred");
        assert_eq!(model.predict(&table()).unwrap(), vec![3.0, 4.0]);
        assert!(ColumnForecaster::new("nope").predict(&table()).is_err());
    }

    #[test]
    fn linear_forecaster_combines_features() {
        let mut coefficients = IndexMap::new();
        coefficients.insert("storage".to_string(), 2.0);
        coefficients.insert("imports".to_string(), 0.5);
        let model = LinearForecaster::new(1.0, coefficients);

        //1 + 2*1 + 0.5*10 = 8, 1 + 2*2 + 0.5*20 = 15
        assert_eq!(model.predict(&table()).unwrap(), vec![8.0, 15.0]);
    }

    #[test]
    fn linear_forecaster_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, r#"{"intercept": 0.5, "coefficients": {"storage": 1.0}}"#).unwrap();

        let model = LinearForecaster::from_json_file(&path).unwrap();
        assert_eq!(model.predict(&table()).unwrap(), vec![1.5, 2.5]);

        let mut coefficients = IndexMap::new();
        coefficients.insert("missing".to_string(), 1.0);
        assert!(LinearForecaster::new(0.0, coefficients).predict(&table()).is_err());
    }
}
