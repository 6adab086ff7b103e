pub mod forecast;
pub mod loader;
pub mod series;

pub use forecast::{ColumnForecaster, Forecaster, LinearForecaster};
pub use loader::load_csv;
pub use series::{FeatureTable, PriceSeries, SeriesError};
