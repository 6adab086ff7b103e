use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Initial AUM must be positive, got {0}")]
    NonPositiveAum(f64),
    #[error("Risk tolerance must be in (0, 1], got {0}")]
    InvalidRiskTolerance(f64),
    #[error("Threshold must be non-negative, got {0}")]
    NegativeThreshold(f64),
    #[error("Commission rate must be in [0, 1), got {0}")]
    InvalidCommission(f64),
    #[error("Horizon must be at least 1")]
    ZeroHorizon,
    #[error("Annualization factor must be positive, got {0}")]
    InvalidAnnualization(f64),
    #[error("Sweep range {min}..={max} is empty")]
    EmptySweepRange { min: usize, max: usize },
}

//parameters of a single simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    //starting capital
    pub initial_aum: f64,

    //fraction of aum that may be put at risk
    pub risk_tolerance: f64,

    //minimum absolute forecast change (percent) that triggers a trade
    pub threshold: f64,

    //forecast horizon and holding period, in steps
    pub horizon: usize,

    //fraction of notional charged per closed position
    pub commission_rate: f64,

    //multiplier applied to mean/std of trade pnl
    //defaults to sqrt(12) whatever the sampling frequency
    #[serde(default = "default_annualization_factor")]
    pub annualization_factor: f64,
}

fn default_annualization_factor() -> f64 {
    12.0_f64.sqrt()
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            initial_aum: 1_000_000.0,
            risk_tolerance: 0.75,
            threshold: 15.0,
            horizon: 36,
            commission_rate: 0.05,
            annualization_factor: default_annualization_factor(),
        }
    }
}

impl SimulationConfig {
    //capital that a 100% forecast would allocate
    pub fn max_risk_amount(&self) -> f64 {
        self.initial_aum * self.risk_tolerance
    }

    //returns a copy with a different horizon
    pub fn with_horizon(&self, horizon: usize) -> Self {
        SimulationConfig {
            horizon,
            ..self.clone()
        }
    }

    //rejects values the simulator cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.initial_aum > 0.0) {
            return Err(ConfigError::NonPositiveAum(self.initial_aum));
        }
        if !(self.risk_tolerance > 0.0 && self.risk_tolerance <= 1.0) {
            return Err(ConfigError::InvalidRiskTolerance(self.risk_tolerance));
        }
        if !(self.threshold >= 0.0) {
            return Err(ConfigError::NegativeThreshold(self.threshold));
        }
        if !(self.commission_rate >= 0.0 && self.commission_rate < 1.0) {
            return Err(ConfigError::InvalidCommission(self.commission_rate));
        }
        if self.horizon == 0 {
            return Err(ConfigError::ZeroHorizon);
        }
        if !(self.annualization_factor > 0.0) {
            return Err(ConfigError::InvalidAnnualization(self.annualization_factor));
        }
        Ok(())
    }
}

//parameters of a horizon sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub min_horizon: usize,
    pub max_horizon: usize,

    //candidates whose max drawdown (% of aum) exceeds this are not eligible
    #[serde(default)]
    pub max_drawdown_floor_pct: Option<f64>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            min_horizon: 1,
            max_horizon: 51,
            max_drawdown_floor_pct: None,
        }
    }
}

impl SweepConfig {
    pub fn horizons(&self) -> Vec<usize> {
        (self.min_horizon..=self.max_horizon).collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_horizon == 0 {
            return Err(ConfigError::ZeroHorizon);
        }
        if self.min_horizon > self.max_horizon {
            return Err(ConfigError::EmptySweepRange {
                min: self.min_horizon,
                max: self.max_horizon,
            });
        }
        Ok(())
    }
}

//where the predicted series comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForecastSource {
    //predictions already exported as a column of the data file
    Column { name: String },
    //linear model coefficients stored as json
    Linear { model_path: PathBuf },
}

//complete run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestConfiguration {
    //data
    pub data_path: PathBuf,
    pub date_column: String,
    pub target_column: String,
    pub forecast: ForecastSource,

    //simulation
    pub simulation: SimulationConfig,

    #[serde(default)]
    pub sweep: SweepConfig,

    //optional output paths
    #[serde(default)]
    pub output_trades_csv: Option<PathBuf>,
    #[serde(default)]
    pub output_portfolio_csv: Option<PathBuf>,
    #[serde(default)]
    pub output_json: Option<PathBuf>,
}

impl Default for BacktestConfiguration {
    fn default() -> Self {
        BacktestConfiguration {
            data_path: PathBuf::from("NG/test.csv"),
            date_column: "DATE".to_string(),
            target_column: "NG_Spot_Price".to_string(),
            forecast: ForecastSource::Column {
                name: "Predicted_Spot_Price".to_string(),
            },
            simulation: SimulationConfig::default(),
            sweep: SweepConfig::default(),
            output_trades_csv: None,
            output_portfolio_csv: None,
            output_json: None,
        }
    }
}

impl BacktestConfiguration {
    //load configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: BacktestConfiguration = serde_json::from_str(&contents)?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
        assert!(SweepConfig::default().validate().is_ok());
        assert_eq!(SimulationConfig::default().max_risk_amount(), 750_000.0);
    }

    #[test]
    fn rejects_bad_values() {
        let base = SimulationConfig::default();

        let cfg = SimulationConfig {
            initial_aum: 0.0,
            ..base.clone()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::NonPositiveAum(0.0)));

        let cfg = SimulationConfig {
            risk_tolerance: 1.5,
            ..base.clone()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidRiskTolerance(1.5)));

        let cfg = SimulationConfig {
            commission_rate: 1.0,
            ..base.clone()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidCommission(1.0)));

        assert_eq!(base.with_horizon(0).validate(), Err(ConfigError::ZeroHorizon));

        let sweep = SweepConfig {
            min_horizon: 10,
            max_horizon: 5,
            max_drawdown_floor_pct: None,
        };
        assert!(matches!(
            sweep.validate(),
            Err(ConfigError::EmptySweepRange { min: 10, max: 5 })
        ));
    }

    #[test]
    fn json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = BacktestConfiguration::default();
        config.simulation.threshold = 10.0;
        config.forecast = ForecastSource::Linear {
            model_path: PathBuf::from("model.json"),
        };
        config.to_json_file(&path).unwrap();

        let loaded = BacktestConfiguration::from_json_file(&path).unwrap();
        assert_eq!(loaded.simulation, config.simulation);
        assert_eq!(loaded.forecast, config.forecast);
    }

    #[test]
    fn annualization_defaults_when_missing() {
        let json = r#"{
            "initial_aum": 500000.0,
            "risk_tolerance": 1.0,
            "threshold": 10.0,
            "horizon": 4,
            "commission_rate": 0.0
        }"#;
        let cfg: SimulationConfig = serde_json::from_str(json).unwrap();
        assert!((cfg.annualization_factor - 12.0_f64.sqrt()).abs() < 1e-12);
    }
}
