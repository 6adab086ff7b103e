use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use forecast_backtest::prelude::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fcbt")]
#[command(about = "Backtests a trading strategy driven by spot price forecasts", long_about = None)]
struct Cli {
    //log per-position events
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    //run a single backtest
    Run {
        #[command(flatten)]
        common: CommonArgs,
    },

    //sweep the horizon and pick the best sharpe ratio
    Sweep {
        #[command(flatten)]
        common: CommonArgs,

        //smallest horizon to test
        #[arg(long)]
        min_horizon: Option<usize>,

        //largest horizon to test
        #[arg(long)]
        max_horizon: Option<usize>,

        //max drawdown (% of aum) a candidate may have
        #[arg(long)]
        max_dd_floor: Option<f64>,
    },

    //write a default configuration file
    InitConfig {
        #[arg(long, default_value = "backtest.json")]
        output: PathBuf,
    },
}

#[derive(Args)]
struct CommonArgs {
    //path to json configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    //path to csv data file
    #[arg(long)]
    data: Option<PathBuf>,

    //name of the date column
    #[arg(long)]
    date_column: Option<String>,

    //name of the realized target column
    #[arg(long)]
    target: Option<String>,

    //column holding exported predictions
    #[arg(long, conflicts_with = "model")]
    prediction_column: Option<String>,

    //linear model coefficients (json)
    #[arg(long)]
    model: Option<PathBuf>,

    //initial assets under management
    #[arg(long)]
    initial_aum: Option<f64>,

    //fraction of aum that may be put at risk
    #[arg(long)]
    risk_tolerance: Option<f64>,

    //minimum absolute forecast change in percent
    #[arg(long)]
    threshold: Option<f64>,

    //forecast horizon and holding period in steps
    #[arg(long)]
    horizon: Option<usize>,

    //commission as a fraction of position size
    #[arg(long)]
    commission: Option<f64>,

    //output path for trades csv
    #[arg(long)]
    output_trades_csv: Option<PathBuf>,

    //output path for portfolio value csv
    #[arg(long)]
    output_portfolio_csv: Option<PathBuf>,

    //output path for the full result as json
    #[arg(long)]
    output_json: Option<PathBuf>,
}

impl CommonArgs {
    //loads the config file (or defaults) and applies command line overrides
    fn resolve(&self) -> Result<BacktestConfiguration> {
        let mut config = match &self.config {
            Some(path) => BacktestConfiguration::from_json_file(path)
                .context(format!("Failed to load config from {:?}", path))?,
            None => BacktestConfiguration::default(),
        };

        if let Some(data) = &self.data {
            config.data_path = data.clone();
        }
        if let Some(date_column) = &self.date_column {
            config.date_column = date_column.clone();
        }
        if let Some(target) = &self.target {
            config.target_column = target.clone();
        }
        if let Some(name) = &self.prediction_column {
            config.forecast = ForecastSource::Column { name: name.clone() };
        }
        if let Some(model_path) = &self.model {
            config.forecast = ForecastSource::Linear {
                model_path: model_path.clone(),
            };
        }

        let sim = &mut config.simulation;
        if let Some(v) = self.initial_aum {
            sim.initial_aum = v;
        }
        if let Some(v) = self.risk_tolerance {
            sim.risk_tolerance = v;
        }
        if let Some(v) = self.threshold {
            sim.threshold = v;
        }
        if let Some(v) = self.horizon {
            sim.horizon = v;
        }
        if let Some(v) = self.commission {
            sim.commission_rate = v;
        }

        if self.output_trades_csv.is_some() {
            config.output_trades_csv = self.output_trades_csv.clone();
        }
        if self.output_portfolio_csv.is_some() {
            config.output_portfolio_csv = self.output_portfolio_csv.clone();
        }
        if self.output_json.is_some() {
            config.output_json = self.output_json.clone();
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run { common } => {
            let config = common.resolve()?;
            run_single(&config)?;
        }
        Commands::Sweep {
            common,
            min_horizon,
            max_horizon,
            max_dd_floor,
        } => {
            let mut config = common.resolve()?;
            if let Some(v) = min_horizon {
                config.sweep.min_horizon = v;
            }
            if let Some(v) = max_horizon {
                config.sweep.max_horizon = v;
            }
            if max_dd_floor.is_some() {
                config.sweep.max_drawdown_floor_pct = max_dd_floor;
            }
            run_sweep(&config)?;
        }
        Commands::InitConfig { output } => {
            BacktestConfiguration::default().to_json_file(&output)?;
            println!("Default configuration written to {:?}", output);
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_forecaster(source: &ForecastSource) -> Result<Box<dyn Forecaster>> {
    let forecaster: Box<dyn Forecaster> = match source {
        ForecastSource::Column { name } => Box::new(ColumnForecaster::new(name.clone())),
        ForecastSource::Linear { model_path } => {
            Box::new(LinearForecaster::from_json_file(model_path)?)
        }
    };
    Ok(forecaster)
}

fn load_inputs(config: &BacktestConfiguration) -> Result<SimulationInputs> {
    println!("Loading data from {:?}...", config.data_path);
    let table = load_csv(&config.data_path, &config.date_column)
        .context(format!("Failed to load data from {:?}", config.data_path))?;

    if let (Some(first), Some(last)) = (table.dates().first(), table.dates().last()) {
        println!("Loaded {} rows ({} to {})\n", table.len(), first, last);
    }

    let forecaster = build_forecaster(&config.forecast)?;
    SimulationInputs::from_table(&table, forecaster.as_ref(), &config.target_column)
}

fn print_parameters(sim: &SimulationConfig) {
    println!("Initial AUM: ${:.2}", sim.initial_aum);
    println!("Risk: {}%", sim.risk_tolerance * 100.0);
    println!("Threshold: {}%", sim.threshold);
    println!("Commission: {}%\n", sim.commission_rate * 100.0);
}

fn run_single(config: &BacktestConfiguration) -> Result<()> {
    println!("Forecast Backtesting Engine");
    println!("===========================\n");

    let inputs = load_inputs(config)?;
    print_parameters(&config.simulation);
    println!("N: {} steps\n", config.simulation.horizon);

    let result = run_backtest(&inputs, &config.simulation)?;
    report(config, &result)
}

fn run_sweep(config: &BacktestConfiguration) -> Result<()> {
    println!("Forecast Backtesting Engine - Horizon Sweep");
    println!("===========================================\n");

    let inputs = load_inputs(config)?;
    print_parameters(&config.simulation);
    println!(
        "Testing N = {}..={}\n",
        config.sweep.min_horizon, config.sweep.max_horizon
    );

    let sweep = sweep_horizons(&inputs, &config.simulation, &config.sweep)?;
    sweep.pretty_print_table();

    for (horizon, reason) in &sweep.skipped {
        println!("Skipped N = {}: {}", horizon, reason);
    }

    let Some(optimal) = sweep.optimal_horizon else {
        println!("\nNo horizon satisfied the drawdown floor");
        return Ok(());
    };

    println!("\nOptimal N: {}\n", optimal);

    //rerun the optimal horizon for the full report
    let result = run_backtest(&inputs, &config.simulation.with_horizon(optimal))?;
    report(config, &result)
}

fn report(config: &BacktestConfiguration, result: &BacktestResult) -> Result<()> {
    println!("Backtest Results");
    println!("================\n");
    result.metrics.pretty_print_table();

    println!("\nOrder Book:");
    result.pretty_print_order_book();

    if !result.open_at_end.is_empty() {
        println!(
            "\n{} position(s) never reached their exit date",
            result.open_at_end.len()
        );
    }

    //save outputs if requested
    if let Some(path) = &config.output_trades_csv {
        save_trades_csv(&result.trades, path)?;
        println!("\nTrades saved to {:?}", path);
    }

    if let Some(path) = &config.output_portfolio_csv {
        save_portfolio_csv(&result.portfolio_curve, path)?;
        println!("Portfolio values saved to {:?}", path);
    }

    if let Some(path) = &config.output_json {
        let json = serde_json::to_string_pretty(result)?;
        std::fs::write(path, json).context(format!("Failed to write {:?}", path))?;
        println!("Result saved to {:?}", path);
    }

    Ok(())
}

fn save_trades_csv(trades: &[TradeRecord], path: &Path) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).context(format!("Failed to create {:?}", path))?;

    for trade in trades {
        writer.serialize(trade)?;
    }

    writer.flush()?;
    Ok(())
}

fn save_portfolio_csv(curve: &[(chrono::NaiveDate, f64)], path: &Path) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).context(format!("Failed to create {:?}", path))?;
    writer.write_record(["date", "portfolio_value"])?;

    for (date, value) in curve {
        writer.write_record([date.format("%Y-%m-%d").to_string(), value.to_string()])?;
    }

    writer.flush()?;
    Ok(())
}
