//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{self, CsvAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report_adapter::JsonReportAdapter;
use crate::domain::analysis::{self, AnalysisReport};
use crate::domain::config_validation::{AnalysisConfig, build_analysis_config};
use crate::domain::error::PricecastError;
use crate::domain::features;
use crate::domain::model::ModelKind;
use crate::domain::simulator;
use crate::ports::data_port::PriceSource;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "pricecast",
    about = "Closing-price forecasting and crossover simulation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute features, fit a model and forecast
    Analyze {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// JSON report path; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Overrides [model] kind
        #[arg(long)]
        model: Option<String>,
        /// Overrides [model] horizon
        #[arg(long)]
        horizon: Option<usize>,
        /// Also run the crossover simulation
        #[arg(long)]
        simulate: bool,
        #[arg(long)]
        compact: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Write the engineered feature table as CSV
    Features {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run only the crossover simulation
    Signals {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Overrides [trading] initial_capital
        #[arg(long)]
        capital: Option<f64>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Analyze {
            input,
            config,
            output,
            model,
            horizon,
            simulate,
            compact,
        } => {
            let overrides = Overrides {
                model,
                horizon,
                simulate,
            };
            run_analyze(
                &input,
                config.as_deref(),
                output.as_deref(),
                &overrides,
                compact,
            )
        }
        Command::Validate { config } => run_validate(&config),
        Command::Features {
            input,
            config,
            output,
        } => run_features(&input, config.as_deref(), output.as_deref()),
        Command::Signals {
            input,
            config,
            capital,
        } => run_signals(&input, config.as_deref(), capital),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub model: Option<String>,
    pub horizon: Option<usize>,
    pub simulate: bool,
}

pub fn resolve_config(
    config_path: Option<&Path>,
    overrides: &Overrides,
) -> Result<AnalysisConfig, PricecastError> {
    let mut config = match config_path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            let adapter = FileConfigAdapter::from_file(path)?;
            build_analysis_config(&adapter)?
        }
        None => AnalysisConfig::default(),
    };

    if let Some(name) = &overrides.model {
        config.model = name.parse::<ModelKind>()?;
    }
    if let Some(horizon) = overrides.horizon {
        if horizon == 0 {
            return Err(PricecastError::InvalidParameter {
                name: "horizon".into(),
                reason: "must be at least 1".into(),
            });
        }
        config.horizon = horizon;
    }
    if overrides.simulate {
        config.simulate_trading = true;
    }
    Ok(config)
}

fn run_analyze(
    input: &Path,
    config_path: Option<&Path>,
    output: Option<&Path>,
    overrides: &Overrides,
    compact: bool,
) -> Result<(), PricecastError> {
    let config = resolve_config(config_path, overrides)?;

    eprintln!("Loading prices from {}", input.display());
    let series = CsvAdapter::new(input.to_path_buf())
        .with_max_rows(config.max_rows)
        .load()?;
    eprintln!("Loaded {} rows", series.len());

    let report = analysis::run_analysis(&series, &config)?;
    print_summary(&report);

    JsonReportAdapter { compact }.write(&report, output)?;
    if let Some(path) = output {
        eprintln!("Report written to {}", path.display());
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), PricecastError> {
    let config = resolve_config(Some(config_path), &Overrides::default())?;

    eprintln!("Configuration is valid");
    eprintln!("  model:           {}", config.model);
    eprintln!("  train fraction:  {}", config.train_fraction);
    eprintln!("  horizon:         {}", config.horizon);
    let groups: Vec<String> = config
        .enabled_features
        .groups()
        .map(|g| g.to_string())
        .collect();
    eprintln!("  features:        {}", groups.join(", "));
    eprintln!("  simulate:        {}", config.simulate_trading);
    eprintln!("  initial capital: {:.2}", config.initial_capital);
    eprintln!("  max rows:        {}", config.max_rows);
    if config.model == ModelKind::RandomForest {
        let forest = &config.forest;
        eprintln!(
            "  forest:          {} trees, seed {}, max depth {}",
            forest.n_trees,
            forest.seed,
            forest
                .max_depth
                .map_or_else(|| "unlimited".to_string(), |d| d.to_string())
        );
    }
    Ok(())
}

fn run_features(
    input: &Path,
    config_path: Option<&Path>,
    output: Option<&Path>,
) -> Result<(), PricecastError> {
    let config = resolve_config(config_path, &Overrides::default())?;
    let series = CsvAdapter::new(input.to_path_buf())
        .with_max_rows(config.max_rows)
        .load()?;

    let table = features::compute(&series, &config.enabled_features);
    eprintln!(
        "{} of {} rows have every feature defined",
        table.len(),
        series.len()
    );

    match output {
        Some(path) => {
            csv_adapter::write_features(&table, BufWriter::new(File::create(path)?))?;
            eprintln!("Features written to {}", path.display());
        }
        None => csv_adapter::write_features(&table, io::stdout().lock())?,
    }
    Ok(())
}

fn run_signals(
    input: &Path,
    config_path: Option<&Path>,
    capital: Option<f64>,
) -> Result<(), PricecastError> {
    let config = resolve_config(config_path, &Overrides::default())?;
    let capital = capital.unwrap_or(config.initial_capital);
    let series = CsvAdapter::new(input.to_path_buf())
        .with_max_rows(config.max_rows)
        .load()?;
    let result = simulator::simulate(&series, capital)?;

    println!(
        "{:<12} {:<12} {:>10} {:>10} {:>8} {:>12} {:>9}",
        "entry", "exit", "entry_px", "exit_px", "qty", "pnl", "return%"
    );
    for t in &result.trades {
        println!(
            "{:<12} {:<12} {:>10.2} {:>10.2} {:>8} {:>12.2} {:>9.2}",
            t.entry_date.to_string(),
            t.exit_date.to_string(),
            t.entry_price,
            t.exit_price,
            t.quantity,
            t.pnl,
            t.return_pct
        );
    }
    if let Some(open) = &result.open_position {
        println!(
            "open since {} at {:.2} x {}",
            open.entry_date, open.entry_price, open.quantity
        );
    }

    let m = &result.metrics;
    eprintln!();
    eprintln!("Trades:          {}", m.total_trades);
    eprintln!("Profitable:      {}", m.profitable_trades);
    eprintln!("Total PnL:       {:.2}", m.total_pnl);
    eprintln!("Win rate:        {:.2}%", m.win_rate);
    eprintln!("Avg return:      {:.2}%", m.avg_return);
    eprintln!("Final capital:   {:.2}", m.final_capital);
    Ok(())
}

fn print_summary(report: &AnalysisReport) {
    eprintln!();
    eprintln!("Model:           {}", report.model);
    eprintln!(
        "Feature rows:    {} ({} train / {} test)",
        report.feature_rows, report.train_size, report.test_size
    );
    eprintln!("RMSE:            {:.4}", report.metrics.rmse);
    eprintln!("MAE:             {:.4}", report.metrics.mae);
    eprintln!("R2:              {:.4}", report.metrics.r2);
    if let (Some(first), Some(last)) = (report.future.first(), report.future.last()) {
        eprintln!(
            "Forecast:        {:.4} ({} to {})",
            first.value, first.date, last.date
        );
    }
    if let Some(trading) = &report.trading {
        let m = &trading.metrics;
        eprintln!(
            "Trading:         {} trades, win rate {:.2}%, final capital {:.2}",
            m.total_trades, m.win_rate, m.final_capital
        );
    }
    eprintln!();
}
