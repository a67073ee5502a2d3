//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_trade_adapter::JsonTradeAdapter;
use crate::adapters::tiingo_adapter::TiingoAdapter;
use crate::domain::error::QmoneyError;
use crate::domain::evaluator::PortfolioEvaluator;
use crate::domain::quotes;
use crate::domain::returns::AnnualizedReturn;
use crate::domain::trade::{self, Trade};
use crate::logging::{self, LogConfig, LogFormat};
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::trade_port::TradePort;

#[derive(Parser, Debug)]
#[command(name = "qmoney", about = "Annualized returns for a portfolio of stock trades")]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Read candles from `<DIR>/<SYMBOL>.csv` instead of Tiingo
    #[arg(long, global = true)]
    pub csv_dir: Option<PathBuf>,
    /// pretty, compact or json
    #[arg(long, global = true, default_value = "compact")]
    pub log_format: LogFormat,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the symbols in a trade file, in file order
    Symbols { trades: String },
    /// List symbols ascending by closing price on the end date
    Closing { trades: String, end_date: NaiveDate },
    /// Compute total and annualized returns, best first
    Returns {
        trades: String,
        end_date: NaiveDate,
        /// Evaluate on this many worker threads (fail-fast)
        #[arg(short, long)]
        workers: Option<usize>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    if let Err(e) = logging::init_logging(&LogConfig::default().with_format(cli.log_format)) {
        eprintln!("warning: logging disabled: {e}");
    }

    let result = match &cli.command {
        Command::Symbols { trades } => run_symbols(trades),
        Command::Closing { trades, end_date } => run_closing(&cli, trades, *end_date),
        Command::Returns {
            trades,
            end_date,
            workers,
        } => run_returns(&cli, trades, *end_date, *workers),
    };

    match result {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, QmoneyError> {
    match path {
        Some(path) => {
            FileConfigAdapter::from_file(path).map_err(|e| QmoneyError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

/// CSV directory from the flag, then `[market_data] csv_dir`; Tiingo otherwise.
pub fn build_market_data(
    config: &dyn ConfigPort,
    csv_dir: Option<&Path>,
) -> Result<Box<dyn MarketDataPort>, QmoneyError> {
    let csv_dir = csv_dir
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("market_data", "csv_dir").map(PathBuf::from));

    match csv_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "using CSV market data");
            Ok(Box::new(CsvAdapter::new(dir)))
        }
        None => {
            info!("using Tiingo market data");
            Ok(Box::new(TiingoAdapter::from_config(config)?))
        }
    }
}

/// Worker count from the flag, then `[evaluation] workers`. `None` means the
/// sequential evaluator.
pub fn resolve_workers(
    flag: Option<usize>,
    config: &dyn ConfigPort,
) -> Result<Option<usize>, QmoneyError> {
    if flag.is_some() {
        return Ok(flag);
    }
    Ok(config
        .get_positive_int("evaluation", "workers")?
        .map(|n| n as usize))
}

pub fn compute_returns(
    market_data: &dyn MarketDataPort,
    trades: &[Trade],
    end_date: NaiveDate,
    workers: Option<usize>,
) -> Result<Vec<AnnualizedReturn>, QmoneyError> {
    let evaluator = PortfolioEvaluator::new(market_data);
    match workers {
        Some(n) => evaluator.evaluate_parallel(trades, end_date, n),
        None => evaluator.evaluate(trades, end_date),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, QmoneyError> {
    serde_json::to_string_pretty(value).map_err(|e| QmoneyError::Io(e.into()))
}

pub fn run_symbols(trades_source: &str) -> Result<String, QmoneyError> {
    let trades = JsonTradeAdapter::new().load_trades(trades_source)?;
    to_json(&trade::symbols(&trades))
}

fn run_closing(cli: &Cli, trades_source: &str, end_date: NaiveDate) -> Result<String, QmoneyError> {
    let config = load_config(cli.config.as_deref())?;
    let trades = JsonTradeAdapter::new().load_trades(trades_source)?;
    let market_data = build_market_data(&config, cli.csv_dir.as_deref())?;

    let prices = quotes::closing_prices(market_data.as_ref(), &trades, end_date)?;
    let symbols: Vec<&str> = prices.iter().map(|p| p.symbol.as_str()).collect();
    to_json(&symbols)
}

fn run_returns(
    cli: &Cli,
    trades_source: &str,
    end_date: NaiveDate,
    workers: Option<usize>,
) -> Result<String, QmoneyError> {
    let config = load_config(cli.config.as_deref())?;
    let workers = resolve_workers(workers, &config)?;
    let trades = JsonTradeAdapter::new().load_trades(trades_source)?;
    let market_data = build_market_data(&config, cli.csv_dir.as_deref())?;

    let results = compute_returns(market_data.as_ref(), &trades, end_date, workers)?;
    to_json(&results)
}
