//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sigkit")]
#[command(
    author,
    version,
    about = "Trading-signal toolkit: crossover signals, TP/SL backtests and tracking"
)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level (overrides the config file)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    /// Also write JSON logs to this file (rotated daily)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate signals on price history and replay them
    Backtest(BacktestArgs),
    /// Sweep a parameter grid, optionally with walk-forward folds
    Tune(TuneArgs),
    /// Generate, list or add stored signals
    #[command(subcommand)]
    Signals(SignalsCommand),
    /// Resolve open signals against prices
    Watch(WatchArgs),
    /// Send notifications for new open signals
    Notify(NotifyArgs),
    /// Download price history into the data folder
    Fetch(FetchArgs),
    /// Reconcile two trade CSV exports
    Compare(CompareArgs),
    /// Validate configuration
    ValidateConfig,
    /// Print configuration as TOML
    ShowConfig(ShowConfigArgs),
}

#[derive(clap::Args)]
pub struct BacktestArgs {
    /// Tickers to backtest (comma-separated)
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub tickers: Vec<String>,

    /// Price CSV for a single ticker (instead of the data folder)
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Data folder with <TICKER>.csv files
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Folder for report_<TICKER>.json
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Entry alignment (exact, prior)
    #[arg(long)]
    pub alignment: Option<String>,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    pub output: String,

    /// Also write trades_<TICKER>.csv
    #[arg(long)]
    pub trades_csv: bool,
}

#[derive(clap::Args)]
pub struct TuneArgs {
    /// Ticker to tune
    #[arg(short, long)]
    pub ticker: String,

    /// Price CSV (defaults to <data_dir>/<TICKER>.csv)
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Preset grid name
    #[arg(long, conflicts_with = "grid")]
    pub preset: Option<String>,

    /// JSON grid, e.g. '{"ema_fast":[5,9],"ema_slow":[21,50]}'
    #[arg(long)]
    pub grid: Option<String>,

    /// Walk-forward window in days (full history when absent)
    #[arg(long)]
    pub walk: Option<i64>,

    /// Output folder
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Evaluate combinations one at a time
    #[arg(long)]
    pub sequential: bool,
}

#[derive(Subcommand)]
pub enum SignalsCommand {
    /// Generate signals from price history
    Generate(GenerateArgs),
    /// List stored signals
    List(ListArgs),
    /// Store a signal by hand
    Add(AddArgs),
}

#[derive(clap::Args)]
pub struct GenerateArgs {
    /// Tickers (comma-separated)
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub tickers: Vec<String>,

    /// Keep only the most recent N signals per ticker
    #[arg(long)]
    pub last: Option<usize>,

    /// Persist new signals to the signal store
    #[arg(long)]
    pub save: bool,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Only this ticker
    #[arg(short, long)]
    pub ticker: Option<String>,

    /// Only this status (OPEN, TP, SL, END)
    #[arg(short, long)]
    pub status: Option<String>,
}

#[derive(clap::Args)]
pub struct AddArgs {
    #[arg(short, long)]
    pub ticker: String,
    #[arg(long)]
    pub entry: f64,
    #[arg(long)]
    pub tp: f64,
    #[arg(long)]
    pub sl: f64,
    /// Entry time (defaults to now)
    #[arg(long)]
    pub time: Option<String>,
    #[arg(long, default_value = "manual")]
    pub strategy_version: String,
}

#[derive(clap::Args)]
pub struct WatchArgs {
    /// Tickers to check (comma-separated); all with open signals when empty
    #[arg(short, long, value_delimiter = ',')]
    pub tickers: Vec<String>,

    /// Backfill open signals from this price CSV
    #[arg(long)]
    pub simulate: Option<PathBuf>,

    /// Keep polling until interrupted
    #[arg(long = "loop")]
    pub loop_mode: bool,

    /// Seconds between polls
    #[arg(long)]
    pub interval: Option<u64>,

    /// Price provider (csv, yahoo)
    #[arg(long)]
    pub provider: Option<String>,
}

#[derive(clap::Args)]
pub struct NotifyArgs {
    /// Keep sending until interrupted
    #[arg(long = "loop")]
    pub loop_mode: bool,

    /// Seconds between passes
    #[arg(long)]
    pub interval: Option<u64>,

    /// Render messages without sending
    #[arg(long)]
    pub test: bool,
}

#[derive(clap::Args)]
pub struct FetchArgs {
    /// Tickers to download (comma-separated)
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub tickers: Vec<String>,

    /// Lookback period (e.g. 60d, 1y)
    #[arg(long, default_value = "60d")]
    pub period: String,

    /// Bar interval (e.g. 1d, 1h)
    #[arg(long, default_value = "1d")]
    pub interval: String,

    /// Overwrite instead of merging with the existing file
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args)]
pub struct CompareArgs {
    #[arg(short, long)]
    pub ticker: String,

    /// Trades exported by the live engine
    #[arg(long)]
    pub engine: PathBuf,

    /// Trades exported by the backtester
    #[arg(long)]
    pub backtest: PathBuf,

    /// Folder for compare_<TICKER>.csv
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct ShowConfigArgs {
    /// Print the loaded configuration instead of the defaults
    #[arg(long)]
    pub effective: bool,
}
