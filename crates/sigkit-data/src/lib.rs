//! Price data for the signal toolkit.
//!
//! - Per-ticker CSV files (`Datetime,Open,High,Low,Close,Volume`): load, write, merge
//! - [`CsvPriceProvider`]: last price and history served from those files
//! - [`YahooProvider`]: HTTP chart endpoint

mod csv_source;
mod provider;
mod yahoo;

pub use csv_source::{load_price_csv, merge_bars, parse_timestamp, save_bars, write_price_csv};
pub use provider::{parse_period, CsvPriceProvider};
pub use yahoo::{YahooConfig, YahooProvider};

use std::path::{Path, PathBuf};

/// Path of the price file for a ticker inside a data folder.
pub fn price_path(data_dir: &Path, ticker: &str) -> PathBuf {
    data_dir.join(format!("{}.csv", ticker))
}
