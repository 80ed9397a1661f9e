//! CLI command implementations.

pub mod backtest;
pub mod compare;
pub mod config;
pub mod fetch;
pub mod notify;
pub mod signals;
pub mod tune;
pub mod watch;

use anyhow::{Context, Result};
use std::path::Path;

use sigkit_core::types::PriceSeries;
use sigkit_data::{load_price_csv, price_path};

/// Load `<data_dir>/<TICKER>.csv`.
pub fn load_series(data_dir: &Path, ticker: &str) -> Result<PriceSeries> {
    let path = price_path(data_dir, ticker);
    load_price_csv(&path, ticker).with_context(|| format!("Failed to load {}", path.display()))
}

/// Ticker implied by a price file name.
pub fn ticker_from_path(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("DATA")
        .to_string()
}
