//! Backtest command implementation.

use anyhow::{Context, Result};
use std::fs::File;
use tracing::{info, warn};

use sigkit_backtest::BacktestEngine;
use sigkit_config::AppConfig;
use sigkit_data::load_price_csv;

use super::load_series;
use crate::cli::BacktestArgs;

pub async fn run(args: BacktestArgs, config: &AppConfig) -> Result<()> {
    let mut backtest_config = config.backtest_config();
    if let Some(alignment) = &args.alignment {
        backtest_config.entry_alignment = alignment.parse().map_err(anyhow::Error::msg)?;
    }
    let engine = BacktestEngine::new(backtest_config).context("Invalid strategy parameters")?;

    let data_dir = args.data_dir.clone().unwrap_or_else(|| config.paths.data_dir.clone());
    let out_dir = args.out.clone().unwrap_or_else(|| config.paths.reports_dir.clone());

    if args.csv.is_some() && args.tickers.len() > 1 {
        anyhow::bail!("--csv loads a single ticker; pass exactly one with --tickers");
    }

    let mut done = 0usize;
    let mut skipped = 0usize;

    for ticker in &args.tickers {
        let loaded = match &args.csv {
            Some(path) => load_price_csv(path, ticker)
                .with_context(|| format!("Failed to load {}", path.display())),
            None => load_series(&data_dir, ticker),
        };
        let series = match loaded {
            Ok(series) => series,
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "Skipping ticker");
                skipped += 1;
                continue;
            }
        };

        info!(ticker = %ticker, bars = series.len(), "Running backtest");
        let report = engine.run(&series);

        match args.output.as_str() {
            "json" => println!("{}", report.to_json()?),
            _ => println!("{}", report.summary()),
        }

        let path = report.save_json(&out_dir)?;
        info!("Report saved to {}", path.display());

        if args.trades_csv {
            let trades_path = out_dir.join(format!("trades_{}.csv", ticker));
            report.write_trades_csv(File::create(&trades_path)?)?;
            info!("Trades saved to {}", trades_path.display());
        }
        done += 1;
    }

    println!("Backtested {} ticker(s), skipped {}", done, skipped);
    Ok(())
}
