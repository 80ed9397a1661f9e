//! Watcher command: move open signals to TP/SL.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use sigkit_config::AppConfig;
use sigkit_core::traits::PriceProvider;
use sigkit_data::{load_price_csv, CsvPriceProvider, YahooConfig, YahooProvider};
use sigkit_signals::{CsvSignalStore, StatusUpdate, Watcher};

use super::ticker_from_path;
use crate::cli::WatchArgs;

fn report(updates: &[StatusUpdate]) {
    for u in updates {
        println!("{} {} -> {} at {}", u.ticker, u.id, u.status, u.price);
    }
}

pub async fn run(args: WatchArgs, config: &AppConfig) -> Result<()> {
    let store = Arc::new(CsvSignalStore::new(&config.paths.signals_dir)?);
    let watcher = Watcher::new(store);

    if let Some(path) = &args.simulate {
        let ticker = args.tickers.first().cloned().unwrap_or_else(|| ticker_from_path(path));
        let series = load_price_csv(path, &ticker)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        println!("Simulating backfill for {}, {} rows", ticker, series.len());
        let updates = watcher.simulate_backfill(&ticker, series.bars())?;
        report(&updates);
        println!("{} signal(s) closed", updates.len());
        return Ok(());
    }

    let provider_name = args.provider.as_deref().unwrap_or(&config.watcher.provider);
    let provider: Box<dyn PriceProvider> = match provider_name {
        "csv" => Box::new(CsvPriceProvider::new(&config.paths.data_dir)),
        "yahoo" => Box::new(YahooProvider::new(YahooConfig::default())?),
        other => anyhow::bail!("Unknown price provider '{}'", other),
    };

    let tickers = if args.tickers.is_empty() {
        config.watcher.tickers.clone()
    } else {
        args.tickers.clone()
    };
    let tickers = (!tickers.is_empty()).then_some(tickers);

    if !args.loop_mode {
        let updates = watcher.watch_once(provider.as_ref(), tickers.as_deref()).await?;
        report(&updates);
        println!("{} signal(s) closed", updates.len());
        return Ok(());
    }

    let interval = args.interval.unwrap_or(config.watcher.interval_secs).max(1);
    info!(interval, provider = provider.name(), tickers = ?tickers, "Starting watch loop");
    let mut ticker = tokio::time::interval(Duration::from_secs(interval));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match watcher.watch_once(provider.as_ref(), tickers.as_deref()).await {
                    Ok(updates) => report(&updates),
                    Err(e) => error!(error = %e, "Watch pass failed"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopped by user");
                break;
            }
        }
    }
    Ok(())
}
