//! Signal generation and store commands.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use sigkit_config::AppConfig;
use sigkit_core::traits::SignalStore;
use sigkit_core::types::{NewSignal, Signal, SignalFilter, SignalStatus};
use sigkit_data::parse_timestamp;
use sigkit_signals::CsvSignalStore;
use sigkit_strategy::SignalGenerator;

use super::load_series;
use crate::cli::{AddArgs, GenerateArgs, ListArgs};

fn print_signal(signal: &Signal, qty: Option<u64>) {
    let qty = qty.map(|q| format!(" qty={}", q)).unwrap_or_default();
    println!(
        "{} {} {} entry={} tp={} sl={} [{}] {}{}",
        signal.timestamp.format("%Y-%m-%d %H:%M"),
        signal.side,
        signal.ticker,
        signal.entry,
        signal.tp,
        signal.sl,
        signal.strategy_version,
        signal.status,
        qty
    );
}

fn position_size(config: &AppConfig, signal: &Signal) -> Option<u64> {
    let risk = &config.risk;
    risk.position_sizer().size_f64(risk.balance, signal.entry, signal.sl).ok()
}

pub async fn generate(args: GenerateArgs, config: &AppConfig) -> Result<()> {
    let generator =
        SignalGenerator::new(config.strategy.clone()).context("Invalid strategy parameters")?;
    let store = if args.save {
        Some(CsvSignalStore::new(&config.paths.signals_dir)?)
    } else {
        None
    };

    for ticker in &args.tickers {
        let series = match load_series(&config.paths.data_dir, ticker) {
            Ok(series) => series,
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "Skipping ticker");
                continue;
            }
        };

        let batch = generator.generate(&series);
        let mut signals = batch.signals;
        if let Some(n) = args.last {
            let skip = signals.len().saturating_sub(n);
            signals.drain(..skip);
        }

        info!(
            ticker = %ticker,
            signals = signals.len(),
            strict_crosses = batch.strict_cross_count,
            fallback = batch.fallback_used,
            "Signals generated"
        );

        let existing = match &store {
            Some(store) => store.list(&SignalFilter::ticker(ticker.as_str()))?,
            None => Vec::new(),
        };

        for signal in &signals {
            print_signal(signal, position_size(config, signal));

            if let Some(store) = &store {
                let duplicate = existing.iter().any(|s| {
                    s.timestamp == signal.timestamp && s.strategy_version == signal.strategy_version
                });
                if duplicate {
                    info!(id = %signal.id, "Already stored, skipping");
                    continue;
                }
                let stored = store.create(signal.to_new())?;
                println!("  saved as {}", stored.id);
            }
        }
    }
    Ok(())
}

pub async fn list(args: ListArgs, config: &AppConfig) -> Result<()> {
    let store = CsvSignalStore::new(&config.paths.signals_dir)?;
    let filter = SignalFilter {
        ticker: args.ticker.clone(),
        status: args
            .status
            .as_deref()
            .map(str::parse::<SignalStatus>)
            .transpose()
            .map_err(anyhow::Error::msg)?,
        notified: None,
    };

    let signals = store.list(&filter)?;
    for signal in &signals {
        print_signal(signal, None);
        println!("  id={} notified={}", signal.id, signal.notified);
    }
    println!("{} signal(s)", signals.len());
    Ok(())
}

pub async fn add(args: AddArgs, config: &AppConfig) -> Result<()> {
    if !(args.tp > args.entry && args.entry > args.sl && args.sl >= 0.0) {
        anyhow::bail!("Expected tp > entry > sl >= 0");
    }

    let timestamp = match &args.time {
        Some(text) => {
            let ms = parse_timestamp(text)?;
            DateTime::from_timestamp_millis(ms).context("Entry time out of range")?
        }
        None => Utc::now(),
    };

    let store = CsvSignalStore::new(&config.paths.signals_dir)?;
    let signal = store.create(NewSignal {
        ticker: args.ticker,
        timestamp,
        entry: args.entry,
        tp: args.tp,
        sl: args.sl,
        strategy_version: args.strategy_version,
    })?;

    print_signal(&signal, position_size(config, &signal));
    println!("  saved as {}", signal.id);
    Ok(())
}
