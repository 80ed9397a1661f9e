//! Notification command.

use anyhow::Result;
use std::time::Duration;
use tracing::{error, info};

use sigkit_config::AppConfig;
use sigkit_notify::TelegramNotifier;
use sigkit_signals::{notify_once, CsvSignalStore, Delivery};

use crate::cli::NotifyArgs;

fn report(deliveries: &[Delivery]) {
    println!("Processed {} signals", deliveries.len());
    for d in deliveries {
        match &d.error {
            None => println!("  {} {} ok", d.ticker, d.id),
            Some(e) => println!("  {} {} failed: {}", d.ticker, d.id, e),
        }
    }
}

pub async fn run(args: NotifyArgs, config: &AppConfig) -> Result<()> {
    let store = CsvSignalStore::new(&config.paths.signals_dir)?;
    let test_mode = args.test || config.notify.test_mode;
    let notifier = TelegramNotifier::new(config.telegram.clone(), test_mode)?;

    if !args.loop_mode {
        report(&notify_once(&store, &notifier).await?);
        return Ok(());
    }

    let interval = args.interval.unwrap_or(config.notify.interval_secs).max(1);
    info!(interval, test_mode = notifier.is_test_mode(), "Starting notify loop");
    let mut ticker = tokio::time::interval(Duration::from_secs(interval));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match notify_once(&store, &notifier).await {
                    Ok(deliveries) => report(&deliveries),
                    Err(e) => error!(error = %e, "Notify pass failed"),
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
