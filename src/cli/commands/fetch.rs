//! Price download command.

use anyhow::Result;
use tracing::{info, warn};

use sigkit_config::AppConfig;
use sigkit_core::traits::PriceProvider;
use sigkit_core::types::Timeframe;
use sigkit_data::{parse_period, price_path, save_bars, YahooConfig, YahooProvider};

use crate::cli::FetchArgs;

pub async fn run(args: FetchArgs, config: &AppConfig) -> Result<()> {
    let interval: Timeframe = args.interval.parse()?;
    if let (Some(limit), Some(span)) = (interval.max_history_days(), parse_period(&args.period)?) {
        if span.num_days() > limit {
            warn!(
                interval = %interval,
                period = %args.period,
                limit_days = limit,
                "Period exceeds the provider's intraday history"
            );
        }
    }
    let provider = YahooProvider::new(YahooConfig::default())?;

    let mut failed = 0usize;
    for ticker in &args.tickers {
        let fetched = match provider.get_historical(ticker, &args.period, interval).await {
            Ok(series) => series,
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "Fetch failed");
                failed += 1;
                continue;
            }
        };

        let path = price_path(&config.paths.data_dir, ticker);
        let saved = save_bars(&path, ticker, fetched.bars(), args.force)?;
        info!(
            ticker = %ticker,
            fetched = fetched.len(),
            total = saved.len(),
            "Saved price history"
        );
        println!("{}: {} bars -> {}", ticker, saved.len(), path.display());
    }

    if failed > 0 {
        println!("{} ticker(s) failed", failed);
    }
    Ok(())
}
