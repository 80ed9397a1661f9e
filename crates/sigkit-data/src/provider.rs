//! Price provider backed by the per-ticker CSV folder.

use async_trait::async_trait;
use chrono::Duration;
use std::path::PathBuf;
use tracing::debug;

use sigkit_core::error::DataError;
use sigkit_core::traits::PriceProvider;
use sigkit_core::types::{PriceSeries, Timeframe};

use crate::csv_source::load_price_csv;
use crate::price_path;

/// Parse a lookback string (`"5d"`, `"60d"`, `"3mo"`, `"1y"`, `"2wk"`).
///
/// `"max"` means the whole history and returns `None`.
pub fn parse_period(period: &str) -> Result<Option<Duration>, DataError> {
    let p = period.trim().to_lowercase();
    if p == "max" {
        return Ok(None);
    }

    let split = p.find(|c: char| !c.is_ascii_digit()).unwrap_or(p.len());
    let (num, unit) = p.split_at(split);
    let n: i64 = num
        .parse()
        .map_err(|_| DataError::ParseError(format!("Invalid period: {}", period)))?;

    let days = match unit {
        "d" => n,
        "wk" | "w" => n * 7,
        "mo" => n * 30,
        "y" => n * 365,
        _ => return Err(DataError::ParseError(format!("Invalid period: {}", period))),
    };
    Ok(Some(Duration::days(days)))
}

/// Serves prices from `<data_dir>/<TICKER>.csv`.
///
/// The last close stands in for the live price, which makes the watcher
/// usable offline against downloaded history.
#[derive(Debug, Clone)]
pub struct CsvPriceProvider {
    data_dir: PathBuf,
}

impl CsvPriceProvider {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    /// Full history for a ticker.
    pub fn load(&self, ticker: &str) -> Result<PriceSeries, DataError> {
        load_price_csv(&price_path(&self.data_dir, ticker), ticker)
    }
}

#[async_trait]
impl PriceProvider for CsvPriceProvider {
    async fn get_last_price(&self, ticker: &str) -> Result<Option<f64>, DataError> {
        match self.load(ticker) {
            Ok(series) => Ok(series.last().map(|b| b.close)),
            Err(DataError::NotFound(_)) | Err(DataError::Empty) => {
                debug!(ticker, "No local price file");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn get_historical(
        &self,
        ticker: &str,
        period: &str,
        _interval: Timeframe,
    ) -> Result<PriceSeries, DataError> {
        let series = self.load(ticker)?;
        let Some(lookback) = parse_period(period)? else {
            return Ok(series);
        };

        let last_ts = series.last().map(|b| b.timestamp).unwrap_or_default();
        let start = last_ts - lookback.num_milliseconds();
        let first = series.count_before(start);
        PriceSeries::new(ticker, series.bars_from(first).to_vec())
    }

    fn name(&self) -> &str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_source::write_price_csv;
    use sigkit_core::types::Bar;

    const DAY: i64 = 86_400_000;

    #[test]
    fn test_parse_period() {
        assert_eq!(parse_period("5d").unwrap(), Some(Duration::days(5)));
        assert_eq!(parse_period("1y").unwrap(), Some(Duration::days(365)));
        assert_eq!(parse_period("3mo").unwrap(), Some(Duration::days(90)));
        assert_eq!(parse_period("MAX").unwrap(), None);
        assert!(parse_period("abc").is_err());
        assert!(parse_period("5q").is_err());
    }

    #[tokio::test]
    async fn test_last_price_and_history() {
        let dir = tempfile::tempdir().unwrap();
        let bars: Vec<Bar> = (0..10).map(|i| Bar::flat(i * DAY, 100.0 + i as f64)).collect();
        write_price_csv(&dir.path().join("BBRI.csv"), &bars).unwrap();

        let provider = CsvPriceProvider::new(dir.path());
        assert_eq!(provider.get_last_price("BBRI").await.unwrap(), Some(109.0));
        assert_eq!(provider.get_last_price("NOPE").await.unwrap(), None);

        let recent = provider.get_historical("BBRI", "3d", Timeframe::Daily).await.unwrap();
        assert_eq!(recent.closes(), vec![106.0, 107.0, 108.0, 109.0]);

        let all = provider.get_historical("BBRI", "max", Timeframe::Daily).await.unwrap();
        assert_eq!(all.len(), 10);
    }
}
