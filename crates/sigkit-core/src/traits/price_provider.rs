//! Price provider trait definitions.

use async_trait::async_trait;

use crate::error::DataError;
use crate::types::{PriceSeries, Timeframe};

/// Source of last prices and historical bars.
///
/// `period` uses provider-style lookback strings such as `"5d"`, `"60d"`
/// or `"1y"`.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Most recent traded price, or `None` if the provider has nothing.
    async fn get_last_price(&self, ticker: &str) -> Result<Option<f64>, DataError>;

    /// Historical bars ordered from oldest to newest.
    async fn get_historical(
        &self,
        ticker: &str,
        period: &str,
        interval: Timeframe,
    ) -> Result<PriceSeries, DataError>;

    /// Get the provider name.
    fn name(&self) -> &str;
}
