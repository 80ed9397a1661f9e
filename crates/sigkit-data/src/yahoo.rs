//! Yahoo Finance chart endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use sigkit_core::error::DataError;
use sigkit_core::traits::PriceProvider;
use sigkit_core::types::{Bar, PriceSeries, Timeframe};

/// Yahoo chart client configuration.
#[derive(Debug, Clone)]
pub struct YahooConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            timeout_secs: 15,
            max_retries: 3,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize, Default)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Price provider for the Yahoo v8 chart API.
pub struct YahooProvider {
    config: YahooConfig,
    client: Client,
}

impl YahooProvider {
    pub fn new(config: YahooConfig) -> Result<Self, DataError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("Mozilla/5.0 (compatible; sigkit)")
            .build()
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        Ok(Self { config, client })
    }

    async fn fetch_chart(
        &self,
        ticker: &str,
        range: &str,
        interval: Timeframe,
    ) -> Result<ChartResult, DataError> {
        let url = format!("{}/v8/finance/chart/{}", self.config.base_url, ticker);
        let params = [("range", range.to_string()), ("interval", interval.to_string())];

        let mut attempt = 0u32;
        loop {
            match self.request_once(&url, &params).await {
                Ok(body) => return parse_chart(ticker, &body),
                Err(DataError::ConnectionError(msg)) if attempt + 1 < self.config.max_retries => {
                    attempt += 1;
                    let backoff = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(ticker, attempt, error = %msg, "Chart request failed, retrying");
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn request_once(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<String, DataError> {
        let resp = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        let status = resp.status();
        if status.as_u16() == 404 {
            return Err(DataError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(DataError::ConnectionError(format!("HTTP {}: {}", status, text)));
        }

        resp.text()
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))
    }
}

/// Decode a chart payload, keeping only rows with complete OHLC.
fn parse_chart(ticker: &str, body: &str) -> Result<ChartResult, DataError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| DataError::ParseError(e.to_string()))?;

    if let Some(err) = response.chart.error {
        return Err(DataError::NotFound(format!("{}: {} ({})", ticker, err.description, err.code)));
    }

    response
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.swap_remove(0)) })
        .ok_or_else(|| DataError::NotFound(ticker.to_string()))
}

fn chart_bars(result: &ChartResult) -> Vec<Bar> {
    let Some(quote) = result.indicators.quote.first() else {
        return Vec::new();
    };

    result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let open = quote.open.get(i).copied().flatten()?;
            let high = quote.high.get(i).copied().flatten()?;
            let low = quote.low.get(i).copied().flatten()?;
            let close = quote.close.get(i).copied().flatten()?;
            let volume = quote.volume.get(i).copied().flatten().unwrap_or(0.0);
            Some(Bar::new(ts * 1000, open, high, low, close, volume))
        })
        .collect()
}

#[async_trait]
impl PriceProvider for YahooProvider {
    async fn get_last_price(&self, ticker: &str) -> Result<Option<f64>, DataError> {
        let result = self.fetch_chart(ticker, "5d", Timeframe::Daily).await?;
        if let Some(price) = result.meta.regular_market_price {
            return Ok(Some(price));
        }
        Ok(chart_bars(&result).last().map(|b| b.close))
    }

    async fn get_historical(
        &self,
        ticker: &str,
        period: &str,
        interval: Timeframe,
    ) -> Result<PriceSeries, DataError> {
        let result = self.fetch_chart(ticker, period, interval).await?;
        let mut bars = chart_bars(&result);
        let raw = result.timestamp.len();
        if bars.len() < raw {
            debug!(ticker, skipped = raw - bars.len(), "Dropped rows with missing prices");
        }

        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);
        PriceSeries::new(ticker, bars)
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}
