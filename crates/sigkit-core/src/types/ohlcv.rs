//! Price bars and the validated series the indicators and simulators read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// One OHLCV bar. `timestamp` is UTC epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// A flat bar where every price equals `price` (used for last-price ticks).
    pub fn flat(timestamp: i64, price: f64) -> Self {
        Self::new(timestamp, price, price, price, price, 0.0)
    }

    /// Whether all price fields are finite numbers.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
    }

    /// Get the timestamp as a DateTime.
    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or_default()
    }

    /// Calculate the true range (used for ATR).
    ///
    /// The first bar of a series has no previous close and uses `high - low`.
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        match prev_close {
            Some(pc) => {
                let hl = self.high - self.low;
                let hc = (self.high - pc).abs();
                let lc = (self.low - pc).abs();
                hl.max(hc).max(lc)
            }
            None => self.high - self.low,
        }
    }
}

/// Validated, strictly ascending price history for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    /// Ticker identifier
    pub symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Build a series, rejecting empty input and non-increasing timestamps.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, DataError> {
        if bars.is_empty() {
            return Err(DataError::Empty);
        }

        for (i, pair) in bars.windows(2).enumerate() {
            let (prev, cur) = (pair[0].timestamp, pair[1].timestamp);
            if cur == prev {
                return Err(DataError::DuplicateTimestamp {
                    index: i + 1,
                    timestamp: cur,
                });
            }
            if cur < prev {
                return Err(DataError::Unordered { index: i + 1 });
            }
        }

        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a constructed series; kept for slice-like ergonomics.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Index of the bar with exactly this timestamp.
    pub fn position_of(&self, timestamp: i64) -> Option<usize> {
        self.bars.binary_search_by_key(&timestamp, |b| b.timestamp).ok()
    }

    /// Index of the latest bar at or before `timestamp`.
    pub fn position_at_or_before(&self, timestamp: i64) -> Option<usize> {
        match self.bars.binary_search_by_key(&timestamp, |b| b.timestamp) {
            Ok(i) => Some(i),
            Err(0) => None,
            Err(i) => Some(i - 1),
        }
    }

    /// Number of bars with timestamp strictly before `timestamp`.
    pub fn count_before(&self, timestamp: i64) -> usize {
        self.bars.partition_point(|b| b.timestamp < timestamp)
    }

    /// Bars from `index` to the end.
    pub fn bars_from(&self, index: usize) -> &[Bar] {
        &self.bars[index.min(self.bars.len())..]
    }

    /// Leading bars `[0, end)` as a new series; `None` if that would be empty.
    pub fn prefix(&self, end: usize) -> Option<PriceSeries> {
        let end = end.min(self.bars.len());
        if end == 0 {
            return None;
        }
        Some(Self {
            symbol: self.symbol.clone(),
            bars: self.bars[..end].to_vec(),
        })
    }

    /// Column extractors for the indicator functions.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }
}
