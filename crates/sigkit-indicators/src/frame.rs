//! Price bars augmented with named indicator columns.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use sigkit_core::error::IndicatorError;
use sigkit_core::traits::{Indicator, OhlcIndicator};
use sigkit_core::types::{Bar, PriceSeries};

use crate::momentum::{macd, Rsi};
use crate::moving_average::{Ema, Sma};
use crate::volatility::Atr;

/// Periods used by [`compute_indicators`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub sma_periods: Vec<usize>,
    pub ema_periods: Vec<usize>,
    pub atr_period: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_periods: vec![20, 50],
            ema_periods: vec![9, 21],
            atr_period: 14,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
        }
    }
}

pub fn sma_column(period: usize) -> String {
    format!("SMA_{}", period)
}

pub fn ema_column(period: usize) -> String {
    format!("EMA_{}", period)
}

pub fn atr_column(period: usize) -> String {
    format!("ATR_{}", period)
}

pub fn rsi_column(period: usize) -> String {
    format!("RSI_{}", period)
}

pub const MACD: &str = "MACD";
pub const MACD_SIGNAL: &str = "MACD_signal";
pub const MACD_HIST: &str = "MACD_hist";

/// A price series plus aligned indicator columns.
///
/// Every column has exactly one entry per bar. Values at index `i` only
/// depend on bars `0..=i`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFrame {
    series: PriceSeries,
    closes: Vec<f64>,
    columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl IndicatorFrame {
    /// Create a frame with no indicator columns.
    pub fn new(series: PriceSeries) -> Self {
        let closes = series.closes();
        Self {
            series,
            closes,
            columns: BTreeMap::new(),
        }
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn bars(&self) -> &[Bar] {
        self.series.bars()
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Value of a column at a bar; `None` if the column is absent or warming up.
    pub fn value(&self, name: &str, index: usize) -> Option<f64> {
        self.columns.get(name)?.get(index).copied().flatten()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Add or replace a column.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        values: Vec<Option<f64>>,
    ) -> Result<(), IndicatorError> {
        let name = name.into();
        if values.len() != self.len() {
            return Err(IndicatorError::LengthMismatch {
                column: name,
                expected: self.len(),
                actual: values.len(),
            });
        }
        self.columns.insert(name, values);
        Ok(())
    }

    /// Fail with the full list of absent columns.
    pub fn require<S: AsRef<str>>(&self, names: &[S]) -> Result<(), IndicatorError> {
        let missing: Vec<String> = names
            .iter()
            .map(AsRef::as_ref)
            .filter(|n| !self.columns.contains_key(*n))
            .map(str::to_string)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(IndicatorError::MissingColumn(missing))
        }
    }

    /// Compute a close-based indicator into the column it names, once.
    pub fn ensure_indicator(
        &mut self,
        indicator: &dyn Indicator,
    ) -> Result<String, IndicatorError> {
        indicator.validate_period()?;
        let name = indicator.name();
        if !self.has_column(&name) {
            let values = indicator.calculate(&self.closes);
            self.insert(name.clone(), values)?;
        }
        Ok(name)
    }

    pub fn ensure_ohlc_indicator(
        &mut self,
        indicator: &dyn OhlcIndicator,
    ) -> Result<String, IndicatorError> {
        check_period(&indicator.name(), indicator.period())?;
        let name = indicator.name();
        if !self.has_column(&name) {
            let (high, low) = (self.series.highs(), self.series.lows());
            let values = indicator.calculate(&high, &low, &self.closes);
            self.insert(name.clone(), values)?;
        }
        Ok(name)
    }

    pub fn ensure_sma(&mut self, period: usize) -> Result<String, IndicatorError> {
        self.ensure_indicator(&Sma::new(period))
    }

    pub fn ensure_ema(&mut self, period: usize) -> Result<String, IndicatorError> {
        self.ensure_indicator(&Ema::new(period))
    }

    pub fn ensure_atr(&mut self, period: usize) -> Result<String, IndicatorError> {
        self.ensure_ohlc_indicator(&Atr::new(period))
    }

    pub fn ensure_rsi(&mut self, period: usize) -> Result<String, IndicatorError> {
        self.ensure_indicator(&Rsi::new(period))
    }

    pub fn ensure_macd(
        &mut self,
        fast: usize,
        slow: usize,
        signal: usize,
    ) -> Result<(), IndicatorError> {
        check_period("MACD fast", fast)?;
        check_period("MACD slow", slow)?;
        check_period("MACD signal", signal)?;

        let out = macd(&self.closes, fast, slow, signal);
        self.insert(MACD, out.macd)?;
        self.insert(MACD_SIGNAL, out.signal)?;
        self.insert(MACD_HIST, out.histogram)?;
        Ok(())
    }
}

fn check_period(kind: &str, period: usize) -> Result<usize, IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(format!(
            "{} period must be > 0",
            kind
        )));
    }
    Ok(period)
}

/// Compute the standard indicator set over a price series.
pub fn compute_indicators(
    series: &PriceSeries,
    config: &IndicatorConfig,
) -> Result<IndicatorFrame, IndicatorError> {
    if series.is_empty() {
        return Err(IndicatorError::EmptyInput);
    }

    let mut frame = IndicatorFrame::new(series.clone());
    for &p in &config.sma_periods {
        frame.ensure_sma(p)?;
    }
    for &p in &config.ema_periods {
        frame.ensure_ema(p)?;
    }
    frame.ensure_atr(config.atr_period)?;
    frame.ensure_rsi(config.rsi_period)?;
    frame.ensure_macd(config.macd_fast, config.macd_slow, config.macd_signal)?;

    debug!(
        symbol = %series.symbol,
        bars = frame.len(),
        columns = frame.columns.len(),
        "Computed indicators"
    );

    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rising(n: usize) -> PriceSeries {
        let bars = (0..n)
            .map(|i| {
                let c = 100.0 + i as f64;
                Bar::new(i as i64 * 86_400_000, c, c + 1.0, c - 1.0, c, 1000.0)
            })
            .collect();
        PriceSeries::new("TEST", bars).unwrap()
    }

    #[test]
    fn test_default_columns() {
        let frame = compute_indicators(&rising(60), &IndicatorConfig::default()).unwrap();

        frame
            .require(&[
                "SMA_20", "SMA_50", "EMA_9", "EMA_21", "ATR_14", "RSI_14", MACD, MACD_SIGNAL,
                MACD_HIST,
            ])
            .unwrap();
        assert_eq!(frame.column("SMA_20").unwrap().len(), 60);
        assert!(frame.value("SMA_20", 18).is_none());
        assert!(frame.value("SMA_20", 19).is_some());
        assert!(frame.value("ATR_14", 13).is_some());
    }

    #[test]
    fn test_require_lists_all_missing() {
        let frame = IndicatorFrame::new(rising(5));
        let err = frame.require(&["EMA_9", "ATR_14"]).unwrap_err();

        match err {
            IndicatorError::MissingColumn(cols) => assert_eq!(cols, vec!["EMA_9", "ATR_14"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_insert_rejects_length_mismatch() {
        let mut frame = IndicatorFrame::new(rising(5));
        let err = frame.insert("X", vec![Some(1.0); 3]).unwrap_err();
        assert!(matches!(err, IndicatorError::LengthMismatch { expected: 5, actual: 3, .. }));
    }

    #[test]
    fn test_zero_period_rejected() {
        let mut frame = IndicatorFrame::new(rising(5));
        assert!(matches!(
            frame.ensure_ema(0),
            Err(IndicatorError::InvalidParameter(_))
        ));
    }

    struct Momentum(usize);

    impl Indicator for Momentum {
        fn calculate(&self, data: &[f64]) -> Vec<Option<f64>> {
            (0..data.len())
                .map(|i| i.checked_sub(self.0).map(|j| data[i] - data[j]))
                .collect()
        }

        fn period(&self) -> usize {
            self.0
        }

        fn name(&self) -> String {
            format!("MOM_{}", self.0)
        }
    }

    #[test]
    fn test_custom_indicator_column() {
        let mut frame = IndicatorFrame::new(rising(5));
        let name = frame.ensure_indicator(&Momentum(2)).unwrap();

        assert_eq!(name, "MOM_2");
        assert!(frame.value("MOM_2", 1).is_none());
        assert_eq!(frame.value("MOM_2", 4), Some(2.0));
        assert!(frame.ensure_indicator(&Momentum(0)).is_err());
    }

    #[test]
    fn test_causal_columns() {
        let full = compute_indicators(&rising(60), &IndicatorConfig::default()).unwrap();
        let head_series = rising(60).prefix(40).unwrap();
        let head = compute_indicators(&head_series, &IndicatorConfig::default()).unwrap();

        for name in ["EMA_9", "ATR_14", "RSI_14", MACD] {
            assert_eq!(&full.column(name).unwrap()[..40], head.column(name).unwrap());
        }
    }
}
