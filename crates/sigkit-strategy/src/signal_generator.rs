//! EMA crossover signal generator.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use sigkit_core::error::StrategyError;
use sigkit_core::types::{NewSignal, PriceSeries, Signal};
use sigkit_indicators::frame::{atr_column, ema_column, sma_column};
use sigkit_indicators::IndicatorFrame;
use sigkit_risk::compute_tp_sl;

use crate::params::SignalParams;

/// Guards the close / ATR ratio against a vanishing ATR.
const RATIO_EPSILON: f64 = 1e-9;

/// Classification of one bar by the fast/slow EMA pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarState {
    /// Fast EMA at or below slow EMA, or either still warming up
    NoSignal,
    /// Fast EMA above slow EMA
    PermissiveCandidate,
    /// Fast EMA crossed above slow EMA on this bar
    StrictCross,
}

/// Classify bar `i` from the EMA pairs at `i - 1` and `i`.
///
/// A strict cross needs both bars defined, so the first valid bar can
/// never be one.
pub fn classify_bar(prev: Option<(f64, f64)>, current: Option<(f64, f64)>) -> BarState {
    let Some((fast, slow)) = current else {
        return BarState::NoSignal;
    };
    if fast <= slow {
        return BarState::NoSignal;
    }
    match prev {
        Some((prev_fast, prev_slow)) if prev_fast <= prev_slow => BarState::StrictCross,
        _ => BarState::PermissiveCandidate,
    }
}

/// Output of one generator pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalBatch {
    pub signals: Vec<Signal>,
    /// Bars where fast EMA > slow EMA (strict crosses included)
    pub permissive_count: usize,
    /// Bars where fast EMA crossed above slow EMA
    pub strict_cross_count: usize,
    /// Whether the signals came from the permissive fallback
    pub fallback_used: bool,
}

impl SignalBatch {
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

/// Crossover signal generator.
#[derive(Debug, Clone)]
pub struct SignalGenerator {
    params: SignalParams,
}

impl SignalGenerator {
    /// Create a generator after validating its parameters.
    pub fn new(params: SignalParams) -> Result<Self, StrategyError> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &SignalParams {
        &self.params
    }

    /// Build the indicator frame this generator reads.
    pub fn prepare(&self, series: &PriceSeries) -> Result<IndicatorFrame, StrategyError> {
        let mut frame = IndicatorFrame::new(series.clone());
        frame.ensure_ema(self.params.ema_fast)?;
        frame.ensure_ema(self.params.ema_slow)?;
        frame.ensure_sma(self.params.sma_trend)?;
        frame.ensure_atr(self.params.atr_period)?;
        Ok(frame)
    }

    /// Compute indicators and generate signals, failing closed.
    ///
    /// Any indicator or column error is logged and yields an empty batch.
    pub fn generate(&self, series: &PriceSeries) -> SignalBatch {
        let result = self
            .prepare(series)
            .and_then(|frame| self.generate_from_frame(&frame));

        match result {
            Ok(batch) => batch,
            Err(e) => {
                warn!(symbol = %series.symbol, error = %e, "Signal generation failed, no signals");
                SignalBatch::default()
            }
        }
    }

    /// Generate signals from a prepared frame.
    ///
    /// The fast and slow EMA columns are required. Trend SMA and ATR columns
    /// are optional: without them the trend filter passes and TP/SL fall
    /// back to percentage mode.
    pub fn generate_from_frame(
        &self,
        frame: &IndicatorFrame,
    ) -> Result<SignalBatch, StrategyError> {
        let fast_col = ema_column(self.params.ema_fast);
        let slow_col = ema_column(self.params.ema_slow);
        frame.require(&[fast_col.as_str(), slow_col.as_str()])?;

        let sma_col = sma_column(self.params.sma_trend);
        let atr_col = atr_column(self.params.atr_period);
        let ticker = frame.series().symbol.clone();
        let bars = frame.bars();

        let mut batch = SignalBatch::default();
        let mut permissive_bars: Vec<usize> = Vec::new();
        let mut prev_pair: Option<(f64, f64)> = None;

        for (i, bar) in bars.iter().enumerate() {
            let pair = match (frame.value(&fast_col, i), frame.value(&slow_col, i)) {
                (Some(f), Some(s)) if f.is_finite() && s.is_finite() => Some((f, s)),
                _ => None,
            };
            let state = classify_bar(prev_pair, pair);
            prev_pair = pair;

            if state == BarState::NoSignal {
                continue;
            }
            if !bar.close.is_finite() {
                debug!(index = i, "Skipping bar with invalid close");
                continue;
            }

            batch.permissive_count += 1;
            permissive_bars.push(i);

            if state != BarState::StrictCross {
                continue;
            }
            batch.strict_cross_count += 1;

            let close = bar.close;
            if let Some(trend) = frame.value(&sma_col, i) {
                if close <= trend {
                    debug!(index = i, close, trend, "Strict cross rejected by trend filter");
                    continue;
                }
            }

            let atr = frame.value(&atr_col, i).filter(|a| a.is_finite() && *a > 0.0);
            if let Some(atr) = atr {
                let ratio = close / (atr + RATIO_EPSILON);
                if ratio < self.params.ratio_min_threshold {
                    debug!(index = i, ratio, "Strict cross rejected by volatility ratio");
                    continue;
                }
            }

            let version = self.params.strict_version();
            if let Some(signal) = self.build_signal(&ticker, frame, i, &version) {
                batch.signals.push(signal);
            }
        }

        if batch.signals.is_empty()
            && self.params.permissive_fallback
            && !permissive_bars.is_empty()
        {
            let version = self.params.fallback_version();
            let start = permissive_bars.len().saturating_sub(self.params.fallback_count);
            for &i in &permissive_bars[start..] {
                if let Some(signal) = self.build_signal(&ticker, frame, i, &version) {
                    batch.signals.push(signal);
                }
            }
            batch.fallback_used = !batch.signals.is_empty();
        }

        debug!(
            symbol = %ticker,
            permissive_count = batch.permissive_count,
            strict_cross_count = batch.strict_cross_count,
            signals_generated = batch.signals.len(),
            fallback = batch.fallback_used,
            "Signal generation pass complete"
        );

        Ok(batch)
    }

    fn build_signal(
        &self,
        ticker: &str,
        frame: &IndicatorFrame,
        i: usize,
        version: &str,
    ) -> Option<Signal> {
        let bar = frame.bars().get(i)?;
        let atr = frame
            .value(&atr_column(self.params.atr_period), i)
            .filter(|a| a.is_finite() && *a > 0.0);
        let risk = self.params.tp_sl_params(atr.is_some());

        let (tp, sl) = match compute_tp_sl(bar.close, atr, &risk) {
            Ok(levels) => levels,
            Err(e) => {
                warn!(symbol = %ticker, index = i, error = %e, "Skipping bar, cannot price TP/SL");
                return None;
            }
        };

        let id = format!("{}-{}-{}", ticker, bar.timestamp, version);
        Some(Signal::open(
            id,
            NewSignal {
                ticker: ticker.to_string(),
                timestamp: bar.datetime(),
                entry: bar.close,
                tp,
                sl,
                strategy_version: version.to_string(),
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigkit_core::types::Bar;

    const DAY: i64 = 86_400_000;

    fn series(closes: &[f64]) -> PriceSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(i as i64 * DAY, c, c + 1.0, c - 1.0, c, 1000.0))
            .collect();
        PriceSeries::new("TEST", bars).unwrap()
    }

    /// 30 bars down then 30 bars up.
    fn v_shape() -> Vec<f64> {
        let mut closes: Vec<f64> = (0..30).map(|i| 130.0 - i as f64).collect();
        closes.extend((0..30).map(|i| 101.0 + 2.0 * i as f64));
        closes
    }

    fn no_trend_params() -> SignalParams {
        SignalParams {
            sma_trend: 500,
            ..Default::default()
        }
    }

    #[test]
    fn test_classify_bar() {
        assert_eq!(classify_bar(None, Some((2.0, 1.0))), BarState::PermissiveCandidate);
        assert_eq!(classify_bar(Some((1.0, 1.0)), Some((2.0, 1.0))), BarState::StrictCross);
        assert_eq!(classify_bar(Some((2.0, 1.0)), Some((3.0, 1.0))), BarState::PermissiveCandidate);
        assert_eq!(classify_bar(Some((0.5, 1.0)), Some((1.0, 1.0))), BarState::NoSignal);
        assert_eq!(classify_bar(Some((0.5, 1.0)), None), BarState::NoSignal);
    }

    #[test]
    fn test_strict_cross_emits_one_signal() {
        let generator = SignalGenerator::new(no_trend_params()).unwrap();
        let batch = generator.generate(&series(&v_shape()));

        assert_eq!(batch.strict_cross_count, 1);
        assert_eq!(batch.len(), 1);
        assert!(!batch.fallback_used);

        let signal = &batch.signals[0];
        assert_eq!(signal.strategy_version, "v1-strict");
        assert!(signal.tp > signal.entry && signal.entry > signal.sl);
    }

    #[test]
    fn test_strict_cross_matches_ema_definition() {
        let generator = SignalGenerator::new(no_trend_params()).unwrap();
        let frame = generator.prepare(&series(&v_shape())).unwrap();
        let batch = generator.generate_from_frame(&frame).unwrap();

        let i = frame.series().position_of(batch.signals[0].entry_millis()).unwrap();
        let fast = frame.column("EMA_9").unwrap();
        let slow = frame.column("EMA_21").unwrap();
        assert!(fast[i].unwrap() > slow[i].unwrap());
        assert!(fast[i - 1].unwrap() <= slow[i - 1].unwrap());
    }

    #[test]
    fn test_trend_filter_skips_candidate() {
        // Flat at 200, slide to 100, then recover: the cross happens while
        // SMA_50 still carries the early highs.
        let mut closes = vec![200.0; 20];
        closes.extend((1..=30).map(|i| 200.0 - 100.0 * i as f64 / 30.0));
        closes.extend((1..=20).map(|i| 100.0 + 2.0 * i as f64));

        let params = SignalParams {
            permissive_fallback: false,
            ..Default::default()
        };
        let batch = SignalGenerator::new(params).unwrap().generate(&series(&closes));

        assert_eq!(batch.strict_cross_count, 1);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_ratio_filter_skips_candidate() {
        let params = SignalParams {
            ratio_min_threshold: 1_000.0,
            permissive_fallback: false,
            ..no_trend_params()
        };
        let batch = SignalGenerator::new(params).unwrap().generate(&series(&v_shape()));

        assert_eq!(batch.strict_cross_count, 1);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_fallback_takes_last_permissive_bars() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let params = SignalParams {
            fallback_count: 4,
            ..Default::default()
        };
        let batch = SignalGenerator::new(params).unwrap().generate(&series(&closes));

        assert_eq!(batch.strict_cross_count, 0);
        assert!(batch.permissive_count > 4);
        assert!(batch.fallback_used);
        assert_eq!(batch.len(), 4);
        assert!(batch
            .signals
            .iter()
            .all(|s| s.strategy_version == "v1-permissive-fallback"));
        assert_eq!(batch.signals[3].entry, 149.0);
    }

    #[test]
    fn test_fallback_disabled() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let params = SignalParams {
            permissive_fallback: false,
            ..Default::default()
        };
        let batch = SignalGenerator::new(params).unwrap().generate(&series(&closes));

        assert!(batch.is_empty());
        assert!(batch.permissive_count > 0);
    }

    #[test]
    fn test_missing_columns_is_typed_error() {
        let generator = SignalGenerator::new(SignalParams::default()).unwrap();
        let frame = IndicatorFrame::new(series(&[1.0, 2.0, 3.0]));

        let err = generator.generate_from_frame(&frame).unwrap_err();
        assert!(err.to_string().contains("EMA_9"));
    }

    #[test]
    fn test_percent_mode_without_atr_column() {
        let generator = SignalGenerator::new(no_trend_params()).unwrap();
        let mut frame = IndicatorFrame::new(series(&v_shape()));
        frame.ensure_ema(9).unwrap();
        frame.ensure_ema(21).unwrap();

        let batch = generator.generate_from_frame(&frame).unwrap();
        let signal = &batch.signals[0];
        assert!((signal.tp - signal.entry * 1.04).abs() < 1e-6);
        assert!((signal.sl - signal.entry * 0.98).abs() < 1e-6);
    }

    #[test]
    fn test_deterministic_ids() {
        let generator = SignalGenerator::new(no_trend_params()).unwrap();
        let a = generator.generate(&series(&v_shape()));
        let b = generator.generate(&series(&v_shape()));
        assert_eq!(a, b);
    }
}
