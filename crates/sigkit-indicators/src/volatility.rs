//! Volatility indicators.

use sigkit_core::traits::OhlcIndicator;
use sigkit_core::Bar;

/// True Range per bar.
///
/// `max(high - low, |high - prev_close|, |low - prev_close|)`; the first bar
/// has no previous close and uses `high - low`.
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let len = high.len().min(low.len()).min(close.len());
    let mut tr = Vec::with_capacity(len);

    for i in 0..len {
        let high_low = high[i] - low[i];
        if i == 0 {
            tr.push(high_low);
            continue;
        }
        let high_close = (high[i] - close[i - 1]).abs();
        let low_close = (low[i] - close[i - 1]).abs();
        tr.push(high_low.max(high_close).max(low_close));
    }

    tr
}

/// Average True Range with Wilder smoothing.
///
/// The first value sits at index `period - 1` and is the simple mean of the
/// first `period` true ranges. After that
/// `atr[i] = (atr[i-1] * (period - 1) + tr[i]) / period`.
pub fn atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<Option<f64>> {
    wilder(&true_range(high, low, close), period, 0)
}

/// ATR computed directly from bars.
pub fn atr_bars(bars: &[Bar], period: usize) -> Vec<Option<f64>> {
    let tr: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| bar.true_range(i.checked_sub(1).map(|p| bars[p].close)))
        .collect();
    wilder(&tr, period, 0)
}

/// Wilder smoothing of `values[start..]`, aligned to `values`.
///
/// Seed is the simple mean of `values[start..start + period]`, placed at
/// `start + period - 1`.
pub(crate) fn wilder(values: &[f64], period: usize, start: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if period == 0 || values.len() < start + period {
        return result;
    }

    let period_f64 = period as f64;
    let seed_end = start + period;

    let mut avg: f64 = values[start..seed_end].iter().sum::<f64>() / period_f64;
    result[seed_end - 1] = Some(avg);

    for i in seed_end..values.len() {
        avg = (avg * (period_f64 - 1.0) + values[i]) / period_f64;
        result[i] = Some(avg);
    }

    result
}

/// Average True Range (ATR).
///
/// Measures market volatility by decomposing the entire range
/// of an asset price for that period.
#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
}

impl Atr {
    /// Create a new ATR indicator.
    ///
    /// Common period is 14.
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl OhlcIndicator for Atr {
    fn calculate(&self, high: &[f64], low: &[f64], close: &[f64]) -> Vec<Option<f64>> {
        atr(high, low, close, self.period)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> String {
        format!("ATR_{}", self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_true_range_first_bar() {
        let tr = true_range(&[110.0, 112.0], &[95.0, 108.0], &[105.0, 100.0]);

        assert!((tr[0] - 15.0).abs() < 1e-10);
        // |112 - 105| beats 112 - 108
        assert!((tr[1] - 7.0).abs() < 1e-10);
    }

    #[test]
    fn test_atr_seed_and_recurrence() {
        let high = vec![11.0, 12.0, 14.0, 13.0, 15.0, 16.0];
        let low = vec![9.0, 10.0, 11.0, 11.0, 12.0, 14.0];
        let close = vec![10.0, 11.0, 13.0, 12.0, 14.0, 15.0];
        let tr = true_range(&high, &low, &close);
        let result = Atr::new(3).calculate(&high, &low, &close);

        assert_eq!(result.len(), 6);
        assert!(result[0].is_none() && result[1].is_none());

        let seed = (tr[0] + tr[1] + tr[2]) / 3.0;
        assert!((result[2].unwrap() - seed).abs() < 1e-10);

        for i in 3..6 {
            let expected = (result[i - 1].unwrap() * 2.0 + tr[i]) / 3.0;
            assert!((result[i].unwrap() - expected).abs() < 1e-10);
        }
    }

    #[test]
    fn test_atr_is_not_ema() {
        let high: Vec<f64> = (0..20).map(|i| 101.0 + (i % 3) as f64).collect();
        let low: Vec<f64> = (0..20).map(|i| 99.0 - (i % 2) as f64).collect();
        let close = vec![100.0; 20];
        let wilder_atr = atr(&high, &low, &close, 5);
        let ema_tr = crate::moving_average::ema(&true_range(&high, &low, &close), 5);

        assert!((wilder_atr[19].unwrap() - ema_tr[19].unwrap()).abs() > 1e-6);
    }

    #[test]
    fn test_atr_bars_matches_columns() {
        let bars: Vec<Bar> = (0..10)
            .map(|i| {
                let c = 100.0 + i as f64;
                Bar::new(i, c, c + 2.0, c - 1.0, c, 0.0)
            })
            .collect();
        let high: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let low: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let close: Vec<f64> = bars.iter().map(|b| b.close).collect();

        assert_eq!(atr_bars(&bars, 4), atr(&high, &low, &close, 4));
    }

    #[test]
    fn test_atr_insufficient_data() {
        let result = atr(&[1.0, 2.0], &[0.5, 1.5], &[1.0, 2.0], 3);
        assert_eq!(result, vec![None, None]);
    }
}
