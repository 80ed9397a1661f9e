//! Momentum indicators.

use serde::{Deserialize, Serialize};
use sigkit_core::traits::Indicator;

use crate::moving_average::{ema, ema_of};
use crate::volatility::wilder;

/// Relative Strength Index (RSI) with Wilder smoothing.
///
/// Gains and losses start at index 1 (first price change), so the first
/// value sits at index `period`. A zero average loss yields 100.
pub fn rsi(data: &[f64], period: usize) -> Vec<Option<f64>> {
    if data.is_empty() {
        return Vec::new();
    }

    // Index 0 has no change; it is excluded from the seed window.
    let mut gains = vec![0.0; data.len()];
    let mut losses = vec![0.0; data.len()];
    for i in 1..data.len() {
        let change = data[i] - data[i - 1];
        if change > 0.0 {
            gains[i] = change;
        } else {
            losses[i] = -change;
        }
    }

    let avg_gains = wilder(&gains, period, 1);
    let avg_losses = wilder(&losses, period, 1);

    avg_gains
        .iter()
        .zip(avg_losses.iter())
        .map(|(gain, loss)| match (gain, loss) {
            (Some(_), Some(loss)) if *loss == 0.0 => Some(100.0),
            (Some(gain), Some(loss)) => Some(100.0 - (100.0 / (1.0 + gain / loss))),
            _ => None,
        })
        .collect()
}

/// Relative Strength Index (RSI).
///
/// Measures the speed and magnitude of recent price changes
/// to evaluate overbought or oversold conditions.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    /// Create a new RSI indicator.
    ///
    /// Common periods are 14 (default) or 9.
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for Rsi {
    fn calculate(&self, data: &[f64]) -> Vec<Option<f64>> {
        rsi(data, self.period)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> String {
        format!("RSI_{}", self.period)
    }
}

/// MACD line, signal line and histogram, aligned with the input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacdOutput {
    /// MACD line (fast EMA - slow EMA)
    pub macd: Vec<Option<f64>>,
    /// Signal line (EMA of MACD)
    pub signal: Vec<Option<f64>>,
    /// Histogram (MACD - Signal)
    pub histogram: Vec<Option<f64>>,
}

/// Compute MACD. The signal EMA starts at the first defined MACD value.
pub fn macd(data: &[f64], fast: usize, slow: usize, signal: usize) -> MacdOutput {
    let fast_ema = ema(data, fast);
    let slow_ema = ema(data, slow);

    let macd_line: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    let signal_line = ema_of(&macd_line, signal);

    let histogram = macd_line
        .iter()
        .zip(signal_line.iter())
        .map(|(m, s)| Some((*m)? - (*s)?))
        .collect();

    MacdOutput {
        macd: macd_line,
        signal: signal_line,
        histogram,
    }
}

/// MACD indicator.
///
/// Uses two EMAs to identify trend direction and momentum.
#[derive(Debug, Clone)]
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Macd {
    /// Create a new MACD with default parameters (12, 26, 9).
    pub fn new() -> Self {
        Self::with_periods(12, 26, 9)
    }

    /// Create a MACD with custom periods.
    pub fn with_periods(fast: usize, slow: usize, signal: usize) -> Self {
        Self {
            fast_period: fast,
            slow_period: slow,
            signal_period: signal,
        }
    }

    pub fn calculate(&self, data: &[f64]) -> MacdOutput {
        macd(data, self.fast_period, self.slow_period, self.signal_period)
    }

    /// Index of the first defined signal value.
    pub fn warmup(&self) -> usize {
        self.fast_period.max(self.slow_period) + self.signal_period - 2
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_bounds() {
        let data: Vec<f64> = (0..30)
            .map(|i| 100.0 + (i as f64 * 0.5).sin() * 5.0)
            .collect();
        let result = Rsi::new(14).calculate(&data);

        assert_eq!(result.len(), 30);
        assert!(result[..14].iter().all(Option::is_none));
        for value in result[14..].iter().flatten() {
            assert!(*value >= 0.0 && *value <= 100.0);
        }
    }

    #[test]
    fn test_rsi_all_gains_clamps_to_100() {
        let result = rsi(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0], 5);

        assert_eq!(result[5], Some(100.0));
        assert_eq!(result[6], Some(100.0));
    }

    #[test]
    fn test_rsi_all_losses() {
        let result = rsi(&[7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0], 5);
        assert!(result[5].unwrap().abs() < 1e-10);
    }

    #[test]
    fn test_rsi_wilder_seed() {
        let data = [10.0, 11.0, 10.5, 11.5, 11.0, 12.0];
        let result = rsi(&data, 3);

        // Changes 1..=3: +1, -0.5, +1
        let avg_gain = 2.0 / 3.0;
        let avg_loss = 0.5 / 3.0;
        let expected = 100.0 - 100.0 / (1.0 + avg_gain / avg_loss);
        assert!((result[3].unwrap() - expected).abs() < 1e-10);

        // Change 4: -0.5
        let g = avg_gain * 2.0 / 3.0;
        let l = (avg_loss * 2.0 + 0.5) / 3.0;
        let expected = 100.0 - 100.0 / (1.0 + g / l);
        assert!((result[4].unwrap() - expected).abs() < 1e-10);
    }

    #[test]
    fn test_macd_uptrend() {
        let data: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let result = Macd::new().calculate(&data);

        assert_eq!(result.macd.len(), 50);
        assert!(result.macd[24].is_none());
        assert!(result.macd[25].is_some());
        assert!(result.signal[32].is_none());
        assert!(result.signal[33].is_some());
        // In an uptrend, MACD should be positive
        assert!(result.macd[49].unwrap() > 0.0);
    }

    #[test]
    fn test_macd_histogram() {
        let data: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64).sqrt()).collect();
        let macd = Macd::with_periods(5, 10, 3);
        let result = macd.calculate(&data);

        let i = macd.warmup();
        assert!(result.signal[i].is_some());
        assert!(result.signal[i - 1].is_none());
        let hist = result.macd[i].unwrap() - result.signal[i].unwrap();
        assert!((result.histogram[i].unwrap() - hist).abs() < 1e-12);
    }
}
