//! Moving average indicators.

use sigkit_core::traits::Indicator;

/// Simple Moving Average over a trailing window of exactly `period` points.
///
/// A window containing a missing value produces `None`.
pub fn sma(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; data.len()];
    if period == 0 || data.len() < period {
        return result;
    }

    let period_f64 = period as f64;
    let mut sum = 0.0;
    let mut invalid = 0usize;

    for i in 0..data.len() {
        if data[i].is_finite() {
            sum += data[i];
        } else {
            invalid += 1;
        }

        // Sliding window
        if i >= period {
            let out = data[i - period];
            if out.is_finite() {
                sum -= out;
            } else {
                invalid -= 1;
            }
        }

        if i + 1 >= period && invalid == 0 {
            result[i] = Some(sum / period_f64);
        }
    }

    result
}

/// Exponential Moving Average with `alpha = 2 / (period + 1)`.
pub fn ema(data: &[f64], period: usize) -> Vec<Option<f64>> {
    let values: Vec<Option<f64>> = data
        .iter()
        .map(|&v| if v.is_finite() { Some(v) } else { None })
        .collect();
    ema_of(&values, period)
}

/// EMA over a partially defined series (e.g. the MACD line).
///
/// Non-adjusted recurrence seeded at the first valid value:
/// `ema[i] = (1 - alpha) * ema[i-1] + alpha * x[i]`. Output stays `None`
/// until `period` consecutive valid points have been consumed. A gap
/// restarts the recurrence.
pub fn ema_of(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if period == 0 {
        return result;
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut state: Option<f64> = None;
    let mut run = 0usize;

    for (i, value) in values.iter().enumerate() {
        match value {
            Some(x) => {
                let next = match state {
                    Some(prev) => (1.0 - alpha) * prev + alpha * x,
                    None => *x,
                };
                state = Some(next);
                run += 1;
                if run >= period {
                    result[i] = Some(next);
                }
            }
            None => {
                state = None;
                run = 0;
            }
        }
    }

    result
}

/// Simple Moving Average (SMA).
///
/// Calculates the arithmetic mean of the last N values.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
}

impl Sma {
    /// Create a new SMA with the specified period.
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for Sma {
    fn calculate(&self, data: &[f64]) -> Vec<Option<f64>> {
        sma(data, self.period)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> String {
        format!("SMA_{}", self.period)
    }
}

/// Exponential Moving Average (EMA).
///
/// Gives more weight to recent prices using an exponential decay.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
}

impl Ema {
    /// Create a new EMA with the specified period.
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// Smoothing factor `2 / (period + 1)`.
    pub fn alpha(&self) -> f64 {
        2.0 / (self.period as f64 + 1.0)
    }
}

impl Indicator for Ema {
    fn calculate(&self, data: &[f64]) -> Vec<Option<f64>> {
        ema(data, self.period)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> String {
        format!("EMA_{}", self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma() {
        let result = Sma::new(3).calculate(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        assert_eq!(result.len(), 5);
        assert!(result[0].is_none() && result[1].is_none());
        assert!((result[2].unwrap() - 2.0).abs() < 1e-10); // (1+2+3)/3
        assert!((result[3].unwrap() - 3.0).abs() < 1e-10); // (2+3+4)/3
        assert!((result[4].unwrap() - 4.0).abs() < 1e-10); // (3+4+5)/3
    }

    #[test]
    fn test_sma_insufficient_data() {
        let result = sma(&[1.0, 2.0, 3.0], 5);
        assert_eq!(result, vec![None, None, None]);
    }

    #[test]
    fn test_sma_window_with_gap() {
        let result = sma(&[1.0, f64::NAN, 3.0, 4.0, 5.0], 2);
        assert_eq!(result[1], None);
        assert_eq!(result[2], None);
        assert_eq!(result[3], Some(3.5));
        assert_eq!(result[4], Some(4.5));
    }

    #[test]
    fn test_ema_seeded_at_first_value() {
        // alpha = 0.5
        let result = Ema::new(3).calculate(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        assert_eq!(result.len(), 5);
        assert!(result[0].is_none() && result[1].is_none());
        // 1 -> 1.5 -> 2.25
        assert!((result[2].unwrap() - 2.25).abs() < 1e-10);
        // 0.5 * 2.25 + 0.5 * 4
        assert!((result[3].unwrap() - 3.125).abs() < 1e-10);
    }

    #[test]
    fn test_ema_recurrence_holds() {
        let data: Vec<f64> = (0..40).map(|i| 50.0 + (i as f64 * 0.3).sin() * 4.0).collect();
        let ema = Ema::new(9);
        let alpha = ema.alpha();
        let result = ema.calculate(&data);

        for i in 9..data.len() {
            let expected = (1.0 - alpha) * result[i - 1].unwrap() + alpha * data[i];
            assert!((result[i].unwrap() - expected).abs() < 1e-10);
        }
    }

    #[test]
    fn test_ema_of_skips_leading_gaps() {
        let values = vec![None, None, Some(2.0), Some(4.0), Some(6.0)];
        let result = ema_of(&values, 2);

        assert_eq!(result[2], None);
        // alpha = 2/3: 2 -> 2/3*4 + 1/3*2
        assert!((result[3].unwrap() - 10.0 / 3.0).abs() < 1e-10);
        assert!(result[4].is_some());
    }
}
