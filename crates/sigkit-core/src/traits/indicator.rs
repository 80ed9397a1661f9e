//! Indicator trait definitions.

use crate::error::IndicatorError;

/// Trait for single-input technical indicators.
///
/// Output is aligned with the input: one entry per input point, `None`
/// while the indicator is still warming up.
pub trait Indicator: Send + Sync {
    /// Calculate indicator values for the given data.
    fn calculate(&self, data: &[f64]) -> Vec<Option<f64>>;

    /// Get the smoothing / lookback period.
    fn period(&self) -> usize;

    /// Get the name of the indicator, used as the frame column name.
    fn name(&self) -> String;

    /// Validate the configured period.
    fn validate_period(&self) -> Result<(), IndicatorError> {
        if self.period() == 0 {
            return Err(IndicatorError::InvalidParameter(format!(
                "{}: period must be > 0",
                self.name()
            )));
        }
        Ok(())
    }
}

/// Indicator that uses high/low/close rather than a single series.
pub trait OhlcIndicator: Send + Sync {
    /// Calculate aligned indicator values from bar data.
    fn calculate(&self, high: &[f64], low: &[f64], close: &[f64]) -> Vec<Option<f64>>;

    /// Get the smoothing / lookback period.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RollingSum {
        period: usize,
    }

    impl Indicator for RollingSum {
        fn calculate(&self, data: &[f64]) -> Vec<Option<f64>> {
            (0..data.len())
                .map(|i| {
                    if i + 1 < self.period {
                        None
                    } else {
                        Some(data[i + 1 - self.period..=i].iter().sum())
                    }
                })
                .collect()
        }

        fn period(&self) -> usize {
            self.period
        }

        fn name(&self) -> String {
            format!("SUM_{}", self.period)
        }
    }

    #[test]
    fn test_period_validation() {
        assert!(RollingSum { period: 0 }.validate_period().is_err());
        assert!(RollingSum { period: 3 }.validate_period().is_ok());
    }

    #[test]
    fn test_output_is_aligned() {
        let result = RollingSum { period: 3 }.calculate(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        assert_eq!(result.len(), 5);
        assert_eq!(result[..2], [None, None]);
        assert_eq!(result[2], Some(6.0)); // 1+2+3
        assert_eq!(result[4], Some(12.0)); // 3+4+5
    }
}
