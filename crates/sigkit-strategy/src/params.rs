//! Signal generator parameters.

use serde::{Deserialize, Serialize};

use sigkit_core::error::StrategyError;
use sigkit_risk::TpSlParams;

/// Configuration for the crossover signal generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalParams {
    /// Fast EMA period
    pub ema_fast: usize,
    /// Slow EMA period
    pub ema_slow: usize,
    /// Trend filter SMA period
    pub sma_trend: usize,
    /// ATR period
    pub atr_period: usize,
    /// Price TP/SL from ATR when it is available
    pub use_atr_sl: bool,
    /// TP distance in ATRs
    pub tp_atr: f64,
    /// SL distance in ATRs
    pub sl_atr: f64,
    /// TP distance as a fraction of entry when ATR is not used
    pub tp_pct: f64,
    /// SL distance as a fraction of entry when ATR is not used
    pub sl_pct: f64,
    /// Minimum close / ATR ratio for a strict cross to pass
    pub ratio_min_threshold: f64,
    /// Emit recent permissive bars when no strict cross passes
    pub permissive_fallback: bool,
    /// How many trailing permissive bars the fallback emits
    pub fallback_count: usize,
    /// Base tag for `strategy_version`
    pub version: String,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            ema_fast: 9,
            ema_slow: 21,
            sma_trend: 50,
            atr_period: 14,
            use_atr_sl: true,
            tp_atr: 2.0,
            sl_atr: 1.5,
            tp_pct: 0.04,
            sl_pct: 0.02,
            ratio_min_threshold: 0.5,
            permissive_fallback: true,
            fallback_count: 10,
            version: "v1".to_string(),
        }
    }
}

impl SignalParams {
    pub fn validate(&self) -> Result<(), StrategyError> {
        for (name, period) in [
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
            ("sma_trend", self.sma_trend),
            ("atr_period", self.atr_period),
        ] {
            if period == 0 {
                return Err(StrategyError::InvalidConfig(format!(
                    "{} must be greater than 0",
                    name
                )));
            }
        }

        for (name, value) in [
            ("tp_atr", self.tp_atr),
            ("sl_atr", self.sl_atr),
            ("tp_pct", self.tp_pct),
            ("sl_pct", self.sl_pct),
            ("ratio_min_threshold", self.ratio_min_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(StrategyError::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if self.version.trim().is_empty() {
            return Err(StrategyError::InvalidConfig("version must not be empty".into()));
        }

        Ok(())
    }

    /// Version tag for signals from a strict cross.
    pub fn strict_version(&self) -> String {
        format!("{}-strict", self.version)
    }

    /// Version tag for signals from the permissive fallback.
    pub fn fallback_version(&self) -> String {
        format!("{}-permissive-fallback", self.version)
    }

    /// Risk parameters for a bar, given whether a usable ATR exists.
    pub fn tp_sl_params(&self, has_atr: bool) -> TpSlParams {
        if self.use_atr_sl && has_atr {
            TpSlParams::atr(self.tp_atr, self.sl_atr)
        } else {
            TpSlParams::percent(self.tp_pct, self.sl_pct)
        }
    }
}
