//! Take-profit / stop-loss computation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use sigkit_core::error::RiskError;

/// How TP/SL distances are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskMode {
    /// Multiples of ATR
    Atr,
    /// Fractions of the entry price
    Percent,
}

impl fmt::Display for RiskMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskMode::Atr => write!(f, "atr"),
            RiskMode::Percent => write!(f, "percent"),
        }
    }
}

impl FromStr for RiskMode {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "atr" => Ok(RiskMode::Atr),
            "percent" | "pct" => Ok(RiskMode::Percent),
            _ => Err(RiskError::UnknownMode(s.to_string())),
        }
    }
}

/// Parameters for [`compute_tp_sl`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TpSlParams {
    /// Explicit mode; `None` picks ATR when an ATR value is supplied.
    pub mode: Option<RiskMode>,
    pub tp_atr_mul: f64,
    pub sl_atr_mul: f64,
    pub tp_pct: f64,
    pub sl_pct: f64,
}

impl Default for TpSlParams {
    fn default() -> Self {
        Self {
            mode: None,
            tp_atr_mul: 2.0,
            sl_atr_mul: 1.5,
            tp_pct: 0.04,
            sl_pct: 0.02,
        }
    }
}

impl TpSlParams {
    pub fn atr(tp_atr_mul: f64, sl_atr_mul: f64) -> Self {
        Self {
            mode: Some(RiskMode::Atr),
            tp_atr_mul,
            sl_atr_mul,
            ..Default::default()
        }
    }

    pub fn percent(tp_pct: f64, sl_pct: f64) -> Self {
        Self {
            mode: Some(RiskMode::Percent),
            tp_pct,
            sl_pct,
            ..Default::default()
        }
    }
}

/// Compute `(tp, sl)` for a long entry.
///
/// ATR mode: `tp = entry + tp_mul * atr`, `sl = entry - sl_mul * atr`.
/// Percent mode: `tp = entry * (1 + tp_pct)`, `sl = entry * (1 - sl_pct)`.
/// The stop is floored at zero and both levels are rounded to 8 decimals.
pub fn compute_tp_sl(
    entry: f64,
    atr: Option<f64>,
    params: &TpSlParams,
) -> Result<(f64, f64), RiskError> {
    if !entry.is_finite() || entry <= 0.0 {
        return Err(RiskError::InvalidEntry(entry));
    }

    let mode = params.mode.unwrap_or(if atr.is_some() {
        RiskMode::Atr
    } else {
        RiskMode::Percent
    });

    let (tp, sl) = match mode {
        RiskMode::Atr => {
            let atr = match atr {
                Some(a) if a.is_finite() && a > 0.0 => a,
                _ => return Err(RiskError::MissingAtr),
            };
            (entry + params.tp_atr_mul * atr, entry - params.sl_atr_mul * atr)
        }
        RiskMode::Percent => (entry * (1.0 + params.tp_pct), entry * (1.0 - params.sl_pct)),
    };

    Ok((round8(tp), round8(sl.max(0.0))))
}

fn round8(x: f64) -> f64 {
    (x * 1e8).round() / 1e8
}
