//! Position sizing by fixed fractional risk.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use sigkit_core::error::RiskError;

/// Number of units such that `(entry - sl) * qty <= balance * risk_per_trade`,
/// rounded down to a multiple of `lot_size`.
///
/// Returns 0 when the stop is at or above the entry (no risk per unit).
pub fn compute_position_size(
    balance: Decimal,
    entry: Decimal,
    sl: Decimal,
    risk_per_trade: Decimal,
    lot_size: u64,
) -> Result<u64, RiskError> {
    if balance <= Decimal::ZERO {
        return Err(RiskError::InvalidParameter(format!("balance must be > 0, got {}", balance)));
    }
    if entry <= Decimal::ZERO {
        return Err(RiskError::InvalidParameter(format!("entry must be > 0, got {}", entry)));
    }
    if sl < Decimal::ZERO {
        return Err(RiskError::InvalidParameter(format!("sl must be >= 0, got {}", sl)));
    }
    if risk_per_trade <= Decimal::ZERO || risk_per_trade > dec!(1) {
        return Err(RiskError::InvalidParameter(format!(
            "risk_per_trade must be in (0, 1], got {}",
            risk_per_trade
        )));
    }

    let risk_per_unit = entry - sl;
    if risk_per_unit <= Decimal::ZERO {
        return Ok(0);
    }

    let max_risk = balance * risk_per_trade;
    let raw_qty = (max_risk / risk_per_unit).floor().to_u64().unwrap_or(0);

    let qty = if lot_size <= 1 {
        raw_qty
    } else {
        (raw_qty / lot_size) * lot_size
    };

    debug!(%balance, %entry, %sl, %risk_per_trade, lot_size, qty, "Position size");
    Ok(qty)
}

/// Position sizer carrying the account risk settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSizer {
    /// Fraction of balance at risk per trade, in (0, 1]
    pub risk_per_trade: Decimal,
    /// Units per lot; values <= 1 disable lot rounding
    pub lot_size: u64,
}

impl Default for PositionSizer {
    fn default() -> Self {
        Self {
            risk_per_trade: dec!(0.01),
            lot_size: 1,
        }
    }
}

impl PositionSizer {
    /// Create a new position sizer.
    pub fn new(risk_per_trade: Decimal, lot_size: u64) -> Self {
        Self {
            risk_per_trade,
            lot_size,
        }
    }

    /// Size a position from decimal prices.
    pub fn size(&self, balance: Decimal, entry: Decimal, sl: Decimal) -> Result<u64, RiskError> {
        compute_position_size(balance, entry, sl, self.risk_per_trade, self.lot_size)
    }

    /// Size a position from float prices as produced by the signal generator.
    pub fn size_f64(&self, balance: Decimal, entry: f64, sl: f64) -> Result<u64, RiskError> {
        self.size(balance, to_decimal(entry)?, to_decimal(sl)?)
    }
}

fn to_decimal(value: f64) -> Result<Decimal, RiskError> {
    Decimal::from_f64(value)
        .ok_or_else(|| RiskError::InvalidParameter(format!("not a finite number: {}", value)))
}
