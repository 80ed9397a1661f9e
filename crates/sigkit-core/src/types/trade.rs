//! Trade outcomes produced by replaying a signal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SignalStatus;

/// Terminal outcome of one signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeResult {
    pub ticker: String,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub entry: f64,
    pub exit: f64,
    /// exit - entry
    pub pnl: f64,
    pub status: SignalStatus,
    pub tp: f64,
    pub sl: f64,
}

impl TradeResult {
    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.pnl < 0.0
    }
}
