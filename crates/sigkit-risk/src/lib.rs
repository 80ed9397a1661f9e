//! Risk engine.
//!
//! Maps an entry price plus volatility or percentage parameters to
//! take-profit / stop-loss levels, and sizes positions by risk per trade.

mod position_sizer;
mod tp_sl;

pub use position_sizer::{compute_position_size, PositionSizer};
pub use tp_sl::{compute_tp_sl, RiskMode, TpSlParams};
