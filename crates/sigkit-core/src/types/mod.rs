//! Core data types for the signal toolkit.

mod ohlcv;
mod signal;
mod timeframe;
mod trade;

pub use ohlcv::{Bar, PriceSeries};
pub use signal::{NewSignal, Side, Signal, SignalFilter, SignalStatus};
pub use timeframe::Timeframe;
pub use trade::TradeResult;
