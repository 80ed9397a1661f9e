//! Technical indicators for signal generation.
//!
//! This crate provides the indicator engine used by the signal generator:
//! - Moving averages (SMA, EMA)
//! - Momentum indicators (RSI, MACD)
//! - Volatility indicators (True Range, ATR)
//!
//! All functions return output aligned with the input, with `None` during
//! warm-up. [`IndicatorFrame`] bundles a price series with named columns.

pub mod frame;
pub mod momentum;
pub mod moving_average;
pub mod volatility;

pub use frame::{compute_indicators, IndicatorConfig, IndicatorFrame};
pub use momentum::{macd, rsi, Macd, MacdOutput, Rsi};
pub use moving_average::{ema, ema_of, sma, Ema, Sma};
pub use volatility::{atr, atr_bars, true_range, Atr};
