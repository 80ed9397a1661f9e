//! Signal generation.
//!
//! A single oldest-to-newest pass over an indicator frame that detects
//! fast/slow EMA crossovers, filters them by trend and volatility, and
//! prices TP/SL through the risk engine. When no strict cross survives,
//! the most recent permissive bars can be emitted instead.

mod params;
mod signal_generator;

pub use params::SignalParams;
pub use signal_generator::{classify_bar, BarState, SignalBatch, SignalGenerator};
