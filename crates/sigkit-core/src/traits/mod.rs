//! Core traits for the signal toolkit.

mod indicator;
mod notifier;
mod price_provider;
mod signal_store;

pub use indicator::{Indicator, OhlcIndicator};
pub use notifier::{Notifier, NotifyOutcome};
pub use price_provider::PriceProvider;
pub use signal_store::SignalStore;
