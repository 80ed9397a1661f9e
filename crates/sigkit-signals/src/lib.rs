//! Signal tracking.
//!
//! - [`CsvSignalStore`] / [`MemorySignalStore`]: [`SignalStore`] implementations
//! - [`Watcher`]: moves open signals to TP/SL from ticks, bars or backfills
//! - [`notify_once`]: delivers open, un-notified signals
//!
//! [`SignalStore`]: sigkit_core::traits::SignalStore

mod runner;
mod store;
mod watcher;

pub use runner::{notify_once, Delivery};
pub use store::{CsvSignalStore, MemorySignalStore};
pub use watcher::{StatusUpdate, Watcher};
