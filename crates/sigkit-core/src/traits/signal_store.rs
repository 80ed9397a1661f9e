//! Signal persistence trait.

use crate::error::StorageError;
use crate::types::{NewSignal, Signal, SignalFilter, SignalStatus};

/// Durable store of signal records.
///
/// Implementations must make `update_status` a compare-and-set: only an
/// `Open` signal may move to a terminal status, and a second transition
/// is rejected.
pub trait SignalStore: Send + Sync {
    /// Persist a new open signal and return it with its assigned id.
    fn create(&self, signal: NewSignal) -> Result<Signal, StorageError>;

    /// List signals matching the filter, oldest first within a ticker.
    fn list(&self, filter: &SignalFilter) -> Result<Vec<Signal>, StorageError>;

    /// Move an open signal to a terminal status.
    ///
    /// Returns `Ok(false)` when the signal is unknown or already terminal.
    fn update_status(
        &self,
        ticker: &str,
        id: &str,
        status: SignalStatus,
        info: Option<String>,
    ) -> Result<bool, StorageError>;

    /// Record that the signal has been delivered.
    ///
    /// Returns `Ok(false)` when the signal is unknown.
    fn mark_notified(&self, ticker: &str, id: &str) -> Result<bool, StorageError>;

    /// Look up one signal by ticker and id.
    fn get(&self, ticker: &str, id: &str) -> Result<Option<Signal>, StorageError> {
        Ok(self
            .list(&SignalFilter::ticker(ticker))?
            .into_iter()
            .find(|s| s.id == id))
    }
}
