//! Moves open signals to TP or SL as prices arrive.
//!
//! TP is checked before SL everywhere, matching the backtest simulator.

use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use sigkit_core::error::StorageError;
use sigkit_core::traits::{PriceProvider, SignalStore};
use sigkit_core::types::{Bar, Signal, SignalFilter, SignalStatus};

/// A terminal transition performed by the watcher.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusUpdate {
    pub id: String,
    pub ticker: String,
    pub status: SignalStatus,
    /// Price that triggered the transition: the tick price, or the
    /// TP/SL level when resolved from a bar.
    pub price: f64,
}

/// Signal watcher over a shared store.
#[derive(Clone)]
pub struct Watcher {
    store: Arc<dyn SignalStore>,
}

impl Watcher {
    pub fn new(store: Arc<dyn SignalStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn SignalStore> {
        &self.store
    }

    fn open_signals(&self, ticker: &str) -> Result<Vec<Signal>, StorageError> {
        self.store
            .list(&SignalFilter::status(SignalStatus::Open).with_ticker(ticker))
    }

    fn apply(
        &self,
        signal: &Signal,
        status: SignalStatus,
        price: f64,
        info: String,
    ) -> Result<Option<StatusUpdate>, StorageError> {
        if !self.store.update_status(&signal.ticker, &signal.id, status, Some(info))? {
            // Another writer closed it first.
            debug!(id = %signal.id, "Signal already closed");
            return Ok(None);
        }
        info!(id = %signal.id, ticker = %signal.ticker, %status, price, "Signal closed");
        Ok(Some(StatusUpdate {
            id: signal.id.clone(),
            ticker: signal.ticker.clone(),
            status,
            price,
        }))
    }

    /// Check every open signal of `ticker` against a last-traded price.
    pub fn process_price_tick(
        &self,
        ticker: &str,
        price: f64,
    ) -> Result<Vec<StatusUpdate>, StorageError> {
        let mut updates = Vec::new();
        for signal in self.open_signals(ticker)? {
            let hit = if price >= signal.tp {
                Some((SignalStatus::Tp, format!("hit_tp_at_price={}", price)))
            } else if price <= signal.sl {
                Some((SignalStatus::Sl, format!("hit_sl_at_price={}", price)))
            } else {
                None
            };

            if let Some((status, info)) = hit {
                updates.extend(self.apply(&signal, status, price, info)?);
            }
        }
        Ok(updates)
    }

    /// Check open signals entered at or before this bar against its range.
    pub fn process_bar(&self, ticker: &str, bar: &Bar) -> Result<Vec<StatusUpdate>, StorageError> {
        let mut updates = Vec::new();
        for signal in self.open_signals(ticker)? {
            if signal.entry_millis() > bar.timestamp {
                continue;
            }
            if let Some((status, price, info)) = resolve_bar(&signal, bar) {
                updates.extend(self.apply(&signal, status, price, info)?);
            }
        }
        Ok(updates)
    }

    /// Replay historical bars over every open signal of `ticker`.
    ///
    /// Each signal scans bars at or after its entry time and stops at the
    /// first TP/SL hit. Signals that never hit stay open.
    pub fn simulate_backfill(
        &self,
        ticker: &str,
        bars: &[Bar],
    ) -> Result<Vec<StatusUpdate>, StorageError> {
        let mut updates = Vec::new();
        for signal in self.open_signals(ticker)? {
            let entry = signal.entry_millis();
            let hit = bars
                .iter()
                .filter(|b| b.timestamp >= entry)
                .find_map(|b| resolve_bar(&signal, b));

            if let Some((status, price, info)) = hit {
                updates.extend(self.apply(&signal, status, price, info)?);
            }
        }
        info!(ticker, bars = bars.len(), updates = updates.len(), "Backfill complete");
        Ok(updates)
    }

    /// One polling pass: fetch the last price of each ticker and process it.
    ///
    /// With no explicit tickers, every ticker that has open signals is
    /// checked. Provider failures are logged and the ticker is skipped.
    pub async fn watch_once(
        &self,
        provider: &dyn PriceProvider,
        tickers: Option<&[String]>,
    ) -> Result<Vec<StatusUpdate>, StorageError> {
        let tickers: Vec<String> = match tickers {
            Some(t) => t.to_vec(),
            None => self
                .store
                .list(&SignalFilter::status(SignalStatus::Open))?
                .into_iter()
                .map(|s| s.ticker)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        };

        let mut updates = Vec::new();
        for ticker in &tickers {
            match provider.get_last_price(ticker).await {
                Ok(Some(price)) => updates.extend(self.process_price_tick(ticker, price)?),
                Ok(None) => warn!(
                    ticker = %ticker,
                    provider = provider.name(),
                    "No price available"
                ),
                Err(e) => warn!(
                    ticker = %ticker,
                    provider = provider.name(),
                    error = %e,
                    "Price fetch failed"
                ),
            }
        }
        Ok(updates)
    }
}

fn resolve_bar(signal: &Signal, bar: &Bar) -> Option<(SignalStatus, f64, String)> {
    if bar.high >= signal.tp {
        Some((SignalStatus::Tp, signal.tp, format!("hit_tp_at_high={}", bar.high)))
    } else if bar.low <= signal.sl {
        Some((SignalStatus::Sl, signal.sl, format!("hit_sl_at_low={}", bar.low)))
    } else {
        None
    }
}
