//! Notification pass over stored signals.

use serde::Serialize;
use tracing::{info, warn};

use sigkit_core::error::StorageError;
use sigkit_core::traits::{Notifier, SignalStore};
use sigkit_core::types::SignalFilter;

/// Result of delivering one signal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Delivery {
    pub id: String,
    pub ticker: String,
    pub ok: bool,
    pub error: Option<String>,
}

/// Send every open, un-notified signal once.
///
/// A signal is marked notified only when delivery succeeds; failed
/// deliveries stay pending for the next pass.
pub async fn notify_once(
    store: &dyn SignalStore,
    notifier: &dyn Notifier,
) -> Result<Vec<Delivery>, StorageError> {
    let pending = store.list(&SignalFilter::pending_notification())?;
    let mut deliveries = Vec::with_capacity(pending.len());

    for signal in pending {
        let delivery = match notifier.notify(&signal).await {
            Ok(outcome) => {
                store.mark_notified(&signal.ticker, &signal.id)?;
                info!(
                    id = %signal.id,
                    ticker = %signal.ticker,
                    ?outcome,
                    notifier = notifier.name(),
                    "Signal delivered"
                );
                Delivery {
                    id: signal.id,
                    ticker: signal.ticker,
                    ok: true,
                    error: None,
                }
            }
            Err(e) => {
                warn!(
                    id = %signal.id,
                    ticker = %signal.ticker,
                    error = %e,
                    "Delivery failed, will retry"
                );
                Delivery {
                    id: signal.id,
                    ticker: signal.ticker,
                    ok: false,
                    error: Some(e.to_string()),
                }
            }
        };
        deliveries.push(delivery);
    }

    Ok(deliveries)
}
