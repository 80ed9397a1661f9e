//! Notification trait.

use async_trait::async_trait;

use crate::error::NotifyError;
use crate::types::Signal;

/// Result of a delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// Message accepted by the transport
    Sent,
    /// Transport in test mode; message was only rendered and logged
    DryRun,
}

/// Outbound channel for new-signal alerts.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one signal.
    async fn notify(&self, signal: &Signal) -> Result<NotifyOutcome, NotifyError>;

    /// Get the notifier name.
    fn name(&self) -> &str;
}
