//! Notification transports for new signals.

mod telegram;

pub use telegram::{build_message, TelegramConfig, TelegramNotifier, TelegramPayload};
