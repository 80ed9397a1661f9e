//! Telegram bot API notifier.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

use sigkit_core::error::NotifyError;
use sigkit_core::traits::{Notifier, NotifyOutcome};
use sigkit_core::types::Signal;

/// Telegram bot configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub api_base: String,
    pub timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_base: "https://api.telegram.org".to_string(),
            timeout_secs: 15,
        }
    }
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            bot_token: Some(bot_token.into()),
            chat_id: Some(chat_id.into()),
            ..Default::default()
        }
    }

    fn send_url(&self, token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.api_base.trim_end_matches('/'), token)
    }
}

/// Body of a `sendMessage` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelegramPayload {
    pub chat_id: String,
    pub text: String,
    pub parse_mode: &'static str,
}

/// Render the Markdown alert for a signal.
pub fn build_message(signal: &Signal) -> String {
    [
        format!("📣 *SIGNAL — {} {}*", signal.side, signal.ticker),
        format!("• entry: {}", signal.entry),
        format!("• tp: {}", signal.tp),
        format!("• sl: {}", signal.sl),
        format!("• time: {}", signal.timestamp.format("%Y-%m-%d %H:%M:%S")),
        format!("• id: {}", signal.id),
    ]
    .join("\n")
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends signals to a Telegram chat.
///
/// In test mode the payload is rendered and logged but nothing is sent,
/// and missing credentials are not an error.
pub struct TelegramNotifier {
    config: TelegramConfig,
    client: Client,
    test_mode: bool,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig, test_mode: bool) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        Ok(Self {
            config,
            client,
            test_mode,
        })
    }

    pub fn is_test_mode(&self) -> bool {
        self.test_mode
    }

    /// Payload that `notify` would post for this signal.
    pub fn payload(&self, signal: &Signal) -> TelegramPayload {
        TelegramPayload {
            chat_id: self.config.chat_id.clone().unwrap_or_default(),
            text: build_message(signal),
            parse_mode: "Markdown",
        }
    }

    fn credentials(&self) -> Result<(&str, &str), NotifyError> {
        match (self.config.bot_token.as_deref(), self.config.chat_id.as_deref()) {
            (Some(token), Some(chat)) if !token.is_empty() && !chat.is_empty() => Ok((token, chat)),
            _ => Err(NotifyError::MissingCredentials(
                "telegram bot_token and chat_id must be set".into(),
            )),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, signal: &Signal) -> Result<NotifyOutcome, NotifyError> {
        let payload = self.payload(signal);

        if self.test_mode {
            info!(
                id = %signal.id,
                ticker = %signal.ticker,
                text = %payload.text,
                "Dry-run notification"
            );
            return Ok(NotifyOutcome::DryRun);
        }

        let (token, _) = self.credentials()?;
        let resp = self
            .client
            .post(self.config.send_url(token))
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            error!(id = %signal.id, status = status.as_u16(), "Telegram rejected message");
            return Err(NotifyError::Http {
                status: status.as_u16(),
                body,
            });
        }

        match serde_json::from_str::<TelegramResponse>(&body) {
            Ok(parsed) if !parsed.ok => Err(NotifyError::Http {
                status: status.as_u16(),
                body: parsed.description.unwrap_or(body),
            }),
            _ => {
                debug!(id = %signal.id, ticker = %signal.ticker, "Telegram message sent");
                Ok(NotifyOutcome::Sent)
            }
        }
    }

    fn name(&self) -> &str {
        "telegram"
    }
}
