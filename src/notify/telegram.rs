//! Telegram Bot API notifier

use super::Notifier;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Telegram Bot API base URL
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Configuration for the Telegram notifier
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Base URL for the Bot API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            base_url: TELEGRAM_API_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Sends alerts through the Telegram `sendMessage` method
pub struct TelegramNotifier {
    config: TelegramConfig,
    client: Client,
}

impl TelegramNotifier {
    /// Create a notifier with default configuration
    pub fn new() -> anyhow::Result<Self> {
        Self::with_config(TelegramConfig::default())
    }

    /// Create a notifier with custom configuration
    pub fn with_config(config: TelegramConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn send_message_url(&self, bot_token: &str) -> String {
        format!("{}/bot{}/sendMessage", self.config.base_url, bot_token)
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Error text for a non-success response, preferring the API's description
fn api_error_message(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<ApiResponse>(body)
        .ok()
        .and_then(|response| response.description)
        .unwrap_or_else(|| body.trim().to_string());
    format!("Telegram API error: {status} - {detail}")
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_message(&self, bot_token: &str, chat_id: &str, text: &str) -> anyhow::Result<()> {
        let request = SendMessageRequest {
            chat_id,
            text,
            disable_web_page_preview: true,
        };

        let response = self
            .client
            .post(self.send_message_url(bot_token))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!(api_error_message(status, &body));
        }

        let body: ApiResponse = response.json().await?;
        if !body.ok {
            anyhow::bail!(
                "Telegram API error: {} - {}",
                status,
                body.description.unwrap_or_default()
            );
        }

        tracing::debug!(chat_id, "Telegram message delivered");
        Ok(())
    }
}
