//! Dry-run notifier that only logs alerts

use super::Notifier;
use async_trait::async_trait;

/// Writes alerts to the log instead of delivering them
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_message(&self, _bot_token: &str, chat_id: &str, text: &str) -> anyhow::Result<()> {
        tracing::info!(chat_id, text, "Alert (dry run)");
        Ok(())
    }
}
