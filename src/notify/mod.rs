//! Notification module
//!
//! Alert text formatting and delivery to Telegram

mod dry_run;
mod telegram;
mod text;

pub use dry_run::LogNotifier;
pub use telegram::{TelegramConfig, TelegramNotifier};
pub use text::{create_text, make_human_readable};

use async_trait::async_trait;

/// Trait for alert delivery implementations
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send `text` to `chat_id` using the bot identified by `bot_token`
    async fn send_message(&self, bot_token: &str, chat_id: &str, text: &str) -> anyhow::Result<()>;
}
