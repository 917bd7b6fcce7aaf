// Outbound reminder delivery over the Telegram Bot API.

use async_trait::async_trait;
use common::dispatcher::ReminderSink;
use common::errors::DispatchError;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ParseMode};

pub struct TelegramSink {
    bot: Bot,
}

impl TelegramSink {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ReminderSink for TelegramSink {
    async fn deliver(&self, chat_id: i64, text: &str) -> Result<(), DispatchError> {
        self.bot
            .send_message(ChatId(chat_id), text)
            .parse_mode(ParseMode::Html)
            .await
            .map(|_| ())
            .map_err(|e| DispatchError::DeliveryFailed(e.to_string()))
    }
}
