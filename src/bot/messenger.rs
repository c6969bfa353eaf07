//! Outgoing side of the bot: everything handlers render goes through here.

use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{CallbackQueryId, InlineKeyboardMarkup, InputFile, MessageId, ParseMode};

use crate::strapi::ProductImage;

/// Rendering operations used by the conversation handlers.
///
/// Texts are Telegram HTML.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()>;

    async fn send_photo(
        &self,
        chat_id: ChatId,
        image: ProductImage,
        caption: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()>;

    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()>;

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<()>;

    async fn answer_callback(&self, query_id: &CallbackQueryId, text: Option<String>) -> Result<()>;
}

/// Messenger backed by the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()> {
        let mut request = self.bot.send_message(chat_id, text).parse_mode(ParseMode::Html);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(keyboard);
        }
        request.await?;
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: ChatId,
        image: ProductImage,
        caption: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()> {
        let photo = InputFile::memory(image.bytes).file_name(image.file_name);
        let mut request = self
            .bot
            .send_photo(chat_id, photo)
            .caption(caption)
            .parse_mode(ParseMode::Html);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(keyboard);
        }
        request.await?;
        Ok(())
    }

    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()> {
        let mut request = self
            .bot
            .edit_message_text(chat_id, message_id, text)
            .parse_mode(ParseMode::Html);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(keyboard);
        }
        request.await?;
        Ok(())
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<()> {
        self.bot.delete_message(chat_id, message_id).await?;
        Ok(())
    }

    async fn answer_callback(&self, query_id: &CallbackQueryId, text: Option<String>) -> Result<()> {
        let mut request = self.bot.answer_callback_query(query_id.clone());
        if let Some(text) = text {
            request = request.text(text);
        }
        request.await?;
        Ok(())
    }
}
