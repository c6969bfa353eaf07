//! Per-process and per-update context handed to the conversation handlers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use teloxide::types::{CallbackQueryId, ChatId, MessageId};

use crate::catalog::Catalog;
use crate::store::StateStore;

use super::messenger::Messenger;

/// Long-lived collaborators shared by every update.
///
/// Built once in `main` and injected into the dispatcher; handlers never
/// reach for globals to find the backend or the state store.
#[derive(Clone)]
pub struct BotContext {
    pub catalog: Arc<dyn Catalog>,
    pub store: Arc<dyn StateStore>,
}

impl BotContext {
    pub fn new(catalog: Arc<dyn Catalog>, store: Arc<dyn StateStore>) -> Self {
        Self { catalog, store }
    }
}

/// What the user sent.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyInput {
    /// Plain text message, including commands.
    Text(String),
    /// Inline button press on one of the bot's messages.
    Button {
        query_id: CallbackQueryId,
        data: String,
        message_id: MessageId,
    },
}

/// One incoming update, stripped of everything the handlers don't use.
#[derive(Debug, Clone, PartialEq)]
pub struct UserReply {
    pub chat_id: ChatId,
    pub language_code: Option<String>,
    pub input: ReplyInput,
}

impl UserReply {
    pub fn text(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            language_code: None,
            input: ReplyInput::Text(text.into()),
        }
    }

    pub fn button(
        chat_id: ChatId,
        query_id: CallbackQueryId,
        data: impl Into<String>,
        message_id: MessageId,
    ) -> Self {
        Self {
            chat_id,
            language_code: None,
            input: ReplyInput::Button {
                query_id,
                data: data.into(),
                message_id,
            },
        }
    }

    #[must_use]
    pub fn with_language(mut self, language_code: Option<String>) -> Self {
        self.language_code = language_code;
        self
    }

    /// `/start`, optionally addressed to the bot (`/start@shop_bot`).
    pub fn is_start_command(&self) -> bool {
        match &self.input {
            ReplyInput::Text(text) => {
                let command = text.split_whitespace().next().unwrap_or_default();
                command == "/start" || command.starts_with("/start@")
            }
            ReplyInput::Button { .. } => false,
        }
    }
}

/// Everything a handler needs while processing a single update.
pub struct Turn<'a> {
    pub context: &'a BotContext,
    pub messenger: &'a dyn Messenger,
    pub reply: &'a UserReply,
    answered: AtomicBool,
}

impl<'a> Turn<'a> {
    pub fn new(context: &'a BotContext, messenger: &'a dyn Messenger, reply: &'a UserReply) -> Self {
        Self {
            context,
            messenger,
            reply,
            answered: AtomicBool::new(false),
        }
    }

    pub fn chat_id(&self) -> ChatId {
        self.reply.chat_id
    }

    pub fn lang(&self) -> Option<&str> {
        self.reply.language_code.as_deref()
    }

    pub fn catalog(&self) -> &dyn Catalog {
        self.context.catalog.as_ref()
    }

    /// Message the pressed button belongs to.
    pub fn button_message(&self) -> Option<MessageId> {
        match &self.reply.input {
            ReplyInput::Button { message_id, .. } => Some(*message_id),
            ReplyInput::Text(_) => None,
        }
    }

    /// Answer the button press, optionally with a notification text.
    ///
    /// Telegram accepts one answer per callback query; later calls are no-ops.
    /// The answer only stops the client's spinner, so a rejected answer (for
    /// example "query is too old" after a slow backend) is logged and the
    /// turn goes on.
    pub async fn answer(&self, text: Option<String>) {
        let ReplyInput::Button { query_id, .. } = &self.reply.input else {
            return;
        };
        if self.answered.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(e) = self.messenger.answer_callback(query_id, text).await {
            tracing::warn!(chat_id = %self.chat_id(), error = %e, "Failed to answer callback query");
        }
    }

    /// Send a text message to the chat without a keyboard.
    pub async fn say(&self, text: String) -> Result<()> {
        self.messenger.send_text(self.chat_id(), text, None).await
    }

    /// Delete the message the button was pressed on, logging failures.
    ///
    /// Telegram refuses to delete messages older than 48 hours; that must not
    /// abort the turn.
    pub async fn discard_button_message(&self) {
        if let Some(message_id) = self.button_message() {
            if let Err(e) = self.messenger.delete_message(self.chat_id(), message_id).await {
                tracing::warn!(chat_id = %self.chat_id(), error = %e, "Failed to delete message");
            }
        }
    }
}
