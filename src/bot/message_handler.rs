//! Message Handler module for text typed by the user

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{debug, error, info};

use crate::dialogue::{validate_email, ConversationState};
use crate::localization::{t_args_lang, t_lang};

use super::context::{BotContext, Turn, UserReply};
use super::dialogue_manager::handle_users_reply;
use super::menu_handler::show_menu;
use super::messenger::TelegramMessenger;

/// Entry point for incoming messages
pub async fn message_handler(bot: Bot, msg: Message, context: Arc<BotContext>) -> Result<()> {
    let Some(text) = msg.text() else {
        debug!(user_id = %msg.chat.id, "Ignoring non-text message");
        return Ok(());
    };

    let reply = UserReply::text(msg.chat.id, text)
        .with_language(msg.from.as_ref().and_then(|user| user.language_code.clone()));
    debug!(user_id = %msg.chat.id, "Received text message from user");

    let messenger = TelegramMessenger::new(bot);
    handle_users_reply(&context, &messenger, &reply).await;

    Ok(())
}

/// Handle the e-mail sent after pressing "Pay"
pub async fn handle_email(turn: &Turn<'_>, input: &str) -> Result<ConversationState> {
    let chat_id = turn.chat_id();
    let lang = turn.lang();

    let email = match validate_email(input) {
        Ok(email) => email,
        Err(_) => {
            turn.say(t_lang("email-invalid", lang)).await?;
            // Keep waiting, user can try again
            return Ok(ConversationState::WaitingEmail);
        }
    };

    match turn.catalog().get_or_create_client(&email).await {
        Ok(client) => {
            info!(%chat_id, client_id = %client.document_id, "Client registered");
            turn.say(t_args_lang(
                "email-saved",
                &[("email", &teloxide::utils::html::escape(&email))],
                lang,
            ))
            .await?;
        }
        Err(e) => {
            error!(%chat_id, error = %e, "Failed to create client");
            turn.say(t_lang("client-create-failed", lang)).await?;
        }
    }

    show_menu(turn).await
}
