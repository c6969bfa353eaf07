//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

use crate::dialogue::{CallbackAction, ConversationState};
use crate::localization::t_lang;

use super::cart_handler::{add_to_cart, clear_cart, show_cart};
use super::context::{BotContext, Turn, UserReply};
use super::dialogue_manager::handle_users_reply;
use super::menu_handler::{show_menu, show_product};
use super::messenger::TelegramMessenger;

/// Entry point for inline keyboard button presses
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    context: Arc<BotContext>,
) -> Result<()> {
    debug!(user_id = %q.from.id, "Received callback query from user");

    // Without the message there is no chat to answer in.
    let Some(msg) = q.message.as_ref() else {
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };

    let reply = UserReply::button(
        msg.chat().id,
        q.id.clone(),
        q.data.clone().unwrap_or_default(),
        msg.id(),
    )
    .with_language(q.from.language_code.clone());

    let messenger = TelegramMessenger::new(bot);
    handle_users_reply(&context, &messenger, &reply).await;

    Ok(())
}

/// Route a button payload to its action
pub async fn handle_callback(turn: &Turn<'_>, data: &str) -> Result<ConversationState> {
    let action = CallbackAction::parse(data);
    debug!(chat_id = %turn.chat_id(), ?action, "Handling button press");

    match action {
        CallbackAction::BackToMenu => {
            turn.answer(None).await;
            turn.discard_button_message().await;
            show_menu(turn).await
        }
        CallbackAction::ShowCart => show_cart(turn).await,
        CallbackAction::ClearCart => clear_cart(turn).await,
        CallbackAction::Pay => {
            turn.answer(None).await;
            turn.discard_button_message().await;
            turn.say(t_lang("email-prompt", turn.lang())).await?;
            Ok(ConversationState::WaitingEmail)
        }
        CallbackAction::AddToCart(product_id) => add_to_cart(turn, &product_id).await,
        CallbackAction::ShowProduct(product_id) => show_product(turn, &product_id).await,
    }
}
