//! Dialogue Manager module: one update in, one state write out

use tracing::{debug, error, warn};

use crate::dialogue::ConversationState;

use super::callback_handler::handle_callback;
use super::cart_handler::show_cart;
use super::context::{BotContext, ReplyInput, Turn, UserReply};
use super::menu_handler::show_menu;
use super::message_handler::handle_email;
use super::messenger::Messenger;

/// Process one user update and persist the resulting state.
///
/// `/start` always shows the menu. Otherwise the stored state picks the
/// handler. Handler errors are logged and answered with the menu, so every
/// update ends with a valid state written back. Returns that state.
pub async fn handle_users_reply(
    context: &BotContext,
    messenger: &dyn Messenger,
    reply: &UserReply,
) -> ConversationState {
    let chat_id = reply.chat_id;
    let turn = Turn::new(context, messenger, reply);

    let next_state = if reply.is_start_command() {
        debug!(%chat_id, "Start command, showing menu");
        show_menu_or_default(&turn).await
    } else {
        let state = load_state(context, chat_id.0).await;
        debug!(%chat_id, %state, "Dispatching update");

        match dispatch(&turn, state).await {
            Ok(next_state) => next_state,
            Err(e) => {
                error!(%chat_id, %state, error = %e, "Failed to handle update, falling back to menu");
                show_menu_or_default(&turn).await
            }
        }
    };

    // Button presses must always be answered or the client keeps spinning.
    turn.answer(None).await;

    if let Err(e) = context.store.set(chat_id.0, next_state.as_str()).await {
        error!(%chat_id, state = %next_state, error = %e, "Failed to save conversation state");
    }

    next_state
}

/// Exhaustive state → handler table
async fn dispatch(turn: &Turn<'_>, state: ConversationState) -> anyhow::Result<ConversationState> {
    match state {
        ConversationState::Start => show_menu(turn).await,
        ConversationState::HandleMenu | ConversationState::HandleDescription => {
            match &turn.reply.input {
                ReplyInput::Button { data, .. } => handle_callback(turn, data).await,
                ReplyInput::Text(_) => show_menu(turn).await,
            }
        }
        ConversationState::ShowCart => show_cart(turn).await,
        ConversationState::HandleCart => match &turn.reply.input {
            ReplyInput::Button { data, .. } => handle_callback(turn, data).await,
            ReplyInput::Text(_) => show_cart(turn).await,
        },
        ConversationState::WaitingEmail => match &turn.reply.input {
            ReplyInput::Text(text) => handle_email(turn, text).await,
            ReplyInput::Button { data, .. } => handle_callback(turn, data).await,
        },
    }
}

/// Stored state for the chat; unreadable or unknown values restart at `Start`.
async fn load_state(context: &BotContext, chat_id: i64) -> ConversationState {
    match context.store.get(chat_id).await {
        Ok(stored) => {
            let state = ConversationState::from_stored(stored.as_deref());
            if let Some(raw) = stored.as_deref() {
                if state.as_str() != raw.trim() {
                    warn!(chat_id, stored = raw, "Unknown stored state, restarting dialogue");
                }
            }
            state
        }
        Err(e) => {
            error!(chat_id, error = %e, "Failed to load conversation state");
            ConversationState::Start
        }
    }
}

/// The menu is the recovery point; if even it cannot be sent the chat is
/// still moved to `HandleMenu` so the next button press works.
async fn show_menu_or_default(turn: &Turn<'_>) -> ConversationState {
    match show_menu(turn).await {
        Ok(state) => state,
        Err(e) => {
            error!(chat_id = %turn.chat_id(), error = %e, "Failed to show menu");
            ConversationState::HandleMenu
        }
    }
}
