//! Cart operations: listing, adding and clearing

use anyhow::Result;
use tracing::{error, info, warn};

use crate::dialogue::ConversationState;
use crate::localization::t_lang;

use super::context::Turn;
use super::menu_handler::show_menu;
use super::ui_builder::{create_cart_keyboard, format_cart};

/// Every "add to cart" press creates one line with this quantity.
pub const DEFAULT_QUANTITY: u32 = 1;

/// Show the chat's cart, creating an empty one on first use
pub async fn show_cart(turn: &Turn<'_>) -> Result<ConversationState> {
    let chat_id = turn.chat_id();
    let lang = turn.lang();

    let cart = match turn.catalog().get_or_create_cart(chat_id.0).await {
        Ok(cart) => cart,
        Err(e) => {
            warn!(%chat_id, error = %e, "Failed to get or create cart");
            let message = t_lang("cart-unavailable", lang);
            turn.answer(Some(message.clone())).await;
            turn.say(message).await?;
            return Ok(ConversationState::HandleMenu);
        }
    };

    let contents = match turn.catalog().get_cart_contents(&cart.document_id).await {
        Ok(contents) => contents.filter(|cart| !cart.is_empty()),
        Err(e) => {
            warn!(%chat_id, cart_id = %cart.document_id, error = %e, "Failed to fetch cart contents");
            None
        }
    };

    let Some(contents) = contents else {
        let message = t_lang("cart-empty", lang);
        turn.answer(Some(message.clone())).await;
        turn.say(message).await?;
        return Ok(ConversationState::HandleMenu);
    };

    turn.answer(None).await;
    turn.messenger
        .send_text(
            chat_id,
            format_cart(&contents, lang),
            Some(create_cart_keyboard(lang)),
        )
        .await?;

    Ok(ConversationState::HandleCart)
}

/// Add one unit of the product as a new cart line
pub async fn add_to_cart(turn: &Turn<'_>, product_id: &str) -> Result<ConversationState> {
    let chat_id = turn.chat_id();
    let lang = turn.lang();

    let cart = match turn.catalog().get_or_create_cart(chat_id.0).await {
        Ok(cart) => cart,
        Err(e) => {
            error!(%chat_id, error = %e, "Cart missing, cannot add product");
            turn.answer(Some(t_lang("cart-create-failed", lang))).await;
            return Ok(ConversationState::HandleDescription);
        }
    };

    info!(
        %chat_id,
        cart_id = %cart.document_id,
        product_id,
        quantity = DEFAULT_QUANTITY,
        "Adding product to cart"
    );

    match turn
        .catalog()
        .add_product_to_cart(&cart.document_id, product_id, DEFAULT_QUANTITY)
        .await
    {
        Ok(_) => {
            turn.answer(None).await;
            turn.say(t_lang("item-added", lang)).await?;
            show_menu(turn).await
        }
        Err(e) => {
            error!(%chat_id, product_id, error = %e, "Failed to add product to cart");
            turn.answer(Some(t_lang("item-add-failed", lang))).await;
            Ok(ConversationState::HandleDescription)
        }
    }
}

/// Remove every line from the chat's cart
pub async fn clear_cart(turn: &Turn<'_>) -> Result<ConversationState> {
    let chat_id = turn.chat_id();
    let lang = turn.lang();

    let cart = match turn.catalog().get_or_create_cart(chat_id.0).await {
        Ok(cart) => cart,
        Err(e) => {
            error!(%chat_id, error = %e, "Cart not found for clearing");
            turn.answer(None).await;
            turn.say(t_lang("cart-not-found", lang)).await?;
            return Ok(ConversationState::HandleCart);
        }
    };

    info!(%chat_id, cart_id = %cart.document_id, "Clearing cart");

    turn.answer(None).await;
    match turn.catalog().clear_cart(&cart.document_id).await {
        Ok(()) => {
            turn.say(t_lang("cart-cleared", lang)).await?;
            turn.discard_button_message().await;
            show_menu(turn).await
        }
        Err(e) => {
            error!(%chat_id, cart_id = %cart.document_id, error = %e, "Failed to clear cart");
            turn.say(t_lang("cart-clear-failed", lang)).await?;
            Ok(ConversationState::HandleCart)
        }
    }
}
