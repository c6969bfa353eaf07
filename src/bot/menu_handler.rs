//! Catalog browsing: product list and product card

use anyhow::Result;
use tracing::{debug, warn};

use crate::dialogue::ConversationState;
use crate::localization::t_lang;

use super::context::Turn;
use super::ui_builder::{create_menu_keyboard, create_product_keyboard, format_product};

/// Send the product list as a new message.
///
/// A failing catalog request still renders the menu, with the cart button
/// only, so this is always a safe place to land.
pub async fn show_menu(turn: &Turn<'_>) -> Result<ConversationState> {
    let chat_id = turn.chat_id();
    let products = match turn.catalog().list_products().await {
        Ok(products) => products,
        Err(e) => {
            warn!(%chat_id, error = %e, "Failed to fetch products for menu");
            Vec::new()
        }
    };
    debug!(%chat_id, products = products.len(), "Rendering menu");

    turn.answer(None).await;
    turn.messenger
        .send_text(
            chat_id,
            t_lang("menu-title", turn.lang()),
            Some(create_menu_keyboard(&products, turn.lang())),
        )
        .await?;

    Ok(ConversationState::HandleMenu)
}

/// Turn the pressed menu message into the product card.
///
/// The product is looked up by a linear scan of the catalog. Cards with a
/// picture replace the menu message with a photo, since a text message
/// cannot be edited into a media message.
pub async fn show_product(turn: &Turn<'_>, product_id: &str) -> Result<ConversationState> {
    let chat_id = turn.chat_id();
    let lang = turn.lang();
    // Nothing to report on the button itself; stop the spinner before the
    // backend round trips.
    turn.answer(None).await;

    let products = match turn.catalog().list_products().await {
        Ok(products) => products,
        Err(e) => {
            warn!(%chat_id, error = %e, "Failed to fetch products for product card");
            Vec::new()
        }
    };

    let Some(product) = products.into_iter().find(|p| p.document_id == product_id) else {
        debug!(%chat_id, product_id, "Product not found");
        turn.say(t_lang("product-not-found", lang)).await?;
        return Ok(ConversationState::HandleMenu);
    };

    let text = format_product(&product, lang);
    let keyboard = create_product_keyboard(&product.document_id, lang);

    let image = match turn.catalog().get_product_image(&product).await {
        Ok(image) => image,
        Err(e) => {
            warn!(%chat_id, product_id, error = %e, "Failed to download product image");
            None
        }
    };

    match (image, turn.button_message()) {
        (Some(image), _) => {
            turn.discard_button_message().await;
            turn.messenger
                .send_photo(chat_id, image, text, Some(keyboard))
                .await?;
        }
        (None, Some(message_id)) => {
            turn.messenger
                .edit_text(chat_id, message_id, text, Some(keyboard))
                .await?;
        }
        (None, None) => {
            turn.messenger.send_text(chat_id, text, Some(keyboard)).await?;
        }
    }

    Ok(ConversationState::HandleDescription)
}
