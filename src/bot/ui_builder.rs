//! UI Builder module for creating keyboards and formatting messages

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::utils::html;

use crate::dialogue::CallbackAction;
use crate::localization::{t_args_lang, t_lang};
use crate::strapi::{Cart, Product};

/// One button per product plus the cart button at the bottom
pub fn create_menu_keyboard(products: &[Product], language_code: Option<&str>) -> InlineKeyboardMarkup {
    let mut buttons: Vec<Vec<InlineKeyboardButton>> = products
        .iter()
        .map(|product| {
            vec![InlineKeyboardButton::callback(
                product.title.clone(),
                CallbackAction::ShowProduct(product.document_id.clone()).to_data(),
            )]
        })
        .collect();

    buttons.push(vec![InlineKeyboardButton::callback(
        t_lang("menu-cart-button", language_code),
        CallbackAction::ShowCart.to_data(),
    )]);

    InlineKeyboardMarkup::new(buttons)
}

pub fn create_product_keyboard(product_id: &str, language_code: Option<&str>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            t_lang("product-button-back", language_code),
            CallbackAction::BackToMenu.to_data(),
        )],
        vec![InlineKeyboardButton::callback(
            t_lang("product-button-add", language_code),
            CallbackAction::AddToCart(product_id.to_string()).to_data(),
        )],
    ])
}

pub fn create_cart_keyboard(language_code: Option<&str>) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            t_lang("cart-button-back", language_code),
            CallbackAction::BackToMenu.to_data(),
        )],
        vec![InlineKeyboardButton::callback(
            t_lang("cart-button-clear", language_code),
            CallbackAction::ClearCart.to_data(),
        )],
        vec![InlineKeyboardButton::callback(
            t_lang("cart-button-pay", language_code),
            CallbackAction::Pay.to_data(),
        )],
    ])
}

/// Product card: bold title, description, price when set
pub fn format_product(product: &Product, language_code: Option<&str>) -> String {
    let mut text = html::bold(&html::escape(&product.title));

    if let Some(description) = product.description.as_deref().filter(|d| !d.trim().is_empty()) {
        text.push_str("\n\n");
        text.push_str(&html::escape(description.trim()));
    }

    if let Some(price) = product.price {
        text.push_str("\n\n");
        text.push_str(&t_args_lang(
            "product-price",
            &[("price", &price.to_string())],
            language_code,
        ));
    }

    text
}

/// Cart listing with one line per item and the grand total.
///
/// Items whose product was removed from the catalog, or has no price, are
/// left out.
pub fn format_cart(cart: &Cart, language_code: Option<&str>) -> String {
    let mut text = html::bold(&t_lang("cart-title", language_code));
    text.push_str("\n\n");

    for item in &cart.cart_items {
        let (Some(product), Some(line_total)) = (item.product.as_ref(), item.line_total()) else {
            continue;
        };

        text.push_str(&t_args_lang(
            "cart-line",
            &[
                ("title", &html::escape(&product.title)),
                ("quantity", &item.quantity.to_string()),
                ("total", &line_total.to_string()),
            ],
            language_code,
        ));
        text.push('\n');
    }

    text.push('\n');
    text.push_str(&format!(
        "{} {} {}",
        html::bold(&t_lang("cart-total", language_code)),
        cart.total(),
        t_lang("cart-currency", language_code)
    ));

    text
}
