//! Conversation states, button payloads and input validation.

use std::fmt;
use std::str::FromStr;

/// Step of the shop conversation a chat is in.
///
/// Persisted between updates as its upper-case name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConversationState {
    #[default]
    Start,
    HandleMenu,
    HandleDescription,
    ShowCart,
    HandleCart,
    WaitingEmail,
}

impl ConversationState {
    pub const ALL: [ConversationState; 6] = [
        ConversationState::Start,
        ConversationState::HandleMenu,
        ConversationState::HandleDescription,
        ConversationState::ShowCart,
        ConversationState::HandleCart,
        ConversationState::WaitingEmail,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ConversationState::Start => "START",
            ConversationState::HandleMenu => "HANDLE_MENU",
            ConversationState::HandleDescription => "HANDLE_DESCRIPTION",
            ConversationState::ShowCart => "SHOW_CART",
            ConversationState::HandleCart => "HANDLE_CART",
            ConversationState::WaitingEmail => "WAITING_EMAIL",
        }
    }

    /// Decode a stored value. Missing or unknown values restart the
    /// conversation at `Start`.
    #[must_use]
    pub fn from_stored(stored: Option<&str>) -> Self {
        stored
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or_default()
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownState(pub String);

impl fmt::Display for UnknownState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown conversation state: {}", self.0)
    }
}

impl std::error::Error for UnknownState {}

impl FromStr for ConversationState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConversationState::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| UnknownState(s.to_string()))
    }
}

pub const SHOW_CART: &str = "SHOW_CART";
pub const BACK_TO_MENU: &str = "BACK_TO_MENU";
pub const CLEAR_CART: &str = "CLEAR_CART";
pub const PAY: &str = "PAY";
pub const ADD_TO_CART_PREFIX: &str = "ADD_TO_CART_";

/// Inline button payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    ShowCart,
    BackToMenu,
    ClearCart,
    Pay,
    AddToCart(String),
    /// Any other payload is a product document id from the menu.
    ShowProduct(String),
}

impl CallbackAction {
    #[must_use]
    pub fn parse(data: &str) -> Self {
        match data {
            SHOW_CART => CallbackAction::ShowCart,
            BACK_TO_MENU => CallbackAction::BackToMenu,
            CLEAR_CART => CallbackAction::ClearCart,
            PAY => CallbackAction::Pay,
            _ => match data.strip_prefix(ADD_TO_CART_PREFIX) {
                Some(product_id) => CallbackAction::AddToCart(product_id.to_string()),
                None => CallbackAction::ShowProduct(data.to_string()),
            },
        }
    }

    /// Payload to put on a button.
    #[must_use]
    pub fn to_data(&self) -> String {
        match self {
            CallbackAction::ShowCart => SHOW_CART.to_string(),
            CallbackAction::BackToMenu => BACK_TO_MENU.to_string(),
            CallbackAction::ClearCart => CLEAR_CART.to_string(),
            CallbackAction::Pay => PAY.to_string(),
            CallbackAction::AddToCart(product_id) => format!("{ADD_TO_CART_PREFIX}{product_id}"),
            CallbackAction::ShowProduct(product_id) => product_id.clone(),
        }
    }
}

/// Validates an e-mail typed at checkout.
///
/// Only checks that both `@` and `.` are present.
pub fn validate_email(input: &str) -> Result<String, &'static str> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err("empty");
    }

    if !trimmed.contains('@') || !trimmed.contains('.') {
        return Err("invalid");
    }

    Ok(trimmed.to_string())
}
