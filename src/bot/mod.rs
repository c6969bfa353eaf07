//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `context`: Shared collaborators and the per-update `Turn`
//! - `messenger`: Rendering seam over the Telegram Bot API
//! - `dialogue_manager`: Loads the stored state, dispatches, saves the next state
//! - `message_handler`: Text messages and e-mail capture
//! - `callback_handler`: Inline keyboard button presses
//! - `menu_handler` / `cart_handler`: Catalog and cart flows
//! - `ui_builder`: Creates keyboards and formats messages

pub mod callback_handler;
pub mod cart_handler;
pub mod context;
pub mod dialogue_manager;
pub mod menu_handler;
pub mod message_handler;
pub mod messenger;
pub mod ui_builder;

// Re-export main handler functions for use in main.rs
pub use callback_handler::callback_handler;
pub use message_handler::message_handler;

pub use context::{BotContext, ReplyInput, Turn, UserReply};
pub use dialogue_manager::handle_users_reply;
pub use messenger::{Messenger, TelegramMessenger};
