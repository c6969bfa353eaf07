//! # Strapi Shop Bot
//!
//! A Telegram bot that sells a Strapi-managed product catalog: users browse
//! products, collect them in a cart and leave an e-mail to be contacted for
//! payment. Each chat's position in the conversation is kept in a state store
//! between updates.

pub mod bot;
pub mod catalog;
pub mod config;
pub mod dialogue;
pub mod localization;
pub mod store;
pub mod strapi;
