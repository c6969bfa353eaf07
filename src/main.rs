use anyhow::{Context, Result};
use secrecy::ExposeSecret;
use std::env;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use shop_bot::bot::{self, BotContext};
use shop_bot::config::Config;
use shop_bot::localization::{init_localization, t_lang};
use shop_bot::store;
use shop_bot::strapi::StrapiClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing();

    info!("Starting Strapi Shop Telegram Bot");

    let config = Config::from_env().context("Failed to read configuration")?;
    init_localization()?;

    let catalog = StrapiClient::new(&config.strapi).context("Failed to build Strapi client")?;
    info!(base_url = %catalog.base_url(), "Strapi client initialized");

    let state_store = store::connect(&config.state_store)
        .await
        .context("Failed to open conversation state store")?;

    let context = Arc::new(BotContext::new(Arc::new(catalog), state_store));

    let bot = Bot::new(config.bot_token.expose_secret());

    if let Err(e) = bot
        .set_my_commands(vec![BotCommand::new("start", t_lang("command-start", None))])
        .await
    {
        warn!(error = %e, "Failed to register bot commands");
    }

    info!("Bot initialized, starting dispatcher");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint(bot::message_handler))
        .branch(Update::filter_callback_query().endpoint(bot::callback_handler));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![context])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

/// `RUST_LOG` filters (default `info`); `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
