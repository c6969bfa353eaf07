//! Shared fakes for driving the dialogue without Telegram or Strapi.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rust_decimal::Decimal;
use teloxide::types::{
    CallbackQueryId, ChatId, InlineKeyboardButtonKind, InlineKeyboardMarkup, MessageId,
};

use shop_bot::bot::{handle_users_reply, BotContext, Messenger, UserReply};
use shop_bot::catalog::Catalog;
use shop_bot::dialogue::ConversationState;
use shop_bot::store::{InMemStateStore, StateStore};
use shop_bot::strapi::{Cart, CartItem, Client, Media, Product, ProductImage, StrapiError};

pub fn product(document_id: &str, title: &str, price: i64) -> Product {
    Product {
        id: 0,
        document_id: document_id.to_string(),
        title: title.to_string(),
        description: Some(format!("{title} description")),
        price: Some(Decimal::from(price)),
        picture: vec![],
    }
}

fn unavailable() -> StrapiError {
    StrapiError::Api {
        status: 503,
        message: "Service Unavailable".to_string(),
    }
}

#[derive(Default)]
struct FakeState {
    products: Vec<Product>,
    carts: Vec<Cart>,
    items: Vec<(String, CartItem)>,
    clients: Vec<Client>,
    images: HashMap<String, ProductImage>,
    next_id: i64,
}

impl FakeState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory Strapi with switchable failures.
#[derive(Default)]
pub struct FakeCatalog {
    state: Mutex<FakeState>,
    pub fail_products: AtomicBool,
    pub fail_carts: AtomicBool,
    pub fail_add: AtomicBool,
    pub fail_clear: AtomicBool,
    pub fail_clients: AtomicBool,
}

impl FakeCatalog {
    pub fn with_products(products: Vec<Product>) -> Self {
        let catalog = Self::default();
        {
            let mut state = catalog.state.lock().unwrap();
            for mut product in products {
                product.id = state.next_id();
                state.products.push(product);
            }
        }
        catalog
    }

    pub fn set_image(&self, product_id: &str, file_name: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(product) = state.products.iter_mut().find(|p| p.document_id == product_id) {
            product.picture = vec![Media {
                url: format!("/uploads/{file_name}"),
                name: Some(file_name.to_string()),
            }];
        }
        state.images.insert(
            product_id.to_string(),
            ProductImage {
                bytes: vec![0xFF, 0xD8, 0xFF],
                file_name: file_name.to_string(),
            },
        );
    }

    pub fn cart_lines(&self, chat_id: i64) -> Vec<CartItem> {
        let state = self.state.lock().unwrap();
        let Some(cart) = state
            .carts
            .iter()
            .find(|c| c.chat_id.as_deref() == Some(chat_id.to_string().as_str()))
        else {
            return Vec::new();
        };
        state
            .items
            .iter()
            .filter(|(cart_id, _)| *cart_id == cart.document_id)
            .map(|(_, item)| item.clone())
            .collect()
    }

    pub fn cart_count(&self) -> usize {
        self.state.lock().unwrap().carts.len()
    }

    pub fn client_emails(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .clients
            .iter()
            .map(|c| c.email.clone())
            .collect()
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn list_products(&self) -> Result<Vec<Product>, StrapiError> {
        if self.fail_products.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self.state.lock().unwrap().products.clone())
    }

    async fn get_or_create_cart(&self, chat_id: i64) -> Result<Cart, StrapiError> {
        if self.fail_carts.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let mut state = self.state.lock().unwrap();
        let chat_id = chat_id.to_string();
        if let Some(cart) = state
            .carts
            .iter()
            .find(|c| c.chat_id.as_deref() == Some(chat_id.as_str()))
        {
            return Ok(cart.clone());
        }
        let id = state.next_id();
        let cart = Cart {
            id,
            document_id: format!("cart-{id}"),
            chat_id: Some(chat_id),
            cart_items: vec![],
        };
        state.carts.push(cart.clone());
        Ok(cart)
    }

    async fn get_cart_contents(&self, cart_id: &str) -> Result<Option<Cart>, StrapiError> {
        if self.fail_carts.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let state = self.state.lock().unwrap();
        let Some(cart) = state.carts.iter().find(|c| c.document_id == cart_id) else {
            return Ok(None);
        };
        let mut cart = cart.clone();
        cart.cart_items = state
            .items
            .iter()
            .filter(|(owner, _)| owner == cart_id)
            .map(|(_, item)| item.clone())
            .collect();
        Ok(Some(cart))
    }

    async fn add_product_to_cart(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: u32,
    ) -> Result<CartItem, StrapiError> {
        if self.fail_add.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let mut state = self.state.lock().unwrap();
        let product = state
            .products
            .iter()
            .find(|p| p.document_id == product_id)
            .cloned()
            .ok_or_else(|| StrapiError::Api {
                status: 400,
                message: format!("Document with id \"{product_id}\" not found"),
            })?;
        let id = state.next_id();
        let item = CartItem {
            id,
            document_id: format!("item-{id}"),
            quantity,
            product: Some(product),
        };
        state.items.push((cart_id.to_string(), item.clone()));
        Ok(CartItem {
            product: None,
            ..item
        })
    }

    async fn clear_cart(&self, cart_id: &str) -> Result<(), StrapiError> {
        if self.fail_clear.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.state
            .lock()
            .unwrap()
            .items
            .retain(|(owner, _)| owner != cart_id);
        Ok(())
    }

    async fn get_or_create_client(&self, email: &str) -> Result<Client, StrapiError> {
        if self.fail_clients.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        let mut state = self.state.lock().unwrap();
        if let Some(client) = state.clients.iter().find(|c| c.email == email) {
            return Ok(client.clone());
        }
        let id = state.next_id();
        let client = Client {
            id,
            document_id: format!("client-{id}"),
            email: email.to_string(),
        };
        state.clients.push(client.clone());
        Ok(client)
    }

    async fn get_product_image(
        &self,
        product: &Product,
    ) -> Result<Option<ProductImage>, StrapiError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .images
            .get(&product.document_id)
            .cloned())
    }
}

/// Something the bot rendered.
#[derive(Debug, Clone)]
pub enum Sent {
    Text {
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    },
    Photo {
        file_name: String,
        caption: String,
        keyboard: Option<InlineKeyboardMarkup>,
    },
    Edit {
        message_id: MessageId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    },
    Delete {
        message_id: MessageId,
    },
    Answer {
        query_id: CallbackQueryId,
        text: Option<String>,
    },
}

impl Sent {
    pub fn keyboard(&self) -> Option<&InlineKeyboardMarkup> {
        match self {
            Sent::Text { keyboard, .. }
            | Sent::Photo { keyboard, .. }
            | Sent::Edit { keyboard, .. } => keyboard.as_ref(),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Sent::Text { text, .. } | Sent::Edit { text, .. } => Some(text),
            Sent::Photo { caption, .. } => Some(caption),
            _ => None,
        }
    }
}

/// Callback payloads of a keyboard, row by row.
pub fn payloads(keyboard: &InlineKeyboardMarkup) -> Vec<String> {
    keyboard
        .inline_keyboard
        .iter()
        .flatten()
        .filter_map(|button| match &button.kind {
            InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
            _ => None,
        })
        .collect()
}

/// Messenger that records everything instead of calling Telegram.
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<Sent>>,
    pub fail_edits: AtomicBool,
    pub fail_answers: AtomicBool,
}

impl RecordingMessenger {
    pub fn take(&self) -> Vec<Sent> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    fn record(&self, sent: Sent) {
        self.sent.lock().unwrap().push(sent);
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(
        &self,
        _chat_id: ChatId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()> {
        self.record(Sent::Text { text, keyboard });
        Ok(())
    }

    async fn send_photo(
        &self,
        _chat_id: ChatId,
        image: ProductImage,
        caption: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()> {
        self.record(Sent::Photo {
            file_name: image.file_name,
            caption,
            keyboard,
        });
        Ok(())
    }

    async fn edit_text(
        &self,
        _chat_id: ChatId,
        message_id: MessageId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()> {
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(anyhow!("Bad Request: message to edit not found"));
        }
        self.record(Sent::Edit {
            message_id,
            text,
            keyboard,
        });
        Ok(())
    }

    async fn delete_message(&self, _chat_id: ChatId, message_id: MessageId) -> Result<()> {
        self.record(Sent::Delete { message_id });
        Ok(())
    }

    async fn answer_callback(&self, query_id: &CallbackQueryId, text: Option<String>) -> Result<()> {
        if self.fail_answers.load(Ordering::SeqCst) {
            return Err(anyhow!("Bad Request: query is too old and response timeout expired"));
        }
        self.record(Sent::Answer {
            query_id: query_id.clone(),
            text,
        });
        Ok(())
    }
}

/// Catalog, store and messenger wired into a `BotContext`.
pub struct Harness {
    pub catalog: Arc<FakeCatalog>,
    pub store: Arc<InMemStateStore>,
    pub messenger: RecordingMessenger,
    pub context: BotContext,
    queries: AtomicUsize,
}

impl Harness {
    pub fn new(catalog: FakeCatalog) -> Self {
        let catalog = Arc::new(catalog);
        let store = Arc::new(InMemStateStore::new());
        let context = BotContext::new(catalog.clone(), store.clone());
        Self {
            catalog,
            store,
            messenger: RecordingMessenger::default(),
            context,
            queries: AtomicUsize::new(0),
        }
    }

    pub fn with_fish() -> Self {
        Self::new(FakeCatalog::with_products(vec![
            product("salmon", "Salmon", 350),
            product("trout", "Trout", 280),
        ]))
    }

    pub async fn text(&self, chat_id: i64, text: &str) -> ConversationState {
        let reply = UserReply::text(ChatId(chat_id), text);
        handle_users_reply(&self.context, &self.messenger, &reply).await
    }

    pub async fn press(&self, chat_id: i64, data: &str, message_id: i32) -> ConversationState {
        let query = self.queries.fetch_add(1, Ordering::SeqCst);
        let reply = UserReply::button(
            ChatId(chat_id),
            CallbackQueryId(format!("query-{query}")),
            data,
            MessageId(message_id),
        );
        handle_users_reply(&self.context, &self.messenger, &reply).await
    }

    pub async fn stored(&self, chat_id: i64) -> Option<String> {
        self.store.get(chat_id).await.unwrap()
    }

    pub async fn set_state(&self, chat_id: i64, state: &str) {
        self.store.set(chat_id, state).await.unwrap();
    }
}
