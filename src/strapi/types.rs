//! Strapi record and request body types.
//!
//! Strapi v5 returns flat records (no `attributes` wrapper) inside a `data`
//! envelope. Relations are only present when the request asked for them via
//! `populate`.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Single-record response envelope.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

/// Collection response envelope.
#[derive(Debug, Deserialize)]
pub struct ApiListResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Request body envelope: every create/update payload is wrapped in `data`.
#[derive(Debug, Serialize)]
pub struct DataBody<T> {
    pub data: T,
}

/// Uploaded media file attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Media {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Catalog product.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Product {
    pub id: i64,
    #[serde(rename = "documentId")]
    pub document_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Unset in the CMS for products that are not priced yet.
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub picture: Vec<Media>,
}

/// Line of a cart. `product` is only populated by the cart contents query.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CartItem {
    pub id: i64,
    #[serde(rename = "documentId")]
    pub document_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub product: Option<Product>,
}

/// Shopping cart owned by a single chat.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Cart {
    pub id: i64,
    #[serde(rename = "documentId")]
    pub document_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub cart_items: Vec<CartItem>,
}

/// Customer contact record created at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Client {
    pub id: i64,
    #[serde(rename = "documentId")]
    pub document_id: String,
    pub email: String,
}

/// Downloaded product picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductImage {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

impl Product {
    /// First attached picture, if any.
    #[must_use]
    pub fn main_picture(&self) -> Option<&Media> {
        self.picture.first()
    }
}

impl CartItem {
    /// `price * quantity`, or `None` when the product relation or its price
    /// is missing.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.product
            .as_ref()
            .and_then(|product| product.price)
            .map(|price| price * Decimal::from(self.quantity))
    }
}

impl Cart {
    /// Sum of all line totals. Lines without a product or price are skipped.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.cart_items
            .iter()
            .filter_map(CartItem::line_total)
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart_items.is_empty()
    }
}

/// Relation reference by document id.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRef {
    #[serde(rename = "documentId")]
    pub document_id: String,
}

impl DocumentRef {
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
        }
    }
}

/// `{"connect": [...]}` relation update.
#[derive(Debug, Serialize)]
pub struct Connect {
    pub connect: Vec<DocumentRef>,
}

/// `{"disconnect": [...]}` relation update.
#[derive(Debug, Serialize)]
pub struct Disconnect {
    pub disconnect: Vec<DocumentRef>,
}

#[derive(Debug, Serialize)]
pub struct NewCart {
    pub chat_id: String,
}

#[derive(Debug, Serialize)]
pub struct NewCartItem {
    pub quantity: u32,
    pub cart: Connect,
    pub product: Connect,
}

impl NewCartItem {
    pub fn new(cart_id: &str, product_id: &str, quantity: u32) -> Self {
        Self {
            quantity,
            cart: Connect {
                connect: vec![DocumentRef::new(cart_id)],
            },
            product: Connect {
                connect: vec![DocumentRef::new(product_id)],
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CartItemsUpdate {
    pub cart_items: Disconnect,
}

#[derive(Debug, Serialize)]
pub struct NewClient {
    pub email: String,
}

fn default_quantity() -> u32 {
    1
}

/// Media fields are a list when the field allows multiple files, a single
/// object otherwise, and `null` when nothing is uploaded.
fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany<T> {
        Many(Vec<T>),
        One(T),
    }

    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::Many(items)) => items,
        Some(OneOrMany::One(item)) => vec![item],
    })
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match Option::<serde_json::Value>::deserialize(deserializer)? {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        },
    )
}
