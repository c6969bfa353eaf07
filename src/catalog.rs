//! Backend operations the dialogue needs, independent of the HTTP client.

use async_trait::async_trait;

use crate::strapi::{Cart, CartItem, Client, Product, ProductImage, StrapiError};

/// Shop backend as seen by the conversation handlers.
///
/// Absence is an `Option`; transport, status and decoding failures are an
/// `Err` that handlers turn into a message for the user.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, StrapiError>;

    async fn get_or_create_cart(&self, chat_id: i64) -> Result<Cart, StrapiError>;

    async fn get_cart_contents(&self, cart_id: &str) -> Result<Option<Cart>, StrapiError>;

    async fn add_product_to_cart(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: u32,
    ) -> Result<CartItem, StrapiError>;

    async fn clear_cart(&self, cart_id: &str) -> Result<(), StrapiError>;

    async fn get_or_create_client(&self, email: &str) -> Result<Client, StrapiError>;

    async fn get_product_image(
        &self,
        product: &Product,
    ) -> Result<Option<ProductImage>, StrapiError>;
}
