//! Strapi REST client for the shop catalog.
//!
//! Talks to the content types the shop is modelled with in the CMS:
//!
//! - **products**: read-only catalog with an optional `picture` media field
//! - **carts**: one per chat, keyed by `chat_id`, with a `cart_items` relation
//! - **cart-items**: quantity plus `cart` and `product` relations
//! - **clients**: contact e-mails collected at checkout
//!
//! # API Reference
//!
//! - Base path: `<STRAPI_URL>/api`
//! - Authentication: API token via `Authorization: Bearer <token>`
//! - Filtering: `filters[<field>][$eq]=<value>`
//! - Relation expansion: `populate=*` or nested `populate[...]=true`

mod types;

pub use types::*;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::catalog::Catalog;
use crate::config::StrapiConfig;

/// Errors that can occur when talking to Strapi.
#[derive(Debug, Error)]
pub enum StrapiError {
    /// Connection, timeout or body read failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Strapi answered with a non-2xx status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Client could not be built from the configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Strapi API client.
///
/// Cheap to clone; the base URL and token travel with the client instead of
/// being read from the environment on every call.
#[derive(Clone)]
pub struct StrapiClient {
    inner: Arc<StrapiClientInner>,
}

struct StrapiClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl StrapiClient {
    /// Create a new Strapi client.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &StrapiConfig) -> Result<Self, StrapiError> {
        let mut headers = HeaderMap::new();

        let mut auth_value =
            HeaderValue::from_str(&format!("Bearer {}", config.token.expose_secret()))
                .map_err(|e| StrapiError::Config(format!("Invalid API token format: {e}")))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(StrapiClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
            }),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Full URL of an API resource path such as `carts/<id>`.
    #[must_use]
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api/{}", self.inner.base_url, path.trim_start_matches('/'))
    }

    /// Uploads are served with a path relative to the Strapi host.
    #[must_use]
    pub fn media_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}/{}", self.inner.base_url, url.trim_start_matches('/'))
        }
    }

    /// List every product with its relations populated.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Vec<Product>, StrapiError> {
        let response: ApiListResponse<Product> =
            self.get("products", &[("populate", "*")]).await?;
        debug!(count = response.data.len(), "Fetched products");
        Ok(response.data)
    }

    /// Find the cart owned by `chat_id`, creating it when none exists.
    ///
    /// # Errors
    ///
    /// Returns error if the lookup or the creation request fails.
    #[instrument(skip(self))]
    pub async fn get_or_create_cart(&self, chat_id: i64) -> Result<Cart, StrapiError> {
        let chat_id = chat_id.to_string();
        let response: ApiListResponse<Cart> = self
            .get("carts", &[("filters[chat_id][$eq]", chat_id.as_str())])
            .await?;

        if let Some(cart) = response.data.into_iter().next() {
            return Ok(cart);
        }

        debug!(%chat_id, "No cart yet, creating one");
        let body = DataBody {
            data: NewCart { chat_id },
        };
        let created: ApiResponse<Cart> = self.post("carts", &body).await?;
        Ok(created.data)
    }

    /// Fetch a cart with its items and their products populated.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_cart_contents(&self, cart_id: &str) -> Result<Option<Cart>, StrapiError> {
        let response: ApiListResponse<Cart> = self
            .get(
                "carts",
                &[
                    ("filters[documentId][$eq]", cart_id),
                    ("populate[cart_items][populate][product][populate][picture]", "true"),
                ],
            )
            .await?;
        Ok(response.data.into_iter().next())
    }

    /// Attach a new line item to a cart.
    ///
    /// Every call creates a separate line; existing lines for the same
    /// product are not merged.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn add_product_to_cart(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: u32,
    ) -> Result<CartItem, StrapiError> {
        let body = DataBody {
            data: NewCartItem::new(cart_id, product_id, quantity),
        };
        let created: ApiResponse<CartItem> = self.post("cart-items", &body).await?;
        Ok(created.data)
    }

    /// Disconnect every item from the cart. Succeeds on an empty cart.
    ///
    /// # Errors
    ///
    /// Returns error if listing the items or updating the cart fails.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self, cart_id: &str) -> Result<(), StrapiError> {
        let items: ApiListResponse<CartItem> = self
            .get("cart-items", &[("filters[cart][documentId][$eq]", cart_id)])
            .await?;

        if items.data.is_empty() {
            debug!("Cart already empty");
            return Ok(());
        }

        let body = DataBody {
            data: CartItemsUpdate {
                cart_items: Disconnect {
                    disconnect: items
                        .data
                        .into_iter()
                        .map(|item| DocumentRef::new(item.document_id))
                        .collect(),
                },
            },
        };
        let _: ApiResponse<serde_json::Value> =
            self.put(&format!("carts/{cart_id}"), &body).await?;
        Ok(())
    }

    /// Return the client registered with `email`, creating it if needed.
    ///
    /// A failed lookup is logged and followed by a creation attempt.
    ///
    /// # Errors
    ///
    /// Returns error if the creation request fails.
    #[instrument(skip(self))]
    pub async fn get_or_create_client(&self, email: &str) -> Result<Client, StrapiError> {
        match self
            .get::<ApiListResponse<Client>>("clients", &[("filters[email][$eq]", email)])
            .await
        {
            Ok(response) => {
                if let Some(client) = response.data.into_iter().next() {
                    return Ok(client);
                }
            }
            Err(e) => warn!(error = %e, "Client lookup failed, trying to create"),
        }

        let body = DataBody {
            data: NewClient {
                email: email.to_string(),
            },
        };
        let created: ApiResponse<Client> = self.post("clients", &body).await?;
        Ok(created.data)
    }

    /// Download the product's first picture.
    ///
    /// # Errors
    ///
    /// Returns error if the download fails.
    #[instrument(skip(self, product), fields(product_id = %product.document_id))]
    pub async fn get_product_image(
        &self,
        product: &Product,
    ) -> Result<Option<ProductImage>, StrapiError> {
        let Some(picture) = product.main_picture() else {
            return Ok(None);
        };

        let response = self
            .inner
            .client
            .get(self.media_url(&picture.url))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::parse_error(response).await);
        }

        let bytes = response.bytes().await?;
        let file_name = picture
            .name
            .clone()
            .or_else(|| picture.url.rsplit('/').next().map(str::to_string))
            .unwrap_or_else(|| format!("{}.jpg", product.document_id));

        Ok(Some(ProductImage {
            bytes: bytes.to_vec(),
            file_name,
        }))
    }

    /// Execute a GET request against an API resource.
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, StrapiError> {
        let response = self
            .inner
            .client
            .get(self.api_url(path))
            .query(query)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Execute a POST request against an API resource.
    async fn post<T: serde::de::DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, StrapiError> {
        let response = self
            .inner
            .client
            .post(self.api_url(path))
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    /// Execute a PUT request against an API resource.
    async fn put<T: serde::de::DeserializeOwned, B: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, StrapiError> {
        let response = self
            .inner
            .client
            .put(self.api_url(path))
            .json(body)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, StrapiError> {
        if response.status().is_success() {
            return response
                .json()
                .await
                .map_err(|e| StrapiError::Parse(format!("Failed to parse response: {e}")));
        }

        Err(Self::parse_error(response).await)
    }

    /// Strapi errors look like `{"error": {"status": 400, "message": "..."}}`.
    async fn parse_error(response: reqwest::Response) -> StrapiError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or(body);

        StrapiError::Api { status, message }
    }
}

#[async_trait]
impl Catalog for StrapiClient {
    async fn list_products(&self) -> Result<Vec<Product>, StrapiError> {
        self.get_products().await
    }

    async fn get_or_create_cart(&self, chat_id: i64) -> Result<Cart, StrapiError> {
        StrapiClient::get_or_create_cart(self, chat_id).await
    }

    async fn get_cart_contents(&self, cart_id: &str) -> Result<Option<Cart>, StrapiError> {
        StrapiClient::get_cart_contents(self, cart_id).await
    }

    async fn add_product_to_cart(
        &self,
        cart_id: &str,
        product_id: &str,
        quantity: u32,
    ) -> Result<CartItem, StrapiError> {
        StrapiClient::add_product_to_cart(self, cart_id, product_id, quantity).await
    }

    async fn clear_cart(&self, cart_id: &str) -> Result<(), StrapiError> {
        StrapiClient::clear_cart(self, cart_id).await
    }

    async fn get_or_create_client(&self, email: &str) -> Result<Client, StrapiError> {
        StrapiClient::get_or_create_client(self, email).await
    }

    async fn get_product_image(
        &self,
        product: &Product,
    ) -> Result<Option<ProductImage>, StrapiError> {
        StrapiClient::get_product_image(self, product).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use std::time::Duration;

    fn client(base_url: &str) -> StrapiClient {
        StrapiClient::new(&StrapiConfig {
            base_url: base_url.to_string(),
            token: SecretString::from("token".to_string()),
            timeout: Duration::from_secs(10),
        })
        .unwrap()
    }

    #[test]
    fn test_api_url_joins_base_path() {
        let client = client("http://localhost:1337/");
        assert_eq!(client.base_url(), "http://localhost:1337");
        assert_eq!(client.api_url("carts"), "http://localhost:1337/api/carts");
        assert_eq!(
            client.api_url("/carts/abc"),
            "http://localhost:1337/api/carts/abc"
        );
    }

    #[test]
    fn test_media_url_prefixes_relative_uploads() {
        let client = client("http://localhost:1337");
        assert_eq!(
            client.media_url("/uploads/fish.jpg"),
            "http://localhost:1337/uploads/fish.jpg"
        );
        assert_eq!(
            client.media_url("https://cdn.example.com/fish.jpg"),
            "https://cdn.example.com/fish.jpg"
        );
    }

    #[test]
    fn test_invalid_token_is_rejected() {
        let result = StrapiClient::new(&StrapiConfig {
            base_url: "http://localhost:1337".to_string(),
            token: SecretString::from("bad\ntoken".to_string()),
            timeout: Duration::from_secs(10),
        });
        assert!(matches!(result, Err(StrapiError::Config(_))));
    }
}
