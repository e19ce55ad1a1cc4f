//! Client for the store's REST API.
//!
//! # Architecture
//!
//! - The API is the source of truth for products and orders; nothing is
//!   synced locally except the cart and the session
//! - Plain JSON over HTTP with `reqwest`
//! - The product list is cached in memory via `moka` (5 minute TTL) and
//!   invalidated by every product write made through this client
//!
//! # Endpoints
//!
//! | Method   | Path            | Use                          |
//! |----------|-----------------|------------------------------|
//! | `GET`    | `/products`     | Catalog listing              |
//! | `POST`   | `/products`     | Admin: create product        |
//! | `PUT`    | `/products/:id` | Admin: update product        |
//! | `DELETE` | `/products/:id` | Admin: delete product        |
//! | `GET`    | `/orders`       | Order history / admin queue  |
//! | `POST`   | `/orders`       | Checkout submission          |
//! | `PATCH`  | `/orders/:id`   | Admin: status transition     |
//! | `POST`   | `/login`        | Login                        |
//! | `POST`   | `/register`     | Registration                 |

mod cache;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use lapak_core::{NewOrder, Order, OrderId, OrderStatus, PhoneNumber, Product, ProductDraft, ProductId};
use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, instrument};
use url::Url;

use crate::config::ApiConfig;

use cache::{CacheKey, CacheValue};
pub use types::{AuthResponse, UserProfile};

/// How much of an error body to keep in errors and logs.
const BODY_SNIPPET_CHARS: usize = 200;

/// Errors that can occur when talking to the store API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// Response status code.
        status: u16,
        /// Start of the response body.
        message: String,
    },

    /// The resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The server rejected our credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limited by the server.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Could not build an endpoint URL from the base URL.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Whether this is the server's or the network's fault rather than the
    /// caller's.
    #[must_use]
    pub const fn is_server_side(&self) -> bool {
        match self {
            Self::Http(_) | Self::Parse(_) | Self::RateLimited(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::NotFound(_) | Self::Unauthorized(_) | Self::InvalidUrl(_) => false,
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the store API.
///
/// Cheaply cloneable; clones share the HTTP connection pool and the cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: std::sync::RwLock<Option<SecretString>>,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                token: std::sync::RwLock::new(config.token.clone()),
                cache,
            }),
        })
    }

    /// Use `token` as the bearer token for subsequent requests.
    pub fn set_token(&self, token: Option<SecretString>) {
        let mut guard = self
            .inner
            .token
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = token;
    }

    /// The configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build an endpoint URL by appending path segments to the base URL.
    ///
    /// Segments are percent-encoded, so IDs cannot escape their position.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.inner.client.request(method, url);
        let token = self
            .inner
            .token
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match token.as_ref() {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Send a request and return the raw body of a successful response.
    async fn send_raw(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let message = snippet(&body);
            return Err(match status {
                StatusCode::NOT_FOUND => ApiError::NotFound(message),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    ApiError::Unauthorized(message)
                }
                _ => {
                    error!(status = %status, body = %message, "API returned non-success status");
                    ApiError::Status {
                        status: status.as_u16(),
                        message,
                    }
                }
            });
        }

        Ok(body)
    }

    /// Send a request and parse the JSON body of a successful response.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send_raw(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, body = %snippet(&body), "Failed to parse API response");
            ApiError::Parse(e)
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// List all products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products.as_ref().clone());
        }

        let url = self.endpoint(&["products"])?;
        let products: Vec<Product> = self.send(self.request(Method::GET, url)).await?;
        debug!(count = products.len(), "Fetched products");

        self.inner
            .cache
            .insert(
                CacheKey::Products,
                CacheValue::Products(Arc::new(products.clone())),
            )
            .await;

        Ok(products)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_product(&self, draft: &ProductDraft) -> Result<Product, ApiError> {
        let url = self.endpoint(&["products"])?;
        let product: Product = self
            .send(self.request(Method::POST, url).json(draft))
            .await?;
        self.invalidate_products().await;
        Ok(product)
    }

    /// Replace a product's fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the request fails.
    #[instrument(skip(self, draft), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, ApiError> {
        let url = self.endpoint(&["products", id.as_str()])?;
        let product: Product = self
            .send(self.request(Method::PUT, url).json(draft))
            .await?;
        self.invalidate_products().await;
        Ok(product)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), ApiError> {
        let url = self.endpoint(&["products", id.as_str()])?;
        self.send_raw(self.request(Method::DELETE, url)).await?;
        self.invalidate_products().await;
        Ok(())
    }

    /// Drop the cached product list.
    pub async fn invalidate_products(&self) {
        self.inner.cache.invalidate(&CacheKey::Products).await;
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// List all orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        let url = self.endpoint(&["orders"])?;
        self.send(self.request(Method::GET, url)).await
    }

    /// Submit a new order. Returns the order as stored, with its server ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, order), fields(items = order.items.len(), total = %order.total_price))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        let url = self.endpoint(&["orders"])?;
        let created: Order = self
            .send(self.request(Method::POST, url).json(order))
            .await?;
        debug!(order_id = %created.id, "Order created");
        Ok(created)
    }

    /// Change an order's status.
    ///
    /// # Errors
    ///
    /// Returns an error if the order does not exist or the request fails.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<(), ApiError> {
        #[derive(serde::Serialize)]
        struct StatusUpdate {
            status: OrderStatus,
        }

        let url = self.endpoint(&["orders", id.as_str()])?;
        self.send_raw(self.request(Method::PATCH, url).json(&StatusUpdate { status }))
            .await?;
        Ok(())
    }

    // =========================================================================
    // Auth Methods
    // =========================================================================

    /// Log in with phone and password.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for bad credentials, or another
    /// error if the request fails.
    #[instrument(skip(self, password), fields(phone = %phone))]
    pub async fn login(
        &self,
        phone: &PhoneNumber,
        password: &SecretString,
    ) -> Result<AuthResponse, ApiError> {
        #[derive(serde::Serialize)]
        struct LoginRequest<'a> {
            phone: &'a str,
            password: &'a str,
        }

        let url = self.endpoint(&["login"])?;
        let body = LoginRequest {
            phone: phone.as_str(),
            password: password.expose_secret(),
        };
        self.send(self.request(Method::POST, url).json(&body)).await
    }

    /// Register a new customer account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the data.
    #[instrument(skip(self, password), fields(phone = %phone))]
    pub async fn register(
        &self,
        name: &str,
        phone: &PhoneNumber,
        password: &SecretString,
    ) -> Result<AuthResponse, ApiError> {
        #[derive(serde::Serialize)]
        struct RegisterRequest<'a> {
            name: &'a str,
            phone: &'a str,
            password: &'a str,
        }

        let url = self.endpoint(&["register"])?;
        let body = RegisterRequest {
            name,
            phone: phone.as_str(),
            password: password.expose_secret(),
        };
        self.send(self.request(Method::POST, url).json(&body)).await
    }
}

fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ApiConfig::new(Url::parse(base).unwrap())).unwrap()
    }

    #[test]
    fn test_endpoint_appends_segments() {
        let api = client("http://192.168.180.211:3000");
        assert_eq!(
            api.endpoint(&["products"]).unwrap().as_str(),
            "http://192.168.180.211:3000/products"
        );
        assert_eq!(
            api.endpoint(&["orders", "abc123"]).unwrap().as_str(),
            "http://192.168.180.211:3000/orders/abc123"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = client("https://example.com/api/");
        assert_eq!(
            api.endpoint(&["products", "7"]).unwrap().as_str(),
            "https://example.com/api/products/7"
        );
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let api = client("https://example.com");
        assert_eq!(
            api.endpoint(&["products", "../admin"]).unwrap().as_str(),
            "https://example.com/products/..%2Fadmin"
        );
    }

    #[test]
    fn test_is_server_side() {
        assert!(ApiError::Status {
            status: 502,
            message: String::new()
        }
        .is_server_side());
        assert!(!ApiError::Status {
            status: 422,
            message: String::new()
        }
        .is_server_side());
        assert!(!ApiError::NotFound("x".to_string()).is_server_side());
        assert!(ApiError::RateLimited(1).is_server_side());
    }

    #[test]
    fn test_snippet_truncates() {
        let long = "x".repeat(500);
        assert_eq!(snippet(&long).len(), BODY_SNIPPET_CHARS);
        assert_eq!(snippet("short"), "short");
    }
}
