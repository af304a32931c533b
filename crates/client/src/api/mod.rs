//! Storefront REST API client.
//!
//! # Endpoints
//!
//! ## Public
//! - `GET /products`, `GET /products/{id}` - catalog
//! - `POST /orders` - checkout (carries the session CSRF token)
//! - `POST /admin/login` - exchanges admin credentials for a bearer token
//!
//! ## Admin (bearer token)
//! - `GET /admin/orders`, `PATCH /admin/orders/{id}`
//! - `POST /admin/products`, `PUT /admin/products/{id}`, `DELETE /admin/products/{id}`
//!
//! # Failure handling
//!
//! Each call is sent once: no retry, no client-side timeout. Failures are
//! logged here and returned to the caller. A `401` from an admin endpoint
//! clears the stored credentials before returning
//! [`ApiError::Unauthorized`]; sending the user back to the login screen is
//! the caller's job.
//!
//! # Example
//!
//! ```rust,ignore
//! let client = ApiClient::new(&config, storage, Arc::new(SystemClock));
//!
//! let products = client.list_products().await?;
//! client.login("curator", &password).await?;
//! let orders = client.admin_orders().await?;
//! ```

mod types;

pub use types::{CustomerDetails, NewOrder, Order, OrderItem, ProductInput};

use std::sync::Arc;

use parfumerie_core::{OrderId, OrderStatus, Product, ProductId};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use crate::clock::Clock;
use crate::config::ClientConfig;
use crate::credentials::Credentials;
use crate::csrf::CsrfTokens;
use crate::obfuscation::Obfuscator;
use crate::rate_limit::{RateLimitConfig, RateLimiter};
use crate::secure_storage::SecureStorage;
use crate::storage::{Scope, Storage, StorageError};
use types::{LoginRequest, LoginResponse, StatusUpdate};

/// Rate-limit key for admin login attempts.
const LOGIN_RATE_LIMIT_KEY: &str = "admin_login";

/// Longest response body excerpt kept in errors and logs.
const MAX_ERROR_BODY: usize = 500;

/// Errors that can occur when calling the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// The admin token was rejected; stored credentials have been cleared.
    #[error("Unauthorized")]
    Unauthorized,

    /// An admin endpoint was called with no stored token.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Too many local login attempts.
    #[error("Rate limited, try again later")]
    RateLimited,

    /// The response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Building the endpoint URL failed.
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    /// Reading or writing local state failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and storage.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    csrf: CsrfTokens,
    limiter: RateLimiter,
    login_limit: RateLimitConfig,
}

impl ApiClient {
    /// Create a client whose local state lives in `storage`.
    #[must_use]
    pub fn new(config: &ClientConfig, storage: Storage, clock: Arc<dyn Clock>) -> Self {
        let secure = SecureStorage::new(
            storage.clone(),
            Scope::Durable,
            Obfuscator::new(clock.clone()),
        );

        Self {
            inner: Arc::new(ApiClientInner {
                http: reqwest::Client::new(),
                base_url: config.api_url.clone(),
                credentials: Credentials::new(secure),
                csrf: CsrfTokens::new(storage.clone()),
                limiter: RateLimiter::new(storage, clock),
                login_limit: config.login_rate_limit,
            }),
        }
    }

    /// The stored admin session.
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.inner.credentials
    }

    // -------------------------------------------------------------------------
    // Public endpoints
    // -------------------------------------------------------------------------

    /// Fetch the catalog.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body is not a product list.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        let request = self.request(Method::GET, "products")?;
        self.send_json(request).await
    }

    /// Fetch one product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the product does not exist.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let request = self.request(Method::GET, &format!("products/{id}"))?;
        self.send_json(request).await
    }

    /// Place an order. The session CSRF token is added to the body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or is rejected.
    #[instrument(skip(self, order), fields(items = order.items.len()))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        let mut body = serde_json::to_value(order)?;
        self.inner.csrf.attach_token(&mut body)?;

        let request = self.request(Method::POST, "orders")?.json(&body);
        let created: Order = self.send_json(request).await?;
        tracing::info!(order_id = %created.id, "Order placed");
        Ok(created)
    }

    /// Log in as an admin and store the issued token.
    ///
    /// Attempts are limited locally by the configured login rate limit; a
    /// successful login resets the count.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RateLimited` when over the local limit, or the
    /// request's `ApiError` (a wrong password is `ApiError::Status` with 401).
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), ApiError> {
        if !self
            .inner
            .limiter
            .check(LOGIN_RATE_LIMIT_KEY, self.inner.login_limit)
        {
            return Err(log_failure(ApiError::RateLimited));
        }

        let body = LoginRequest {
            username,
            password: password.expose_secret(),
        };
        let request = self.request(Method::POST, "admin/login")?.json(&body);
        let response: LoginResponse = self.send_json(request).await?;

        self.inner
            .credentials
            .store(&SecretString::from(response.token), username)?;
        if let Err(e) = self.inner.limiter.clear(LOGIN_RATE_LIMIT_KEY) {
            tracing::warn!(error = %e, "Failed to reset login rate limit");
        }
        Ok(())
    }

    /// Forget the stored admin session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Storage` if the credentials cannot be removed.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.inner.credentials.clear()?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Admin endpoints
    // -------------------------------------------------------------------------

    /// List all orders.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if not logged in, the token is rejected, or the request fails.
    #[instrument(skip(self))]
    pub async fn admin_orders(&self) -> Result<Vec<Order>, ApiError> {
        let request = self.admin_request(Method::GET, "admin/orders")?;
        self.send_admin_json(request).await
    }

    /// Move an order to `status`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if not logged in, the token is rejected, or the request fails.
    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        let request = self
            .admin_request(Method::PATCH, &format!("admin/orders/{id}"))?
            .json(&StatusUpdate { status });
        self.send_admin_json(request).await
    }

    /// Add a catalog product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if not logged in, the token is rejected, or the request fails.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: &ProductInput) -> Result<Product, ApiError> {
        let request = self
            .admin_request(Method::POST, "admin/products")?
            .json(product);
        self.send_admin_json(request).await
    }

    /// Replace a catalog product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if not logged in, the token is rejected, or the request fails.
    #[instrument(skip(self, product))]
    pub async fn update_product(
        &self,
        id: ProductId,
        product: &ProductInput,
    ) -> Result<Product, ApiError> {
        let request = self
            .admin_request(Method::PUT, &format!("admin/products/{id}"))?
            .json(product);
        self.send_admin_json(request).await
    }

    /// Remove a catalog product.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if not logged in, the token is rejected, or the request fails.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        let request = self.admin_request(Method::DELETE, &format!("admin/products/{id}"))?;
        self.send_admin(request).await.map(drop)
    }

    // -------------------------------------------------------------------------
    // Plumbing
    // -------------------------------------------------------------------------

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.inner.base_url.join(path).map_err(log_failure)?;
        Ok(self.inner.http.request(method, url))
    }

    fn admin_request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let Some(token) = self.inner.credentials.auth_token() else {
            return Err(log_failure(ApiError::NotAuthenticated));
        };
        Ok(self
            .request(method, path)?
            .bearer_auth(token.expose_secret()))
    }

    /// Send once and map non-success statuses to errors.
    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = request.send().await.map_err(log_failure)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Body text is best-effort context for the error.
        let body: String = response
            .text()
            .await
            .unwrap_or_default()
            .chars()
            .take(MAX_ERROR_BODY)
            .collect();
        Err(log_failure(ApiError::Status { status, body }))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        parse_body(response).await
    }

    /// Like [`ApiClient::send`], clearing credentials on `401`.
    async fn send_admin(&self, request: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        match self.send(request).await {
            Err(ApiError::Status { status, .. }) if status == StatusCode::UNAUTHORIZED => {
                tracing::warn!("Admin token rejected; clearing stored credentials");
                if let Err(e) = self.inner.credentials.clear() {
                    tracing::error!(error = %e, "Failed to clear credentials");
                }
                Err(ApiError::Unauthorized)
            }
            other => other,
        }
    }

    async fn send_admin_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send_admin(request).await?;
        parse_body(response).await
    }
}

async fn parse_body<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let text = response.text().await.map_err(log_failure)?;
    serde_json::from_str(&text).map_err(|e| log_failure(ApiError::from(e)))
}

/// Log an API failure at the boundary where it is raised.
fn log_failure<E: Into<ApiError>>(error: E) -> ApiError {
    let error = error.into();
    tracing::error!(error = %error, "API request failed");
    error
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use rust_decimal::Decimal;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::clock::ManualClock;
    use crate::csrf::CSRF_FIELD;

    fn config(server: &MockServer, login_limit: RateLimitConfig) -> ClientConfig {
        ClientConfig {
            api_url: Url::parse(&format!("{}/api/", server.uri())).unwrap(),
            data_dir: ".".into(),
            currency: parfumerie_core::CurrencyCode::USD,
            login_rate_limit: login_limit,
            sentry_dsn: None,
        }
    }

    fn client(server: &MockServer, storage: &Storage) -> ApiClient {
        ApiClient::new(
            &config(server, RateLimitConfig::login()),
            storage.clone(),
            Arc::new(ManualClock::new(1_000_000)),
        )
    }

    async fn logged_in(server: &MockServer, storage: &Storage) -> ApiClient {
        let client = client(server, storage);
        client
            .credentials()
            .store(&SecretString::from("tok-1"), "curator")
            .unwrap();
        client
    }

    #[tokio::test]
    async fn test_list_products() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "name": "Oud", "price": 120},
                {"id": 2, "name": "Neroli", "price": 45.5}
            ])))
            .mount(&server)
            .await;

        let products = client(&server, &Storage::in_memory())
            .list_products()
            .await
            .unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].price, Some(Decimal::new(455, 1)));
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products/9"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no such product"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server, &Storage::in_memory())
            .get_product(ProductId::new(9))
            .await
            .unwrap_err();
        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(body, "no such product");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_order_attaches_csrf_token() {
        let server = MockServer::start().await;
        let storage = Storage::in_memory();
        let token = CsrfTokens::new(storage.clone()).get_or_create_token().unwrap();

        Mock::given(method("POST"))
            .and(path("/api/orders"))
            .and(body_partial_json(serde_json::json!({ CSRF_FIELD: token })))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(serde_json::json!({"id": 77, "status": "pending"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let order = NewOrder {
            customer: CustomerDetails {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                address: "1 Rue de la Paix".to_string(),
                phone: None,
            },
            items: Vec::new(),
            total: Some(Decimal::ZERO),
        };
        let created = client(&server, &storage).create_order(&order).await.unwrap();
        assert_eq!(created.id, OrderId::new(77));
        assert_eq!(created.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_login_stores_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/login"))
            .and(body_partial_json(serde_json::json!({"username": "curator"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "tok-9"})),
            )
            .mount(&server)
            .await;

        let client = client(&server, &Storage::in_memory());
        client
            .login("curator", &SecretString::from("hunter2"))
            .await
            .unwrap();

        let creds = client.credentials();
        assert_eq!(creds.auth_token().unwrap().expose_secret(), "tok-9");
        assert_eq!(creds.username().as_deref(), Some("curator"));
    }

    #[tokio::test]
    async fn test_login_is_rate_limited_locally() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/login"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;

        let client = ApiClient::new(
            &config(&server, RateLimitConfig::new(2, Duration::from_secs(60))),
            Storage::in_memory(),
            Arc::new(ManualClock::new(0)),
        );
        let password = SecretString::from("wrong");

        for _ in 0..2 {
            let err = client.login("curator", &password).await.unwrap_err();
            assert!(matches!(err, ApiError::Status { status, .. } if status == StatusCode::UNAUTHORIZED));
        }
        let err = client.login("curator", &password).await.unwrap_err();
        assert!(matches!(err, ApiError::RateLimited));
    }

    #[tokio::test]
    async fn test_admin_call_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/orders"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "status": "processing", "total": 90}
            ])))
            .mount(&server)
            .await;

        let storage = Storage::in_memory();
        let orders = logged_in(&server, &storage)
            .await
            .admin_orders()
            .await
            .unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, OrderStatus::Processing);
    }

    #[tokio::test]
    async fn test_admin_unauthorized_clears_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/admin/orders/5"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let storage = Storage::in_memory();
        let client = logged_in(&server, &storage).await;
        let err = client
            .update_order_status(OrderId::new(5), OrderStatus::Shipped)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Unauthorized));
        assert!(!client.credentials().is_authenticated());
    }

    #[tokio::test]
    async fn test_admin_call_without_token_never_sends() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server, &Storage::in_memory())
            .delete_product(ProductId::new(3))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_delete_product() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/admin/products/3"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let storage = Storage::in_memory();
        logged_in(&server, &storage)
            .await
            .delete_product(ProductId::new(3))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server, &Storage::in_memory())
            .list_products()
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { status, .. } if status == StatusCode::SERVICE_UNAVAILABLE));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client(&server, &Storage::in_memory())
            .list_products()
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }
}
