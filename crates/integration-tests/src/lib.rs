//! Integration tests for Parfumerie.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p parfumerie-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - Cart state across restarts of file-backed storage
//! - `secure_storage` - Obfuscation, credentials, CSRF and rate limiting on disk
//! - `storefront_api` - Checkout and admin flows against a mock backend
//!
//! No external services are needed: storage lives in a temporary directory
//! and the backend is a `wiremock` server.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parfumerie_client::api::ApiClient;
use parfumerie_client::clock::{Clock, ManualClock};
use parfumerie_client::config::ClientConfig;
use parfumerie_client::rate_limit::RateLimitConfig;
use parfumerie_client::storage::{FileStore, StorageError};
use parfumerie_client::Storage;
use parfumerie_core::{CurrencyCode, Product, ProductId};
use rust_decimal::Decimal;
use tempfile::TempDir;
use url::Url;

/// Fixed start time for the manual clock (2026-10-15T00:00:00Z).
pub const START_MILLIS: i64 = 1_792_022_400_000;

/// A temporary data directory plus a controllable clock.
///
/// Each call to [`TestEnv::open_storage`] reads the store files afresh, so
/// opening twice models a process restart.
pub struct TestEnv {
    pub dir: TempDir,
    pub clock: Arc<ManualClock>,
}

impl TestEnv {
    /// # Errors
    ///
    /// Returns an I/O error if the temporary directory cannot be created.
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
            clock: Arc::new(ManualClock::new(START_MILLIS)),
        })
    }

    pub fn durable_path(&self) -> PathBuf {
        self.dir.path().join("storage.json")
    }

    pub fn session_path(&self) -> PathBuf {
        self.dir.path().join("session.json")
    }

    /// Open file-backed durable and session stores.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if a store file cannot be read.
    pub fn open_storage(&self) -> Result<Storage, StorageError> {
        let durable = FileStore::open(self.durable_path())?;
        let session = FileStore::open(self.session_path())?;
        Ok(Storage::new(Arc::new(durable), Arc::new(session)))
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone()
    }

    /// Client configuration pointing at `api_base`, with data in the temp dir.
    ///
    /// # Errors
    ///
    /// Returns a parse error if `api_base` is not a URL.
    pub fn config(
        &self,
        api_base: &str,
        login_rate_limit: RateLimitConfig,
    ) -> Result<ClientConfig, url::ParseError> {
        Ok(ClientConfig {
            api_url: Url::parse(&format!("{}/api/", api_base.trim_end_matches('/')))?,
            data_dir: self.dir.path().to_path_buf(),
            currency: CurrencyCode::USD,
            login_rate_limit,
            sentry_dsn: None,
        })
    }

    /// API client over freshly opened storage.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be opened or the URL is invalid.
    pub fn api(
        &self,
        api_base: &str,
        login_rate_limit: RateLimitConfig,
    ) -> Result<(ApiClient, Storage), Box<dyn std::error::Error>> {
        let storage = self.open_storage()?;
        let config = self.config(api_base, login_rate_limit)?;
        Ok((
            ApiClient::new(&config, storage.clone(), self.clock()),
            storage,
        ))
    }

    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }
}

/// A product priced in whole currency units.
pub fn product(id: i64, name: &str, price: Option<i64>) -> Product {
    Product::new(ProductId::new(id), name, price.map(Decimal::from))
}
