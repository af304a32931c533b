//! Subcommand implementations.
//!
//! Every command runs against a [`Context`] opened from the data directory:
//! `storage.json` holds durable state (cart, credentials, preferences) and
//! `session.json` holds session state (CSRF token, login attempts).

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod order;
pub mod prefs;

use std::path::Path;
use std::sync::Arc;

use parfumerie_client::api::ApiClient;
use parfumerie_client::clock::{Clock, SystemClock};
use parfumerie_client::config::ClientConfig;
use parfumerie_client::format::format_price;
use parfumerie_client::preferences::Preferences;
use parfumerie_client::storage::{FileStore, StorageError};
use parfumerie_client::{CartStore, Storage};
use rust_decimal::Decimal;

/// Name of the session store file inside the data directory.
const SESSION_STORE_FILE: &str = "session.json";

/// Everything a command needs: configuration, storage and the API client.
pub struct Context {
    pub config: ClientConfig,
    pub storage: Storage,
    pub api: ApiClient,
}

impl Context {
    /// Open the file-backed stores under the configured data directory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if a store file cannot be created.
    pub fn open(config: ClientConfig) -> Result<Self, StorageError> {
        let storage = open_storage(&config.durable_store_path(), &config.data_dir)?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let api = ApiClient::new(&config, storage.clone(), clock);

        tracing::debug!(data_dir = %config.data_dir.display(), "Opened local storage");

        Ok(Self {
            config,
            storage,
            api,
        })
    }

    /// The persisted cart.
    pub fn cart(&self) -> CartStore {
        CartStore::load(self.storage.clone())
    }

    pub fn preferences(&self) -> Preferences {
        Preferences::new(self.storage.clone())
    }

    /// Format `amount` in the configured currency.
    pub fn price(&self, amount: Decimal) -> String {
        format_price(amount, self.config.currency)
    }

    /// Format an optional price, `-` when absent.
    pub fn price_or_dash(&self, amount: Option<Decimal>) -> String {
        amount.map_or_else(|| "-".to_string(), |amount| self.price(amount))
    }
}

fn open_storage(durable_path: &Path, data_dir: &Path) -> Result<Storage, StorageError> {
    let durable = FileStore::open(durable_path)?;
    let session = FileStore::open(data_dir.join(SESSION_STORE_FILE))?;
    Ok(Storage::new(Arc::new(durable), Arc::new(session)))
}
