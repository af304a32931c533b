//! Key-value persistence substrate.
//!
//! Everything the client persists goes through [`Storage`], a pair of
//! [`KeyValueStore`] backends addressed by [`Scope`]:
//!
//! - [`Scope::Durable`] survives restarts (cart, credentials, preferences)
//! - [`Scope::Session`] lives for one session (CSRF token, rate-limit windows)
//!
//! # Key Layout
//!
//! ```text
//! durable  cart               → JSON array of cart lines
//! durable  authToken          → obfuscated string
//! durable  username           → obfuscated string
//! durable  darkMode           → "true" | "false"
//! session  csrf_token         → hex string
//! session  rate_limit_{key}   → JSON array of millisecond timestamps
//! ```
//!
//! Writes are whole-value overwrites of a single key. Two handles sharing a
//! backend see last-write-wins.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be serialized or parsed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A writer panicked while holding the store lock.
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Lifetime of a stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Survives process restarts.
    Durable,
    /// Cleared when the session ends.
    Session,
}

/// A string-keyed, string-valued store.
///
/// `delete` is idempotent: removing an absent key is not an error.
pub trait KeyValueStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Durable and session backends behind one handle.
///
/// Cloning is cheap and clones share the same backends.
#[derive(Clone)]
pub struct Storage {
    durable: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
}

impl Storage {
    /// Combine a durable and a session backend.
    #[must_use]
    pub fn new(durable: Arc<dyn KeyValueStore>, session: Arc<dyn KeyValueStore>) -> Self {
        Self { durable, session }
    }

    /// Two fresh in-memory backends.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }

    /// The backend for a scope.
    #[must_use]
    pub fn backend(&self, scope: Scope) -> &dyn KeyValueStore {
        match scope {
            Scope::Durable => self.durable.as_ref(),
            Scope::Session => self.session.as_ref(),
        }
    }

    /// Read `key` in `scope`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub fn get(&self, scope: Scope, key: &str) -> Result<Option<String>, StorageError> {
        self.backend(scope).get(key)
    }

    /// Overwrite `key` in `scope`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub fn set(&self, scope: Scope, key: &str, value: &str) -> Result<(), StorageError> {
        self.backend(scope).set(key, value)
    }

    /// Remove `key` from `scope`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub fn delete(&self, scope: Scope, key: &str) -> Result<(), StorageError> {
        self.backend(scope).delete(key)
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}
