//! Obfuscated values over a storage scope.
//!
//! Strings are stored as-is before obfuscation; every other value is stored
//! as its JSON text. Reads never fail: an absent key, an unreadable backend
//! or a value that does not parse all come back as `None`.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::fallback;
use crate::obfuscation::Obfuscator;
use crate::storage::{Scope, Storage, StorageError};

/// Obfuscating wrapper around one storage scope.
#[derive(Debug, Clone)]
pub struct SecureStorage {
    storage: Storage,
    scope: Scope,
    obfuscator: Obfuscator,
}

impl SecureStorage {
    #[must_use]
    pub const fn new(storage: Storage, scope: Scope, obfuscator: Obfuscator) -> Self {
        Self {
            storage,
            scope,
            obfuscator,
        }
    }

    /// Store `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be serialized or written.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let text = match serde_json::to_value(value)? {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        self.set_str(key, &text)
    }

    /// Store a string under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub fn set_str(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let encoded = self.obfuscator.encode(value);
        self.storage.set(self.scope, key, &encoded)
    }

    /// Read and decode the string under `key`.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<String> {
        let raw = fallback::ok_or_log(self.storage.get(self.scope, key), "secure_storage.get")
            .flatten()?;
        Some(self.obfuscator.decode(&raw))
    }

    /// Read, decode and parse the JSON value under `key`.
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let text = self.get_str(key)?;
        fallback::ok_or_log(serde_json::from_str(&text), "secure_storage.parse")
    }

    /// Delete `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.storage.delete(self.scope, key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use super::*;
    use crate::clock::ManualClock;

    fn secure(storage: &Storage) -> SecureStorage {
        SecureStorage::new(
            storage.clone(),
            Scope::Durable,
            Obfuscator::new(Arc::new(ManualClock::new(1_000))),
        )
    }

    #[test]
    fn test_string_round_trip_is_obfuscated_at_rest() {
        let storage = Storage::in_memory();
        let secure = secure(&storage);
        secure.set_str("note", "hello").unwrap();

        let raw = storage.get(Scope::Durable, "note").unwrap().unwrap();
        assert!(!raw.contains("hello"));
        assert_eq!(secure.get_str("note").as_deref(), Some("hello"));
    }

    #[test]
    fn test_structured_round_trip() {
        let storage = Storage::in_memory();
        let secure = secure(&storage);
        let mut prefs = BTreeMap::new();
        prefs.insert("size".to_string(), 50);
        secure.set("prefs", &prefs).unwrap();

        let back: BTreeMap<String, i32> = secure.get("prefs").unwrap();
        assert_eq!(back, prefs);
    }

    #[test]
    fn test_string_values_are_not_json_quoted() {
        let storage = Storage::in_memory();
        let secure = secure(&storage);
        secure.set("name", "Ambre").unwrap();
        assert_eq!(secure.get_str("name").as_deref(), Some("Ambre"));
    }

    #[test]
    fn test_absent_and_unparsable_are_none() {
        let storage = Storage::in_memory();
        let secure = secure(&storage);
        assert!(secure.get_str("missing").is_none());

        secure.set_str("bad", "not json").unwrap();
        assert!(secure.get::<Vec<i32>>("bad").is_none());
    }

    #[test]
    fn test_remove() {
        let storage = Storage::in_memory();
        let secure = secure(&storage);
        secure.set_str("k", "v").unwrap();
        secure.remove("k").unwrap();
        assert!(secure.get_str("k").is_none());
        secure.remove("k").unwrap();
    }
}
