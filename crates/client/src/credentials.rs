//! Admin credentials at rest.
//!
//! The auth token and username live in durable storage and go through the
//! same obfuscation as every other sensitive value, so nothing sensitive sits
//! in storage as plain text. The token is handed out as a [`SecretString`].

use secrecy::{ExposeSecret, SecretString};

use crate::secure_storage::SecureStorage;
use crate::storage::StorageError;

/// Durable storage key for the bearer token.
pub const AUTH_TOKEN_KEY: &str = "authToken";

/// Durable storage key for the logged-in username.
pub const USERNAME_KEY: &str = "username";

/// Stored admin session.
#[derive(Debug, Clone)]
pub struct Credentials {
    secure: SecureStorage,
}

impl Credentials {
    /// `secure` should wrap durable scope.
    #[must_use]
    pub const fn new(secure: SecureStorage) -> Self {
        Self { secure }
    }

    /// Save a freshly issued token.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if either value cannot be written.
    pub fn store(&self, token: &SecretString, username: &str) -> Result<(), StorageError> {
        self.secure.set_str(AUTH_TOKEN_KEY, token.expose_secret())?;
        self.secure.set_str(USERNAME_KEY, username)?;
        tracing::info!(username, "Stored admin credentials");
        Ok(())
    }

    #[must_use]
    pub fn auth_token(&self) -> Option<SecretString> {
        self.secure
            .get_str(AUTH_TOKEN_KEY)
            .filter(|token| !token.is_empty())
            .map(SecretString::from)
    }

    #[must_use]
    pub fn username(&self) -> Option<String> {
        self.secure.get_str(USERNAME_KEY)
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.auth_token().is_some()
    }

    /// Forget the token and username.
    ///
    /// Both deletes are attempted even if the first fails.
    ///
    /// # Errors
    ///
    /// Returns the first `StorageError` encountered.
    pub fn clear(&self) -> Result<(), StorageError> {
        let token = self.secure.remove(AUTH_TOKEN_KEY);
        let username = self.secure.remove(USERNAME_KEY);
        tracing::info!("Cleared admin credentials");
        token.and(username)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::obfuscation::Obfuscator;
    use crate::storage::{Scope, Storage};

    fn credentials(storage: &Storage) -> Credentials {
        Credentials::new(SecureStorage::new(
            storage.clone(),
            Scope::Durable,
            Obfuscator::default(),
        ))
    }

    #[test]
    fn test_store_and_read_back() {
        let storage = Storage::in_memory();
        let creds = credentials(&storage);
        assert!(!creds.is_authenticated());

        creds
            .store(&SecretString::from("tok-abc"), "curator")
            .unwrap();

        assert!(creds.is_authenticated());
        assert_eq!(creds.auth_token().unwrap().expose_secret(), "tok-abc");
        assert_eq!(creds.username().as_deref(), Some("curator"));
    }

    #[test]
    fn test_token_not_plain_at_rest() {
        let storage = Storage::in_memory();
        credentials(&storage)
            .store(&SecretString::from("tok-abc"), "curator")
            .unwrap();

        let raw = storage.get(Scope::Durable, AUTH_TOKEN_KEY).unwrap().unwrap();
        assert!(!raw.contains("tok-abc"));
    }

    #[test]
    fn test_clear() {
        let storage = Storage::in_memory();
        let creds = credentials(&storage);
        creds.store(&SecretString::from("t"), "u").unwrap();
        creds.clear().unwrap();

        assert!(!creds.is_authenticated());
        assert!(creds.username().is_none());
        assert!(storage.get(Scope::Durable, USERNAME_KEY).unwrap().is_none());
    }
}
