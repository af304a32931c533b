//! CSRF token lifecycle.
//!
//! One token per session: 32 random bytes, hex-encoded, created on first use
//! and kept in session scope until the session ends. Tokens are never rotated
//! automatically.

use rand::RngCore;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::security::constant_time_eq;
use crate::storage::{Scope, Storage, StorageError};

/// Session storage key for the token.
pub const CSRF_TOKEN_KEY: &str = "csrf_token";

/// Field name the token is sent under.
pub const CSRF_FIELD: &str = "csrf_token";

const TOKEN_BYTES: usize = 32;

/// A request payload that can carry the CSRF token.
pub trait CsrfCarrier {
    fn insert_csrf_token(&mut self, token: String);
}

impl CsrfCarrier for Map<String, Value> {
    fn insert_csrf_token(&mut self, token: String) {
        self.insert(CSRF_FIELD.to_string(), Value::String(token));
    }
}

impl CsrfCarrier for Value {
    /// Objects gain the field. Any other JSON value cannot hold a named
    /// field and is left untouched.
    fn insert_csrf_token(&mut self, token: String) {
        if let Some(object) = self.as_object_mut() {
            object.insert_csrf_token(token);
        } else {
            tracing::warn!("CSRF token not attached: payload is not a JSON object");
        }
    }
}

/// URL-encoded form fields, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormData(Vec<(String, String)>);

impl FormData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Repeated names are kept, as in a browser form.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.push((name.into(), value.into()));
        self
    }

    /// First value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.0
    }
}

impl CsrfCarrier for FormData {
    fn insert_csrf_token(&mut self, token: String) {
        self.append(CSRF_FIELD, token);
    }
}

/// Issues and checks the session's CSRF token.
#[derive(Debug, Clone)]
pub struct CsrfTokens {
    storage: Storage,
}

impl CsrfTokens {
    #[must_use]
    pub const fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// The session token, generated and stored on first call.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if session storage cannot be read or written.
    pub fn get_or_create_token(&self) -> Result<String, StorageError> {
        if let Some(token) = self
            .storage
            .get(Scope::Session, CSRF_TOKEN_KEY)?
            .filter(|t| !t.is_empty())
        {
            return Ok(token);
        }

        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);

        self.storage.set(Scope::Session, CSRF_TOKEN_KEY, &token)?;
        tracing::debug!("Issued new CSRF token");
        Ok(token)
    }

    /// Add the token to `payload` under [`CSRF_FIELD`].
    ///
    /// The payload is modified in place and handed back for chaining.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the token cannot be obtained.
    pub fn attach_token<'a, P: CsrfCarrier + ?Sized>(
        &self,
        payload: &'a mut P,
    ) -> Result<&'a mut P, StorageError> {
        let token = self.get_or_create_token()?;
        payload.insert_csrf_token(token);
        Ok(payload)
    }

    /// Check `candidate` against the session token in constant time.
    ///
    /// Returns `false` when no token has been issued.
    #[must_use]
    pub fn verify(&self, candidate: &str) -> bool {
        match self.storage.get(Scope::Session, CSRF_TOKEN_KEY) {
            Ok(Some(token)) => constant_time_eq(&token, candidate),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read CSRF token");
                false
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_64_hex_chars() {
        let csrf = CsrfTokens::new(Storage::in_memory());
        let token = csrf.get_or_create_token().unwrap();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_token_is_stable_within_session() {
        let storage = Storage::in_memory();
        let csrf = CsrfTokens::new(storage.clone());
        let first = csrf.get_or_create_token().unwrap();
        let second = CsrfTokens::new(storage.clone()).get_or_create_token().unwrap();
        assert_eq!(first, second);
        assert_eq!(
            storage.get(Scope::Session, CSRF_TOKEN_KEY).unwrap(),
            Some(first)
        );
    }

    #[test]
    fn test_new_session_gets_new_token() {
        let a = CsrfTokens::new(Storage::in_memory()).get_or_create_token().unwrap();
        let b = CsrfTokens::new(Storage::in_memory()).get_or_create_token().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_attach_to_json_object_mutates_in_place() {
        let csrf = CsrfTokens::new(Storage::in_memory());
        let mut payload = serde_json::json!({"items": []});
        csrf.attach_token(&mut payload).unwrap();

        let token = csrf.get_or_create_token().unwrap();
        assert_eq!(payload[CSRF_FIELD], Value::String(token));
        assert!(payload["items"].is_array());
    }

    #[test]
    fn test_attach_to_non_object_is_ignored() {
        let csrf = CsrfTokens::new(Storage::in_memory());
        let mut payload = serde_json::json!([1, 2]);
        csrf.attach_token(&mut payload).unwrap();
        assert_eq!(payload, serde_json::json!([1, 2]));
    }

    #[test]
    fn test_attach_to_form() {
        let csrf = CsrfTokens::new(Storage::in_memory());
        let mut form = FormData::new();
        form.append("email", "a@b.c");
        let returned = csrf.attach_token(&mut form).unwrap();
        returned.append("name", "Ada");

        assert_eq!(form.fields().len(), 3);
        assert_eq!(form.get(CSRF_FIELD).map(str::len), Some(64));
    }

    #[test]
    fn test_verify() {
        let csrf = CsrfTokens::new(Storage::in_memory());
        assert!(!csrf.verify("anything"));

        let token = csrf.get_or_create_token().unwrap();
        assert!(csrf.verify(&token));
        assert!(!csrf.verify(&token[1..]));
        assert!(!csrf.verify(&"0".repeat(64)));
    }
}
