//! Crate-level error type.
//!
//! Each module reports failures with its own error enum; [`ClientError`]
//! unifies them for callers that drive several modules, such as the CLI.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Any error the client library can return.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Local storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A storefront API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Input rejected before any work was done.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ClientError {
    /// Whether the user needs to log in (again) to continue.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::Api(ApiError::Unauthorized | ApiError::NotAuthenticated)
        )
    }
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_display() {
        let err = ClientError::InvalidInput("quantity must be a number".to_string());
        assert_eq!(err.to_string(), "Invalid input: quantity must be a number");

        let err = ClientError::from(StorageError::Poisoned);
        assert_eq!(err.to_string(), "Storage error: Storage lock poisoned");
    }

    #[test]
    fn test_requires_login() {
        assert!(ClientError::from(ApiError::Unauthorized).requires_login());
        assert!(ClientError::from(ApiError::NotAuthenticated).requires_login());
        assert!(!ClientError::from(ApiError::RateLimited).requires_login());
        assert!(!ClientError::InvalidInput(String::new()).requires_login());
    }
}
