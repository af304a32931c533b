//! Display preferences.

use crate::storage::{Scope, Storage, StorageError};

/// Durable storage key for the dark-mode flag.
pub const DARK_MODE_KEY: &str = "darkMode";

/// User display preferences, stored in plain text.
#[derive(Debug, Clone)]
pub struct Preferences {
    storage: Storage,
}

impl Preferences {
    #[must_use]
    pub const fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Whether dark mode is on. Absent, unreadable or unrecognised values
    /// read as `false`.
    #[must_use]
    pub fn dark_mode(&self) -> bool {
        match self.storage.get(Scope::Durable, DARK_MODE_KEY) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read dark mode preference");
                false
            }
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub fn set_dark_mode(&self, enabled: bool) -> Result<(), StorageError> {
        let value = if enabled { "true" } else { "false" };
        self.storage.set(Scope::Durable, DARK_MODE_KEY, value)
    }

    /// Flip dark mode and return the new value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub fn toggle_dark_mode(&self) -> Result<bool, StorageError> {
        let enabled = !self.dark_mode();
        self.set_dark_mode(enabled)?;
        Ok(enabled)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_off() {
        let prefs = Preferences::new(Storage::in_memory());
        assert!(!prefs.dark_mode());
    }

    #[test]
    fn test_toggle_round_trip() {
        let storage = Storage::in_memory();
        let prefs = Preferences::new(storage.clone());

        assert!(prefs.toggle_dark_mode().unwrap());
        assert_eq!(
            storage.get(Scope::Durable, DARK_MODE_KEY).unwrap().as_deref(),
            Some("true")
        );
        assert!(!prefs.toggle_dark_mode().unwrap());
        assert_eq!(
            storage.get(Scope::Durable, DARK_MODE_KEY).unwrap().as_deref(),
            Some("false")
        );
    }

    #[test]
    fn test_garbage_reads_as_off() {
        let storage = Storage::in_memory();
        storage.set(Scope::Durable, DARK_MODE_KEY, "yes").unwrap();
        assert!(!Preferences::new(storage).dark_mode());
    }
}
