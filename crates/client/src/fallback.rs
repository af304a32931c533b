//! The "attempt, log, fall back" combinator.
//!
//! Cart loading, value decoding and the rate-limit read all degrade to a
//! default on failure instead of surfacing an error. They share these helpers
//! so the warning looks the same everywhere.

use std::fmt::Display;

/// Return the `Ok` value, or log the error under `context` and return `fallback`.
pub fn or_fallback<T, E: Display>(result: Result<T, E>, fallback: T, context: &str) -> T {
    match result {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(context, error = %error, "falling back to default value");
            fallback
        }
    }
}

/// Like [`or_fallback`] with `T::default()` as the fallback.
pub fn or_default<T: Default, E: Display>(result: Result<T, E>, context: &str) -> T {
    or_fallback(result, T::default(), context)
}

/// Like [`or_fallback`], discarding the value into an `Option`.
pub fn ok_or_log<T, E: Display>(result: Result<T, E>, context: &str) -> Option<T> {
    or_fallback(result.map(Some), None, context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_passes_through() {
        let result: Result<i32, String> = Ok(3);
        assert_eq!(or_fallback(result, 0, "test"), 3);
    }

    #[test]
    fn test_err_returns_fallback() {
        let result: Result<i32, String> = Err("boom".to_string());
        assert_eq!(or_fallback(result, 7, "test"), 7);
    }

    #[test]
    fn test_or_default_and_ok_or_log() {
        let result: Result<Vec<u8>, &str> = Err("bad");
        assert!(or_default(result, "test").is_empty());

        let result: Result<u8, &str> = Err("bad");
        assert_eq!(ok_or_log(result, "test"), None);
    }
}
