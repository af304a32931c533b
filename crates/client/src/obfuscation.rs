//! Reversible obfuscation for values at rest.
//!
//! This is **not** encryption. It keeps stored values from being readable at
//! a glance in a storage inspector, nothing more: anyone with this code can
//! reverse it. Use it for values that are merely sensitive to casual viewing.
//!
//! # Format
//!
//! ```text
//! salt    = "pf_" + base36(now_ms)
//! payload = reverse(base64(salt + ":" + plaintext)) + "~pf"
//! ```
//!
//! The salt only varies the output between writes; decoding ignores it.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;

use crate::clock::{Clock, SystemClock};
use crate::fallback;

const SALT_PREFIX: &str = "pf_";
const SEPARATOR: char = ':';
const SUFFIX: &str = "~pf";

/// Why an opaque value could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("missing suffix marker")]
    MissingMarker,
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("decoded bytes are not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("missing salt separator")]
    MissingSeparator,
}

/// Encodes and decodes obfuscated values.
#[derive(Clone)]
pub struct Obfuscator {
    clock: Arc<dyn Clock>,
}

impl Default for Obfuscator {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for Obfuscator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Obfuscator").finish_non_exhaustive()
    }
}

impl Obfuscator {
    /// An obfuscator whose salts come from `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Obfuscate `plaintext`.
    #[must_use]
    pub fn encode(&self, plaintext: &str) -> String {
        let salt = format!("{SALT_PREFIX}{}", to_base36(self.clock.now_millis()));
        let encoded = STANDARD.encode(format!("{salt}{SEPARATOR}{plaintext}"));

        let mut out: String = encoded.chars().rev().collect();
        out.push_str(SUFFIX);
        out
    }

    /// Reverse [`Obfuscator::encode`].
    ///
    /// Input that was not produced by `encode` is returned unchanged.
    #[must_use]
    pub fn decode(&self, opaque: &str) -> String {
        fallback::or_fallback(try_decode(opaque), opaque.to_string(), "obfuscation.decode")
    }
}

/// Strict decode that reports why the input is not an obfuscated value.
///
/// # Errors
///
/// Returns `DecodeError` if any stage of the reverse transform fails.
pub fn try_decode(opaque: &str) -> Result<String, DecodeError> {
    let body = opaque.strip_suffix(SUFFIX).ok_or(DecodeError::MissingMarker)?;
    let unreversed: String = body.chars().rev().collect();
    let joined = String::from_utf8(STANDARD.decode(unreversed)?)?;

    // Everything after the first separator is plaintext, separators included.
    let (_salt, plaintext) = joined
        .split_once(SEPARATOR)
        .ok_or(DecodeError::MissingSeparator)?;
    Ok(plaintext.to_string())
}

fn to_base36(value: i64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut n = value.unsigned_abs();
    let mut digits = Vec::new();
    loop {
        let digit = usize::try_from(n % 36).unwrap_or_default();
        digits.push(char::from(DIGITS.get(digit).copied().unwrap_or(b'0')));
        n /= 36;
        if n == 0 {
            break;
        }
    }
    if value < 0 {
        digits.push('-');
    }
    digits.iter().rev().collect()
}
