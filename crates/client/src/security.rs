//! Comparison helpers for secret values.

/// Compare two strings without short-circuiting on the first mismatch.
///
/// Every byte pair is XORed and the results ORed together, so the running
/// time does not depend on where the strings differ.
///
/// Strings of different lengths return `false` immediately. That early exit
/// does reveal whether the lengths match; callers comparing fixed-length
/// tokens (such as CSRF tokens) are unaffected.
#[must_use]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let diff = a
        .bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y));
    diff == 0
}
