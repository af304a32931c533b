//! Catalog product as returned by the storefront API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProductId;

/// A catalog product.
///
/// Only `id` and `price` carry meaning for the cart. Every other field the
/// backend sends (brand, notes, image URLs, stock) is kept in `extra` so a
/// product survives a storage round trip unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Stable catalog identifier.
    pub id: ProductId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Current unit price, if the backend provided one.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "json_number_option"
    )]
    pub price: Option<Decimal>,
    /// Remaining backend fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Product {
    /// Create a product with no extra fields.
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>, price: Option<Decimal>) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            extra: serde_json::Map::new(),
        }
    }
}

/// Serde adapter for `Option<Decimal>` stored as a plain JSON number.
///
/// The backend and the persisted cart both use numbers (`49.99`), while
/// `rust_decimal`'s default representation is a string. Strings are still
/// accepted on input.
///
/// A value that an `f64` cannot hold exactly (more than about 15 significant
/// digits, or beyond the `i64` range) is written as a decimal string so the
/// stored snapshot reads back unchanged.
pub mod json_number_option {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use rust_decimal::prelude::ToPrimitive;
    use serde::{Deserialize, Deserializer, Serializer, de};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Int(i64),
        Float(f64),
        Text(String),
    }

    /// Serialize as a JSON number (or `null`).
    ///
    /// # Errors
    ///
    /// Returns the serializer's error if the value cannot be written.
    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) if d.fract().is_zero() => match d.to_i64() {
                Some(i) => serializer.serialize_i64(i),
                None => serialize_fraction(*d, serializer),
            },
            Some(d) => serialize_fraction(*d, serializer),
            None => serializer.serialize_none(),
        }
    }

    fn serialize_fraction<S: Serializer>(d: Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        match exact_f64(d) {
            Some(f) => serializer.serialize_f64(f),
            None => serializer.serialize_str(&d.normalize().to_string()),
        }
    }

    /// `d` as an `f64`, if reading that float back yields `d` again.
    fn exact_f64(d: Decimal) -> Option<f64> {
        let f = d.to_f64()?;
        let back = Decimal::from_str(&f.to_string()).ok()?;
        (back == d).then_some(f)
    }

    /// Deserialize from a JSON number, numeric string, or `null`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is neither numeric nor `null`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Decimal>, D::Error> {
        let raw = Option::<NumberOrString>::deserialize(deserializer)?;
        raw.map(|value| match value {
            NumberOrString::Int(i) => Ok(Decimal::from(i)),
            // Shortest round-trip formatting keeps 49.99 as 49.99.
            NumberOrString::Float(f) => Decimal::from_str(&f.to_string()).map_err(de::Error::custom),
            NumberOrString::Text(s) => Decimal::from_str(s.trim()).map_err(de::Error::custom),
        })
        .transpose()
    }
}
