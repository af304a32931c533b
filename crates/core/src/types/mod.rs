//! Core types for Parfumerie.
//!
//! This module provides type-safe wrappers for catalog and order concepts.

pub mod id;
pub mod price;
pub mod product;
pub mod status;

pub use id::*;
pub use price::{CurrencyCode, Price};
pub use product::Product;
pub use status::{OrderStatus, ParseStatusError};
