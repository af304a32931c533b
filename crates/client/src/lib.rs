//! Parfumerie client library.
//!
//! Client-side state for the Parfumerie storefront:
//!
//! - [`cart`] - the shopping cart, persisted after every change
//! - [`secure_storage`] / [`obfuscation`] - reversible obfuscation of stored values
//! - [`csrf`] - per-session CSRF tokens
//! - [`rate_limit`] - sliding-window attempt limiting
//! - [`credentials`] / [`preferences`] - admin session and display settings
//! - [`api`] - the storefront REST API
//!
//! # Architecture
//!
//! All state lives in a [`storage::Storage`]: a durable and a session
//! [`storage::KeyValueStore`]. The cart and the secure-storage utilities never
//! call each other; they only share that substrate. Everything except the API
//! client is synchronous.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod clock;
pub mod config;
pub mod credentials;
pub mod csrf;
pub mod error;
pub mod fallback;
pub mod format;
pub mod obfuscation;
pub mod preferences;
pub mod rate_limit;
pub mod sanitize;
pub mod secure_storage;
pub mod security;
pub mod storage;

pub use cart::{CartLine, CartStore};
pub use error::{ClientError, Result};
pub use storage::{Scope, Storage};
