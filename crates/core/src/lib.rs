//! Parfumerie Core - Shared types library.
//!
//! This crate provides the types shared by the Parfumerie components:
//! - `client` - Cart, storage and REST API client library
//! - `cli` - Command-line front end over the client
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, catalog products and order statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
