//! Shopping cart persisted in durable storage.
//!
//! [`CartStore`] keeps the cart lines in memory and writes the full snapshot
//! to the `cart` key after every mutation. There are no partial or delta
//! writes: a flush is one `set` of one key.
//!
//! # Invariants
//!
//! - Product ids are unique within the cart; adding a known id merges.
//! - Lines keep insertion order; quantity changes never reorder them.
//! - No line with quantity ≤ 0 is ever stored.
//! - `unit_price` is captured on first add and never refreshed.

use parfumerie_core::types::product::json_number_option;
use parfumerie_core::{Product, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::fallback;
use crate::storage::{Scope, Storage, StorageError};

/// Durable storage key for the cart snapshot.
pub const CART_KEY: &str = "cart";

/// One product, its quantity and the price captured when it was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product: Product,
    pub quantity: i64,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "json_number_option"
    )]
    pub unit_price: Option<Decimal>,
}

impl CartLine {
    /// A new line priced from the product's current price.
    #[must_use]
    pub fn new(product: Product, quantity: i64) -> Self {
        let unit_price = product.price;
        Self {
            product,
            quantity,
            unit_price,
        }
    }

    /// `unit_price × quantity`, with a missing price counted as zero.
    ///
    /// Saturates at the `Decimal` bounds instead of overflowing.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price
            .unwrap_or(Decimal::ZERO)
            .saturating_mul(Decimal::from(self.quantity))
    }
}

/// The authoritative cart, kept in sync with durable storage.
#[derive(Debug)]
pub struct CartStore {
    storage: Storage,
    lines: Vec<CartLine>,
}

impl CartStore {
    /// Restore the cart from storage.
    ///
    /// A missing snapshot, an unreadable backend or a snapshot that fails to
    /// parse all yield an empty cart; the failure is logged, never returned.
    #[must_use]
    pub fn load(storage: Storage) -> Self {
        let mut lines = fallback::or_default(read_snapshot(&storage), "cart.load");
        lines.retain(|line| line.quantity > 0);
        tracing::debug!(lines = lines.len(), "Cart loaded");
        Self { storage, lines }
    }

    /// Add `quantity` of `product`, merging with an existing line.
    ///
    /// The quantity is not range-checked. A merge that leaves the line at
    /// zero or below drops the line, and a new line is only created for a
    /// positive quantity.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written. The
    /// in-memory cart keeps the change either way.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_item(
        &mut self,
        product: Product,
        quantity: i64,
    ) -> Result<&[CartLine], StorageError> {
        let id = product.id;
        if let Some(line) = self.lines.iter_mut().find(|line| line.product.id == id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else if quantity > 0 {
            self.lines.push(CartLine::new(product, quantity));
        }
        self.lines
            .retain(|line| line.product.id != id || line.quantity > 0);

        self.persist()?;
        Ok(&self.lines)
    }

    /// Add a single unit of `product`.
    ///
    /// # Errors
    ///
    /// See [`CartStore::add_item`].
    pub fn add_one(&mut self, product: Product) -> Result<&[CartLine], StorageError> {
        self.add_item(product, 1)
    }

    /// Remove every line for `id`. Persists even when nothing matched.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    #[instrument(skip(self))]
    pub fn remove_item(&mut self, id: ProductId) -> Result<&[CartLine], StorageError> {
        self.lines.retain(|line| line.product.id != id);
        self.persist()?;
        Ok(&self.lines)
    }

    /// Change the quantity of `id` by `delta`.
    ///
    /// A result of zero or below removes the line. An unknown id is a no-op
    /// and writes nothing.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    #[instrument(skip(self))]
    pub fn update_quantity(
        &mut self,
        id: ProductId,
        delta: i64,
    ) -> Result<&[CartLine], StorageError> {
        let Some(line) = self.lines.iter_mut().find(|line| line.product.id == id) else {
            tracing::debug!("Quantity update for product not in cart");
            return Ok(&self.lines);
        };

        line.quantity = line.quantity.saturating_add(delta);
        if line.quantity <= 0 {
            return self.remove_item(id);
        }

        self.persist()?;
        Ok(&self.lines)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    pub fn clear(&mut self) -> Result<&[CartLine], StorageError> {
        self.lines.clear();
        self.persist()?;
        Ok(&self.lines)
    }

    /// Sum of every line total, saturating at the `Decimal` bounds.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .map(CartLine::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Sum of quantities, saturating at the `i64` bounds.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.lines
            .iter()
            .fold(0_i64, |count, line| count.saturating_add(line.quantity))
    }

    #[must_use]
    pub fn items(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Write the current lines over the stored snapshot.
    ///
    /// Mutations call this themselves; it is public so a caller can retry
    /// after a failed write.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if serialization or the write fails.
    pub fn persist(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.lines)?;
        self.storage
            .set(Scope::Durable, CART_KEY, &json)
            .inspect_err(|e| tracing::error!(error = %e, "Failed to persist cart"))
    }
}

fn read_snapshot(storage: &Storage) -> Result<Vec<CartLine>, StorageError> {
    match storage.get(Scope::Durable, CART_KEY)? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(Vec::new()),
    }
}
