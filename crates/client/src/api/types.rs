//! Request and response bodies for the storefront REST API.

use parfumerie_core::types::product::json_number_option;
use parfumerie_core::{OrderId, OrderStatus, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::CartStore;

/// Shipping and contact details entered at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// One ordered product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: i64,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "json_number_option"
    )]
    pub unit_price: Option<Decimal>,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewOrder {
    pub customer: CustomerDetails,
    pub items: Vec<OrderItem>,
    #[serde(with = "json_number_option")]
    pub total: Option<Decimal>,
}

impl NewOrder {
    /// Snapshot the cart into an order for `customer`.
    #[must_use]
    pub fn from_cart(cart: &CartStore, customer: CustomerDetails) -> Self {
        let items = cart
            .items()
            .iter()
            .map(|line| OrderItem {
                product_id: line.product.id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect();

        Self {
            customer,
            items,
            total: Some(cart.total()),
        }
    }
}

/// An order as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, with = "json_number_option")]
    pub total: Option<Decimal>,
    /// Remaining backend fields (customer, items, timestamps).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body of the admin product create/update endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(with = "json_number_option")]
    pub price: Option<Decimal>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusUpdate {
    pub status: OrderStatus,
}
