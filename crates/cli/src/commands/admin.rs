//! Admin session and store management commands.
//!
//! # Usage
//!
//! ```bash
//! # Log in; the password is read from PARFUMERIE_ADMIN_PASSWORD or stdin
//! parfumerie admin login ada
//!
//! # Manage orders and products
//! parfumerie admin orders
//! parfumerie admin set-status 12 shipped
//! parfumerie admin create-product -n "Oud Royal" -p 129.00
//! ```
//!
//! # Environment Variables
//!
//! - `PARFUMERIE_ADMIN_PASSWORD` - Password for `login`, skips the prompt

use std::io::BufRead;

use parfumerie_client::api::{Order, ProductInput};
use parfumerie_client::format::format_timestamp_millis;
use parfumerie_client::{ClientError, Result};
use parfumerie_core::{OrderId, OrderStatus, ProductId};
use rust_decimal::Decimal;
use secrecy::SecretString;

use super::Context;

/// Log in as `username` and store the returned token.
pub async fn login(ctx: &Context, username: &str) -> Result<()> {
    let password = read_password()?;
    ctx.api.login(username, &password).await?;
    println!("Logged in as {username}.");
    Ok(())
}

pub fn logout(ctx: &Context) -> Result<()> {
    ctx.api.logout()?;
    println!("Logged out.");
    Ok(())
}

pub fn whoami(ctx: &Context) {
    let credentials = ctx.api.credentials();
    match credentials.username() {
        Some(name) if credentials.is_authenticated() => println!("Logged in as {name}."),
        _ => println!("Not logged in."),
    }
}

/// List orders, newest first when the backend sends `createdAt`.
pub async fn orders(ctx: &Context) -> Result<()> {
    let mut orders = ctx.api.admin_orders().await?;
    if orders.is_empty() {
        println!("No orders.");
        return Ok(());
    }

    orders.sort_by_key(|order| std::cmp::Reverse(created_at(order)));
    for order in &orders {
        let date = created_at(order)
            .and_then(format_timestamp_millis)
            .unwrap_or_default();
        println!(
            "#{:<6} {:<10} {:>10}  {}",
            order.id,
            order.status,
            ctx.price_or_dash(order.total),
            date
        );
    }

    let open = orders.iter().filter(|order| order.status.is_open()).count();
    println!("{} order(s), {open} open", orders.len());
    Ok(())
}

pub async fn set_status(ctx: &Context, id: OrderId, status: OrderStatus) -> Result<()> {
    let order = ctx.api.update_order_status(id, status).await?;
    tracing::info!(order_id = %order.id, status = %order.status, "Order status updated");
    println!("Order #{} is now {}.", order.id, order.status);
    Ok(())
}

pub async fn create_product(ctx: &Context, name: String, price: Decimal) -> Result<()> {
    let input = product_input(name, price)?;
    let product = ctx.api.create_product(&input).await?;
    println!(
        "Created product #{} {} ({})",
        product.id,
        product.name,
        ctx.price_or_dash(product.price)
    );
    Ok(())
}

pub async fn update_product(
    ctx: &Context,
    id: ProductId,
    name: String,
    price: Decimal,
) -> Result<()> {
    let input = product_input(name, price)?;
    let product = ctx.api.update_product(id, &input).await?;
    println!(
        "Updated product #{} {} ({})",
        product.id,
        product.name,
        ctx.price_or_dash(product.price)
    );
    Ok(())
}

pub async fn delete_product(ctx: &Context, id: ProductId) -> Result<()> {
    ctx.api.delete_product(id).await?;
    println!("Deleted product #{id}.");
    Ok(())
}

// =============================================================================
// Helper Functions
// =============================================================================

fn product_input(name: String, price: Decimal) -> Result<ProductInput> {
    if name.trim().is_empty() {
        return Err(ClientError::InvalidInput("product name is required".to_string()));
    }
    if price.is_sign_negative() {
        return Err(ClientError::InvalidInput(format!(
            "price must not be negative: {price}"
        )));
    }

    Ok(ProductInput {
        name: name.trim().to_string(),
        price: Some(price),
        extra: serde_json::Map::new(),
    })
}

/// `createdAt` as a millisecond timestamp, if the backend sent one.
fn created_at(order: &Order) -> Option<i64> {
    order.extra.get("createdAt").and_then(serde_json::Value::as_i64)
}

fn read_password() -> Result<SecretString> {
    if let Ok(password) = std::env::var("PARFUMERIE_ADMIN_PASSWORD") {
        return Ok(SecretString::from(password));
    }

    println!("Password:");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| ClientError::InvalidInput(format!("could not read password: {e}")))?;

    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(ClientError::InvalidInput("password is required".to_string()));
    }
    Ok(SecretString::from(password.to_string()))
}
