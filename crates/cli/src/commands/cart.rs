//! Cart commands.

use parfumerie_client::sanitize::strip_tags;
use parfumerie_client::{CartLine, CartStore, Result};
use parfumerie_core::ProductId;

use super::Context;

/// Print the cart, one line per product, then the totals.
pub fn show(ctx: &Context) {
    print_cart(ctx, &ctx.cart());
}

/// Fetch `id` from the catalog and add `quantity` units of it.
pub async fn add(ctx: &Context, id: ProductId, quantity: i64) -> Result<()> {
    let product = ctx.api.get_product(id).await?;
    let mut cart = ctx.cart();
    cart.add_item(product, quantity)?;

    tracing::info!(product_id = %id, quantity, "Added to cart");
    print_cart(ctx, &cart);
    Ok(())
}

pub fn remove(ctx: &Context, id: ProductId) -> Result<()> {
    let mut cart = ctx.cart();
    if cart.get(id).is_none() {
        println!("Product {id} is not in the cart.");
    }
    cart.remove_item(id)?;
    print_cart(ctx, &cart);
    Ok(())
}

pub fn update(ctx: &Context, id: ProductId, delta: i64) -> Result<()> {
    let mut cart = ctx.cart();
    if cart.get(id).is_none() {
        println!("Product {id} is not in the cart.");
        return Ok(());
    }
    cart.update_quantity(id, delta)?;
    print_cart(ctx, &cart);
    Ok(())
}

pub fn clear(ctx: &Context) -> Result<()> {
    ctx.cart().clear()?;
    println!("Cart cleared.");
    Ok(())
}

pub(super) fn print_cart(ctx: &Context, cart: &CartStore) {
    if cart.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for line in cart.items() {
        println!("{}", format_line(ctx, line));
    }
    println!(
        "{} item(s), total {}",
        cart.item_count(),
        ctx.price(cart.total())
    );
}

fn format_line(ctx: &Context, line: &CartLine) -> String {
    format!(
        "{:>6}  {:<32} {:>3} x {:>10} = {:>10}",
        line.product.id,
        strip_tags(&line.product.name).trim(),
        line.quantity,
        ctx.price_or_dash(line.unit_price),
        ctx.price(line.line_total()),
    )
}
