//! Catalog browsing commands.

use parfumerie_client::Result;
use parfumerie_client::sanitize::strip_tags;
use parfumerie_core::ProductId;

use super::Context;

pub async fn list(ctx: &Context) -> Result<()> {
    let products = ctx.api.list_products().await?;
    if products.is_empty() {
        println!("No products available.");
        return Ok(());
    }

    for product in &products {
        println!(
            "{:>6}  {:<40} {:>10}",
            product.id,
            strip_tags(&product.name).trim(),
            ctx.price_or_dash(product.price)
        );
    }
    Ok(())
}

/// Print one product, including any string fields beyond name and price.
pub async fn show(ctx: &Context, id: ProductId) -> Result<()> {
    let product = ctx.api.get_product(id).await?;

    println!("#{} {}", product.id, strip_tags(&product.name).trim());
    println!("Price: {}", ctx.price_or_dash(product.price));
    for (key, value) in &product.extra {
        if let Some(text) = value.as_str() {
            println!("{key}: {}", strip_tags(text).trim());
        }
    }

    if let Some(line) = ctx.cart().get(id) {
        println!("In cart: {}", line.quantity);
    }
    Ok(())
}
