//! Checkout.

use parfumerie_client::api::{CustomerDetails, NewOrder};
use parfumerie_client::sanitize::clean_text;
use parfumerie_client::{ClientError, Result};

use super::Context;
use super::cart::print_cart;

/// Clean and validate checkout details.
///
/// # Errors
///
/// Returns `ClientError::InvalidInput` when a required field is blank or
/// the email address is malformed.
pub fn customer_details(
    name: &str,
    email: &str,
    address: &str,
    phone: Option<String>,
) -> Result<CustomerDetails> {
    let name = clean_text(name);
    let email = email.trim().to_string();
    let address = clean_text(address);
    let phone = phone
        .map(|phone| clean_text(&phone))
        .filter(|phone| !phone.is_empty());

    if name.is_empty() {
        return Err(ClientError::InvalidInput("name is required".to_string()));
    }
    if address.is_empty() {
        return Err(ClientError::InvalidInput("address is required".to_string()));
    }
    // Basic email validation
    if !email.contains('@') || !email.contains('.') {
        return Err(ClientError::InvalidInput(format!("invalid email: {email}")));
    }

    Ok(CustomerDetails {
        name,
        email,
        address,
        phone,
    })
}

/// Submit the cart as an order and empty it once the API accepts it.
pub async fn place(ctx: &Context, customer: CustomerDetails) -> Result<()> {
    let mut cart = ctx.cart();
    if cart.is_empty() {
        return Err(ClientError::InvalidInput("the cart is empty".to_string()));
    }

    print_cart(ctx, &cart);
    let order = ctx.api.create_order(&NewOrder::from_cart(&cart, customer)).await?;
    cart.clear()?;

    tracing::info!(order_id = %order.id, "Order placed");
    println!(
        "Order #{} placed ({}), total {}",
        order.id,
        order.status,
        ctx.price_or_dash(order.total)
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_details_sanitized() {
        let details = customer_details(
            " <b>Ada</b> ",
            " ada@example.com ",
            "1 Rue <i>de la</i> Paix",
            Some("   ".to_string()),
        )
        .unwrap();

        assert_eq!(details.name, "Ada");
        assert_eq!(details.email, "ada@example.com");
        assert_eq!(details.address, "1 Rue de la Paix");
        assert!(details.phone.is_none());
    }

    #[test]
    fn test_customer_details_not_html_escaped() {
        let details = customer_details(
            "Tom & Jerry",
            "tom@example.com",
            "12 Rue d'Alsace <Apt 3>",
            Some("+33 1 23 45 67 89".to_string()),
        )
        .unwrap();

        assert_eq!(details.name, "Tom & Jerry");
        assert_eq!(details.address, "12 Rue d'Alsace");
        assert_eq!(details.phone.as_deref(), Some("+33 1 23 45 67 89"));

        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["name"], "Tom & Jerry");
    }

    #[test]
    fn test_customer_details_rejected() {
        assert!(customer_details("", "ada@example.com", "Paris", None).is_err());
        assert!(customer_details("Ada", "not-an-email", "Paris", None).is_err());
        assert!(customer_details("Ada", "ada@example.com", "<br>", None).is_err());
    }
}
