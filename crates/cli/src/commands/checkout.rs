//! Order placement.

use shopfront::checkout::CheckoutForm;
use shopfront::error::Result;
use shopfront::state::Storefront;

/// Submit the order and print the confirmation.
pub async fn place_order(
    shop: &mut Storefront,
    form: &CheckoutForm,
    user: Option<&str>,
) -> Result<()> {
    println!("Processing order...");
    let order = shop.checkout(form, user).await?;

    println!("Order {} placed for {}.", order.order_id, order.user);
    for item in &order.items {
        println!("  {} x {}  ${}", item.quantity, item.name, item.line_total());
    }
    println!("Total ${}. Confirmation sent to {}.", order.total, order.email);
    Ok(())
}
