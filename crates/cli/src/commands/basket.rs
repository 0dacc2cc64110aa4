//! Basket commands.

use shopfront::error::Result;
use shopfront::state::Storefront;
use shopfront_core::ProductId;

use super::price_or_dash;

/// Print the basket with line totals.
pub fn show(shop: &Storefront, user: Option<&str>) {
    let basket = shop.basket();
    let owner = shop.current_user(user);
    let items = basket.items(user);

    if items.is_empty() {
        println!("Basket for {owner} is empty.");
        return;
    }

    println!("Basket for {owner}:");
    for item in items {
        println!(
            "{:>4}  {:<50}  {:>3} x {:>9}  = ${}",
            item.id,
            item.name,
            item.quantity,
            price_or_dash(item.price),
            item.line_total()
        );
    }
    println!(
        "{} item(s), total ${}",
        basket.item_count(user),
        basket.total_price(user)
    );
}

/// Add one unit of a catalog product.
pub async fn add(shop: &mut Storefront, product_id: &str, user: Option<&str>) -> Result<()> {
    let quantity = shop
        .add_to_basket(&ProductId::from(product_id), user)
        .await?;
    println!("Product {product_id} quantity is now {quantity}.");
    Ok(())
}

pub fn remove(shop: &mut Storefront, product_id: &str, user: Option<&str>) {
    shop.basket_mut()
        .remove_item(&ProductId::from(product_id), user);
    println!("Removed product {product_id}.");
}

/// Set a line's quantity; a missing line is left alone.
pub fn set(shop: &mut Storefront, product_id: &str, quantity: i64, user: Option<&str>) {
    let id = ProductId::from(product_id);
    if !shop.basket().contains(&id, user) {
        tracing::warn!(product_id, "Product is not in the basket");
        return;
    }

    shop.basket_mut().update_quantity(&id, quantity, user);
    println!(
        "Product {product_id} quantity is now {}.",
        shop.basket().quantity_of(&id, user)
    );
}

pub fn clear(shop: &mut Storefront, user: Option<&str>) {
    shop.basket_mut().clear_basket(user);
    println!("Basket cleared.");
}
