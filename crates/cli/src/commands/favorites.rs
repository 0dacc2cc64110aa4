//! Favorites commands.

use shopfront::error::Result;
use shopfront::state::Storefront;
use shopfront_core::ProductId;

use super::price_or_dash;

pub fn list(shop: &Storefront, user: Option<&str>) {
    let owner = shop.current_user(user);
    let favorites = shop.favorites().all(user);

    if favorites.is_empty() {
        println!("{owner} has no favorites.");
        return;
    }

    for entry in favorites {
        println!(
            "{:>4}  {:<50}  {:>9}",
            entry.id,
            entry.name,
            price_or_dash(entry.price)
        );
    }
}

/// Flip a product in or out of favorites.
pub async fn toggle(shop: &mut Storefront, product_id: &str, user: Option<&str>) -> Result<()> {
    let added = shop
        .toggle_favorite(&ProductId::from(product_id), user)
        .await?;
    if added {
        println!("Added product {product_id} to favorites.");
    } else {
        println!("Removed product {product_id} from favorites.");
    }
    Ok(())
}

pub fn clear(shop: &mut Storefront, user: Option<&str>) {
    shop.favorites_mut().clear_favorites(user);
    println!("Favorites cleared.");
}
