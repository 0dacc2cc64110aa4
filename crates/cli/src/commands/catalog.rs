//! Catalog browsing.

use shopfront::error::Result;
use shopfront::state::Storefront;

use super::price_or_dash;

/// Print products matching `search`.
pub async fn list(shop: &Storefront, search: &str) -> Result<()> {
    let products = shop.search(search).await?;
    if products.is_empty() {
        println!("No products found.");
        return Ok(());
    }

    for product in &products {
        println!(
            "{:>4}  {:<50}  {:>9}  {}",
            product.id,
            product.title,
            price_or_dash(product.price),
            product.category.as_deref().unwrap_or("-")
        );
    }
    tracing::debug!(count = products.len(), search, "Listed catalog");
    Ok(())
}
