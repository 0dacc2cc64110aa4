//! Per-user shopping baskets.
//!
//! Each resolved [`UserKey`] owns an ordered list of [`LineItem`]s with no
//! duplicate product IDs. Adding an existing product bumps its quantity;
//! a quantity of zero or less removes the row. The whole table is written
//! to the `basket-storage` record after every mutation.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shopfront_core::{LineItem, Price, ProductId, ProductRef, UserKey};

use crate::identity::IdentityResolver;
use crate::storage::{Storage, decode_rows, keys, load_record, save_record};

/// Persisted form of the basket table.
#[derive(Debug, Default, Deserialize)]
struct BasketRecord {
    #[serde(default)]
    user_baskets: BTreeMap<String, serde_json::Value>,
}

#[derive(Serialize)]
struct BasketRecordRef<'a> {
    user_baskets: &'a BTreeMap<UserKey, Vec<LineItem>>,
}

/// Basket table keyed by user.
///
/// This is the only mutation surface for baskets.
#[derive(Debug)]
pub struct BasketStore {
    storage: Arc<dyn Storage>,
    identity: IdentityResolver,
    baskets: BTreeMap<UserKey, Vec<LineItem>>,
}

impl BasketStore {
    /// Restore the basket table from storage.
    ///
    /// Entries under blank user keys, rows that do not decode and rows with
    /// zero quantity are dropped; duplicate product rows are merged.
    #[must_use]
    pub fn load(storage: Arc<dyn Storage>) -> Self {
        let identity = IdentityResolver::new(Arc::clone(&storage));
        Self::with_identity(storage, identity)
    }

    /// Restore from storage, resolving users through `identity`.
    #[must_use]
    pub fn with_identity(storage: Arc<dyn Storage>, identity: IdentityResolver) -> Self {
        let record: BasketRecord = load_record(storage.as_ref(), keys::BASKET);
        let baskets = normalize(decode_rows(keys::BASKET, record.user_baskets));
        tracing::debug!(users = baskets.len(), "Basket table restored");

        Self {
            identity,
            storage,
            baskets,
        }
    }

    /// Line items for `user`, in insertion order.
    #[must_use]
    pub fn items(&self, user: Option<&str>) -> &[LineItem] {
        let key = self.identity.resolve(user);
        self.baskets.get(&key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Add one unit of `product`.
    pub fn add_item(&mut self, product: ProductRef, user: Option<&str>) {
        let key = self.identity.resolve(user);
        let product_id = product.id.clone();
        let items = self.baskets.entry(key.clone()).or_default();

        let quantity = if let Some(item) = items.iter_mut().find(|i| i.id == product_id) {
            item.quantity = item.quantity.saturating_add(1);
            item.quantity
        } else {
            items.push(LineItem::from_product(product));
            1
        };

        tracing::debug!(user = %key, product_id = %product_id, quantity, "Added item to basket");
        self.persist();
    }

    /// Remove the row for `id`. Absent rows are ignored.
    pub fn remove_item(&mut self, id: &ProductId, user: Option<&str>) {
        let key = self.identity.resolve(user);
        if let Some(items) = self.baskets.get_mut(&key) {
            items.retain(|i| &i.id != id);
        }

        tracing::debug!(user = %key, product_id = %id, "Removed item from basket");
        self.persist();
    }

    /// Set the quantity for `id`; zero or negative removes the row.
    ///
    /// Products not already in the basket are not added.
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64, user: Option<&str>) {
        if quantity <= 0 {
            self.remove_item(id, user);
            return;
        }

        let key = self.identity.resolve(user);
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(item) = self
            .baskets
            .get_mut(&key)
            .and_then(|items| items.iter_mut().find(|i| &i.id == id))
        {
            item.quantity = quantity;
        }

        tracing::debug!(user = %key, product_id = %id, quantity, "Updated basket quantity");
        self.persist();
    }

    /// Lower the quantity of `id` by one, removing the row at zero.
    pub fn decrement(&mut self, id: &ProductId, user: Option<&str>) {
        let current = self.quantity_of(id, user);
        if current > 0 {
            self.update_quantity(id, i64::from(current) - 1, user);
        }
    }

    /// Whether `id` is in the basket.
    #[must_use]
    pub fn contains(&self, id: &ProductId, user: Option<&str>) -> bool {
        self.items(user).iter().any(|i| &i.id == id)
    }

    /// Quantity of `id`, or zero when absent.
    #[must_use]
    pub fn quantity_of(&self, id: &ProductId, user: Option<&str>) -> u32 {
        self.items(user)
            .iter()
            .find(|i| &i.id == id)
            .map_or(0, |i| i.quantity)
    }

    /// Sum of `price × quantity`; unpriced items contribute zero.
    #[must_use]
    pub fn total_price(&self, user: Option<&str>) -> Price {
        self.items(user).iter().map(LineItem::line_total).sum()
    }

    /// Sum of quantities (not the number of rows).
    #[must_use]
    pub fn item_count(&self, user: Option<&str>) -> u64 {
        self.items(user).iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Remove the user's whole basket.
    pub fn clear_basket(&mut self, user: Option<&str>) {
        let key = self.identity.resolve(user);
        self.baskets.remove(&key);

        tracing::debug!(user = %key, "Cleared basket");
        self.persist();
    }

    /// Users that currently have a basket entry.
    pub fn users(&self) -> impl Iterator<Item = &UserKey> {
        self.baskets.keys()
    }

    fn persist(&self) {
        save_record(
            self.storage.as_ref(),
            keys::BASKET,
            &BasketRecordRef {
                user_baskets: &self.baskets,
            },
        );
    }
}

fn normalize(raw: BTreeMap<String, Vec<LineItem>>) -> BTreeMap<UserKey, Vec<LineItem>> {
    let mut baskets: BTreeMap<UserKey, Vec<LineItem>> = BTreeMap::new();

    for (user, items) in raw {
        let Ok(key) = UserKey::parse(&user) else {
            tracing::warn!(user = %user, "Dropping basket stored under an invalid user key");
            continue;
        };

        let merged = baskets.entry(key).or_default();
        for item in items.into_iter().filter(|i| i.quantity > 0) {
            if let Some(existing) = merged.iter_mut().find(|i| i.id == item.id) {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            } else {
                merged.push(item);
            }
        }
    }

    baskets
}
