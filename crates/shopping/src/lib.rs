//! `kidloop-shopping` — cart and wishlist rows.
//!
//! Both collections share the same shape and invariant: one row per addition,
//! at most one row per (user, product) pair, enforced by a pre-insert
//! existence check over the by-user index (not a store-level uniqueness
//! constraint). Rows carry their own generated id; removal resolves the
//! business key to that id first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kidloop_core::{CartItemId, ProductId, UserId, WishlistItemId};
use kidloop_store::{IndexEntry, Record};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub user: UserId,
    pub product: ProductId,
    pub created_at: DateTime<Utc>,
}

impl CartItem {
    pub fn new(user: UserId, product: ProductId, created_at: DateTime<Utc>) -> Self {
        Self {
            id: CartItemId::new(),
            user,
            product,
            created_at,
        }
    }
}

impl Record for CartItem {
    type Key = CartItemId;
    const ENTITY: &'static str = "cart-item";

    fn key(&self) -> CartItemId {
        self.id
    }

    fn index_entries(&self) -> Vec<IndexEntry> {
        vec![IndexEntry::new(
            "by-user",
            self.user.to_string(),
            self.created_at,
        )]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub id: WishlistItemId,
    pub user: UserId,
    pub product: ProductId,
    pub created_at: DateTime<Utc>,
}

impl WishlistItem {
    pub fn new(user: UserId, product: ProductId, created_at: DateTime<Utc>) -> Self {
        Self {
            id: WishlistItemId::new(),
            user,
            product,
            created_at,
        }
    }
}

impl Record for WishlistItem {
    type Key = WishlistItemId;
    const ENTITY: &'static str = "wishlist-item";

    fn key(&self) -> WishlistItemId {
        self.id
    }

    fn index_entries(&self) -> Vec<IndexEntry> {
        vec![IndexEntry::new(
            "by-user",
            self.user.to_string(),
            self.created_at,
        )]
    }
}

/// Find the row for a product within a user's already-queried rows.
pub fn cart_row_for<'a>(rows: &'a [CartItem], product: ProductId) -> Option<&'a CartItem> {
    rows.iter().find(|r| r.product == product)
}

pub fn wishlist_row_for<'a>(
    rows: &'a [WishlistItem],
    product: ProductId,
) -> Option<&'a WishlistItem> {
    rows.iter().find(|r| r.product == product)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kidloop_store::{InMemoryTable, Table};
    use proptest::prelude::*;

    #[test]
    fn cart_rows_index_by_user() {
        let user = UserId::new();
        let row = CartItem::new(user, ProductId::new(), Utc::now());
        let entries = row.index_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].partition, user.to_string());
    }

    #[test]
    fn row_lookup_by_business_key() {
        let user = UserId::new();
        let target = ProductId::new();
        let rows = vec![
            CartItem::new(user, ProductId::new(), Utc::now()),
            CartItem::new(user, target, Utc::now()),
        ];
        assert_eq!(cart_row_for(&rows, target).unwrap().product, target);
        assert!(cart_row_for(&rows, ProductId::new()).is_none());
    }

    proptest! {
        /// The existence-check discipline holds: adding each product once and
        /// refusing duplicates leaves exactly one row per (user, product).
        #[test]
        fn at_most_one_row_per_pair(adds in proptest::collection::vec(0usize..4, 1..20)) {
            let user = UserId::new();
            let products: Vec<ProductId> = (0..4).map(|_| ProductId::new()).collect();
            let table = InMemoryTable::new();

            for idx in adds {
                let product = products[idx];
                let existing = table.query("by-user", &user.to_string()).unwrap();
                if cart_row_for(&existing, product).is_none() {
                    table.insert(CartItem::new(user, product, Utc::now())).unwrap();
                }
            }

            let rows = table.query("by-user", &user.to_string()).unwrap();
            for product in products {
                let count = rows.iter().filter(|r| r.product == product).count();
                prop_assert!(count <= 1);
            }
        }
    }
}
