//! Cart and wishlist: add, list with product resolution, remove.
//!
//! The two collections have the same shape but independent stores, so the
//! flows are written out twice rather than abstracted over the row type.

use chrono::Utc;
use serde::Serialize;

use kidloop_catalog::Product;
use kidloop_core::{DomainError, DomainResult, ProductId, UserId};
use kidloop_shopping::{CartItem, WishlistItem, cart_row_for, wishlist_row_for};

use super::{AppServices, internal};

#[derive(Debug, Serialize)]
pub struct ResolvedCartItem {
    pub item: CartItem,
    pub product: Product,
}

#[derive(Debug, Serialize)]
pub struct ResolvedWishlistItem {
    pub item: WishlistItem,
    pub product: Product,
}

pub fn add_to_cart(
    services: &AppServices,
    user: UserId,
    product: ProductId,
) -> DomainResult<CartItem> {
    ensure_product_exists(services, product)?;

    let rows = services
        .cart
        .query("by-user", &user.to_string())
        .map_err(internal)?;
    if cart_row_for(&rows, product).is_some() {
        return Err(DomainError::conflict("product is already in the cart"));
    }

    let row = CartItem::new(user, product, Utc::now());
    services.cart.insert(row.clone()).map_err(internal)?;
    Ok(row)
}

pub fn list_cart(services: &AppServices, user: UserId) -> DomainResult<Vec<ResolvedCartItem>> {
    let rows = services
        .cart
        .query("by-user", &user.to_string())
        .map_err(internal)?;

    let mut out = Vec::with_capacity(rows.len());
    for item in rows {
        // Rows whose product vanished are skipped, not surfaced.
        if let Some(product) = services.products.get(&item.product).map_err(internal)? {
            out.push(ResolvedCartItem { item, product });
        }
    }
    Ok(out)
}

pub fn remove_from_cart(
    services: &AppServices,
    user: UserId,
    product: ProductId,
) -> DomainResult<()> {
    let rows = services
        .cart
        .query("by-user", &user.to_string())
        .map_err(internal)?;
    let row = cart_row_for(&rows, product)
        .ok_or_else(|| DomainError::not_found("product is not in the cart"))?;
    services.cart.delete(&row.id).map_err(internal)
}

pub fn add_to_wishlist(
    services: &AppServices,
    user: UserId,
    product: ProductId,
) -> DomainResult<WishlistItem> {
    ensure_product_exists(services, product)?;

    let rows = services
        .wishlist
        .query("by-user", &user.to_string())
        .map_err(internal)?;
    if wishlist_row_for(&rows, product).is_some() {
        return Err(DomainError::conflict("product is already in the wishlist"));
    }

    let row = WishlistItem::new(user, product, Utc::now());
    services.wishlist.insert(row.clone()).map_err(internal)?;
    Ok(row)
}

pub fn list_wishlist(
    services: &AppServices,
    user: UserId,
) -> DomainResult<Vec<ResolvedWishlistItem>> {
    let rows = services
        .wishlist
        .query("by-user", &user.to_string())
        .map_err(internal)?;

    let mut out = Vec::with_capacity(rows.len());
    for item in rows {
        if let Some(product) = services.products.get(&item.product).map_err(internal)? {
            out.push(ResolvedWishlistItem { item, product });
        }
    }
    Ok(out)
}

pub fn remove_from_wishlist(
    services: &AppServices,
    user: UserId,
    product: ProductId,
) -> DomainResult<()> {
    let rows = services
        .wishlist
        .query("by-user", &user.to_string())
        .map_err(internal)?;
    let row = wishlist_row_for(&rows, product)
        .ok_or_else(|| DomainError::not_found("product is not in the wishlist"))?;
    services.wishlist.delete(&row.id).map_err(internal)
}

fn ensure_product_exists(services: &AppServices, product: ProductId) -> DomainResult<()> {
    services
        .products
        .get(&product)
        .map_err(internal)?
        .ok_or_else(|| DomainError::not_found(format!("product {product}")))?;
    Ok(())
}
