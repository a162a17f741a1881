//! Collaborator wiring and per-domain orchestration.
//!
//! Every collaborator is constructed once at startup and injected as an
//! `Arc` trait object; the service functions are free functions over
//! `AppServices` so each stays independently testable.

use std::sync::Arc;

use kidloop_auth::{PasswordHasher, TokenCodec};
use kidloop_catalog::Product;
use kidloop_core::{DomainError, DomainResult};
use kidloop_orders::{IdempotencyRecord, Order};
use kidloop_parties::{Address, UserAccount};
use kidloop_shopping::{CartItem, WishlistItem};
use kidloop_store::{
    ImageStore, InMemoryImageStore, InMemoryTable, Sha256PasswordHasher, StoreError, Table,
};
use kidloop_support::Contact;

use crate::context::Principal;

pub mod catalog;
pub mod orders;
pub mod parties;
pub mod shopping;
pub mod support;

pub struct AppServices {
    pub users: Arc<dyn Table<UserAccount>>,
    pub addresses: Arc<dyn Table<Address>>,
    pub products: Arc<dyn Table<Product>>,
    pub orders: Arc<dyn Table<Order>>,
    pub idempotency: Arc<dyn Table<IdempotencyRecord>>,
    pub cart: Arc<dyn Table<CartItem>>,
    pub wishlist: Arc<dyn Table<WishlistItem>>,
    pub contacts: Arc<dyn Table<Contact>>,
    pub images: Arc<dyn ImageStore>,
    pub passwords: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenCodec>,
}

/// In-memory wiring. Production adapters slot in behind the same ports.
pub fn build_services(tokens: Arc<dyn TokenCodec>) -> AppServices {
    AppServices {
        users: Arc::new(InMemoryTable::new()),
        addresses: Arc::new(InMemoryTable::new()),
        products: Arc::new(InMemoryTable::new()),
        orders: Arc::new(InMemoryTable::new()),
        idempotency: Arc::new(InMemoryTable::new()),
        cart: Arc::new(InMemoryTable::new()),
        wishlist: Arc::new(InMemoryTable::new()),
        contacts: Arc::new(InMemoryTable::new()),
        images: Arc::new(InMemoryImageStore::new()),
        passwords: Arc::new(Sha256PasswordHasher::new()),
        tokens,
    }
}

/// Map an unexpected store failure to an internal domain error.
pub(crate) fn internal(err: StoreError) -> DomainError {
    DomainError::internal(err.to_string())
}

pub(crate) fn require_admin(principal: &Principal) -> DomainResult<()> {
    if !principal.is_admin() {
        return Err(DomainError::forbidden("admin role required"));
    }
    Ok(())
}
