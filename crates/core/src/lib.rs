//! `kidloop-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;
pub mod page;

pub use error::{DomainError, DomainResult};
pub use id::{AddressId, CartItemId, ContactId, OrderId, ProductId, UserId, WishlistItemId};
pub use page::{Page, PageRequest};
