use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use kidloop_auth::Role;
use kidloop_catalog::Product;
use kidloop_core::{AddressId, DomainError, DomainResult, OrderId, UserId};
use kidloop_store::{IndexEntry, Record};

/// Days between placement and the promised delivery date.
const DELIVERY_WINDOW_DAYS: i64 = 5;

/// Order delivery lifecycle. `Delivered` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Shipped,
    Delivered,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Failed => "Failed",
        }
    }
}

impl core::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(OrderStatus::Pending),
            "Shipped" => Ok(OrderStatus::Shipped),
            "Delivered" => Ok(OrderStatus::Delivered),
            "Failed" => Ok(OrderStatus::Failed),
            other => Err(DomainError::validation(format!(
                "unknown order status: {other}"
            ))),
        }
    }
}

/// Transition table: `(current, requested)` → roles allowed to perform it.
pub fn transition_roles(current: OrderStatus, requested: OrderStatus) -> Option<&'static [Role]> {
    use OrderStatus::*;

    const ADMIN: &[Role] = &[Role::Admin];
    const ADMIN_OR_DELIVERY: &[Role] = &[Role::Admin, Role::DeliveryBoy];

    match (current, requested) {
        (Pending, Shipped) => Some(ADMIN),
        (Shipped, Delivered) => Some(ADMIN_OR_DELIVERY),
        (Shipped, Failed) => Some(ADMIN_OR_DELIVERY),
        _ => None,
    }
}

/// Check a requested transition.
///
/// A delivered order rejects every transition unconditionally, before edge
/// lookup; everything else fails on a missing edge or on the role gate.
/// The caller owns the delivery-assignee validation for `Pending → Shipped`.
pub fn authorize_transition(
    current: OrderStatus,
    requested: OrderStatus,
    actor: Role,
) -> DomainResult<()> {
    if current == OrderStatus::Delivered {
        return Err(DomainError::invariant("order already delivered"));
    }

    let roles = transition_roles(current, requested).ok_or_else(|| {
        DomainError::invariant(format!("no transition from '{current}' to '{requested}'"))
    })?;

    if !roles.contains(&actor) {
        return Err(DomainError::forbidden(format!(
            "role {actor} may not set order status to '{requested}'"
        )));
    }
    Ok(())
}

/// A placed order.
///
/// `products` and `amount` are immutable after creation: the amount is the
/// sum of each product's `current_price` at placement time and is never
/// recomputed, even if prices change later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer: UserId,
    pub products: Vec<kidloop_core::ProductId>,
    /// Snapshot sum in smallest currency unit.
    pub amount: u64,
    pub status: OrderStatus,
    pub shipping_address: AddressId,
    pub payment_status: String,
    pub payment_id: String,
    pub placed_at: DateTime<Utc>,
    pub expected_delivery: DateTime<Utc>,
    /// Denormalized thumbnail: first image of the first product.
    pub image: String,
    pub delivery_boy: Option<UserId>,
}

impl Order {
    /// Derive a new order from the product snapshot loaded by the caller.
    ///
    /// The caller has already resolved every product id; this function only
    /// does the pure derivation (amount, thumbnail, dates).
    pub fn place(
        id: OrderId,
        customer: UserId,
        products: &[Product],
        shipping_address: AddressId,
        payment_status: impl Into<String>,
        payment_id: impl Into<String>,
        placed_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if products.is_empty() {
            return Err(DomainError::validation("an order needs at least one product"));
        }

        let amount = products.iter().map(|p| p.current_price).sum();
        let image = products
            .first()
            .map(|p| p.thumbnail().to_string())
            .unwrap_or_else(|| "defaultImage.png".to_string());

        Ok(Self {
            id,
            customer,
            products: products.iter().map(|p| p.id).collect(),
            amount,
            status: OrderStatus::Pending,
            shipping_address,
            payment_status: payment_status.into(),
            payment_id: payment_id.into(),
            placed_at,
            expected_delivery: placed_at + Duration::days(DELIVERY_WINDOW_DAYS),
            image,
            delivery_boy: None,
        })
    }
}

impl Record for Order {
    type Key = OrderId;
    const ENTITY: &'static str = "order";

    fn key(&self) -> OrderId {
        self.id
    }

    fn index_entries(&self) -> Vec<IndexEntry> {
        vec![
            IndexEntry::new("by-user", self.customer.to_string(), self.placed_at),
            IndexEntry::new("by-status", self.status.as_str(), self.placed_at),
        ]
    }
}

/// Idempotency marker for order placement: one row per caller-supplied key,
/// pointing at the order it produced. Replays return that order instead of
/// placing again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdempotencyRecord {
    pub key: String,
    pub order: OrderId,
    pub created_at: DateTime<Utc>,
}

impl Record for IdempotencyRecord {
    type Key = String;
    const ENTITY: &'static str = "order-idempotency";

    fn key(&self) -> String {
        self.key.clone()
    }

    fn index_entries(&self) -> Vec<IndexEntry> {
        Vec::new()
    }
}
