use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kidloop_auth::Role;
use kidloop_core::{AddressId, DomainError, DomainResult, ProductId, UserId};
use kidloop_store::{IndexEntry, Record};

/// All products share one secondary-index partition, giving a cheap
/// "every product, newest first" query.
pub const ALL_PRODUCTS_PARTITION: &str = "product";

/// Marketplace mode: consignment-style listing vs direct buyout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SellType {
    #[serde(rename = "Sell with us")]
    SellWithUs,
    #[serde(rename = "Sell to us")]
    SellToUs,
}

/// Product listing lifecycle.
///
/// `Completed`, `Rejected` and `SoldOut` are terminal. `SoldOut` is reached
/// only through order placement (conditional write), never through the
/// status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductStatus {
    Pending,
    #[serde(rename = "Ready to pick")]
    ReadyToPick,
    Picked,
    Completed,
    Rejected,
    #[serde(rename = "Sold out")]
    SoldOut,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Pending => "Pending",
            ProductStatus::ReadyToPick => "Ready to pick",
            ProductStatus::Picked => "Picked",
            ProductStatus::Completed => "Completed",
            ProductStatus::Rejected => "Rejected",
            ProductStatus::SoldOut => "Sold out",
        }
    }
}

impl core::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for ProductStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(ProductStatus::Pending),
            "Ready to pick" => Ok(ProductStatus::ReadyToPick),
            "Picked" => Ok(ProductStatus::Picked),
            "Completed" => Ok(ProductStatus::Completed),
            "Rejected" => Ok(ProductStatus::Rejected),
            "Sold out" => Ok(ProductStatus::SoldOut),
            other => Err(DomainError::validation(format!(
                "unknown product status: {other}"
            ))),
        }
    }
}

/// Transition table for the status endpoint: `(current, requested)` →
/// roles allowed to perform it. `None` means the edge does not exist.
pub fn transition_roles(
    current: ProductStatus,
    requested: ProductStatus,
) -> Option<&'static [Role]> {
    use ProductStatus::*;

    const ADMIN: &[Role] = &[Role::Admin];
    const ADMIN_OR_DELIVERY: &[Role] = &[Role::Admin, Role::DeliveryBoy];

    match (current, requested) {
        (Pending, ReadyToPick) => Some(ADMIN),
        (Pending, Rejected) => Some(ADMIN),
        (ReadyToPick, Picked) => Some(ADMIN_OR_DELIVERY),
        (Picked, Completed) => Some(ADMIN_OR_DELIVERY),
        _ => None,
    }
}

/// Check a requested transition: edge existence first, then the role gate.
///
/// The caller still owns per-edge extras (pickup assignee for
/// `Pending → ReadyToPick`) and the conditional write.
pub fn authorize_transition(
    current: ProductStatus,
    requested: ProductStatus,
    actor: Role,
) -> DomainResult<()> {
    let roles = transition_roles(current, requested).ok_or_else(|| {
        DomainError::invariant(format!(
            "no transition from '{current}' to '{requested}'"
        ))
    })?;

    if !roles.contains(&actor) {
        return Err(DomainError::forbidden(format!(
            "role {actor} may not set product status to '{requested}'"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub filename: String,
    pub url: String,
}

/// A listing. Never hard-deleted: rejection is a status, not a removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub seller: UserId,
    pub name: String,
    pub description: String,
    /// Prices in smallest currency unit.
    pub original_price: u64,
    pub current_price: u64,
    pub category: String,
    pub age_group: String,
    pub condition: String,
    pub sell_type: SellType,
    pub status: ProductStatus,
    pub pickup_address: AddressId,
    /// DeliveryBoy assigned when the product goes ReadyToPick.
    pub pickup_assignee: Option<UserId>,
    pub images: Vec<ProductImage>,
    pub created_at: DateTime<Utc>,
}

/// Creation payload. Image URLs are filled in after upload, so `create`
/// receives the finished `ProductImage` list.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub seller: UserId,
    pub name: String,
    pub description: String,
    pub original_price: u64,
    pub current_price: u64,
    pub category: String,
    pub age_group: String,
    pub condition: String,
    pub sell_type: SellType,
    pub pickup_address: AddressId,
    pub images: Vec<ProductImage>,
}

impl Product {
    pub fn create(id: ProductId, new: NewProduct, created_at: DateTime<Utc>) -> DomainResult<Self> {
        if new.name.trim().is_empty() {
            return Err(DomainError::validation("product name is required"));
        }
        if new.images.is_empty() {
            return Err(DomainError::validation("at least one image is required"));
        }
        if new.current_price > new.original_price {
            return Err(DomainError::validation(
                "current price must not exceed the original price",
            ));
        }

        Ok(Self {
            id,
            seller: new.seller,
            name: new.name,
            description: new.description,
            original_price: new.original_price,
            current_price: new.current_price,
            category: new.category,
            age_group: new.age_group,
            condition: new.condition,
            sell_type: new.sell_type,
            status: ProductStatus::Pending,
            pickup_address: new.pickup_address,
            pickup_assignee: None,
            images: new.images,
            created_at,
        })
    }

    /// First image URL, or the placeholder used as the order thumbnail.
    pub fn thumbnail(&self) -> &str {
        self.images
            .first()
            .map(|i| i.url.as_str())
            .unwrap_or("defaultImage.png")
    }

    /// Whether an order may still buy this listing.
    pub fn is_sellable(&self) -> bool {
        self.status != ProductStatus::SoldOut
    }
}

impl Record for Product {
    type Key = ProductId;
    const ENTITY: &'static str = "product";

    fn key(&self) -> ProductId {
        self.id
    }

    fn index_entries(&self) -> Vec<IndexEntry> {
        vec![
            IndexEntry::new("by-kind", ALL_PRODUCTS_PARTITION, self.created_at),
            IndexEntry::new("by-seller", self.seller.to_string(), self.created_at),
        ]
    }
}
