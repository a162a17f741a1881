use chrono::{DateTime, Utc};
use serde::Deserialize;

use kidloop_auth::Role;
use kidloop_catalog::{ProductFilter, ProductSort, ProductStatus, SellType};
use kidloop_core::{AddressId, ContactId, DomainError, DomainResult, PageRequest, ProductId, UserId};
use kidloop_orders::{OrderFilter, OrderSort, OrderStatus};
use kidloop_parties::UserAccount;
use kidloop_support::{ContactCategory, ContactFilter, ContactPriority, ContactStatus};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub products: Vec<ProductId>,
    pub shipping_address: AddressId,
    pub payment_status: String,
    pub payment_id: String,
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderStatusRequest {
    pub status: OrderStatus,
    pub delivery_boy: Option<UserId>,
}

#[derive(Debug, Deserialize)]
pub struct ProductStatusRequest {
    pub status: ProductStatus,
    pub pickup_assignee: Option<UserId>,
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product: ProductId,
}

#[derive(Debug, Deserialize)]
pub struct ContactStatusRequest {
    pub status: ContactStatus,
    pub priority: Option<ContactPriority>,
    pub assigned_to: Option<UserId>,
    pub response: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub response: String,
    pub status: Option<ContactStatus>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkActionKind {
    MarkRead,
    ChangeStatus,
    Assign,
    Delete,
}

#[derive(Debug, Deserialize)]
pub struct BulkContactRequest {
    pub action: BulkActionKind,
    pub ids: Vec<ContactId>,
    pub status: Option<ContactStatus>,
    pub assigned_to: Option<UserId>,
}

// -------------------------
// Query DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct UserListQuery {
    pub role: Option<Role>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub status: Option<ProductStatus>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub age_group: Option<String>,
    pub sell_type: Option<SellType>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ProductListQuery {
    pub fn into_parts(self) -> DomainResult<(ProductFilter, ProductSort, PageRequest)> {
        let sort = match self.sort.as_deref() {
            Some(raw) => raw.parse()?,
            None => ProductSort::default(),
        };
        let page = page_request(self.page, self.limit);
        let filter = ProductFilter {
            status: self.status,
            search: self.search,
            category: self.category,
            condition: self.condition,
            age_group: self.age_group,
            sell_type: self.sell_type,
            min_price: self.min_price,
            max_price: self.max_price,
        };
        Ok((filter, sort, page))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub search: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl OrderListQuery {
    pub fn into_parts(self) -> DomainResult<(OrderFilter, OrderSort, PageRequest)> {
        let sort = match self.sort.as_deref() {
            Some(raw) => raw.parse()?,
            None => OrderSort::default(),
        };
        let page = page_request(self.page, self.limit);
        let filter = OrderFilter {
            status: self.status,
            search: self.search,
            start_date: self.start_date,
            end_date: self.end_date,
        };
        Ok((filter, sort, page))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactListQuery {
    pub status: Option<ContactStatus>,
    pub priority: Option<ContactPriority>,
    pub category: Option<ContactCategory>,
    pub assigned_to: Option<UserId>,
    pub search: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ContactListQuery {
    pub fn into_parts(self) -> (ContactFilter, PageRequest) {
        let page = page_request(self.page, self.limit);
        let filter = ContactFilter {
            status: self.status,
            priority: self.priority,
            category: self.category,
            assigned_to: self.assigned_to,
            search: self.search,
            start_date: self.start_date,
            end_date: self.end_date,
        };
        (filter, page)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub fn page_request(page: Option<u32>, limit: Option<u32>) -> PageRequest {
    let defaults = PageRequest::default();
    PageRequest::new(page.unwrap_or(defaults.page), limit.unwrap_or(defaults.limit))
}

// -------------------------
// Response mapping
// -------------------------

/// Public profile view; never leaks the password hash.
pub fn user_to_json(user: &UserAccount) -> serde_json::Value {
    serde_json::json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "role": user.role,
        "created_at": user.created_at,
    })
}

pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: core::str::FromStr<Err = DomainError>,
{
    raw.parse::<T>().map_err(errors::domain_error_to_response)
}
