//! Product orchestration: creation with image upload, listing, moderation.

use chrono::Utc;

use kidloop_auth::Role;
use kidloop_catalog::{
    ALL_PRODUCTS_PARTITION, NewProduct, Product, ProductFilter, ProductImage, ProductSort,
    ProductStatus, SellType, authorize_transition, filter_products, is_unapproved, sort_products,
};
use kidloop_core::{
    AddressId, DomainError, DomainResult, Page, PageRequest, ProductId, UserId,
};
use kidloop_store::StoreError;

use crate::context::Principal;

use super::{AppServices, internal, require_admin};

/// One image part from the multipart upload.
pub struct ProductUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub original_price: u64,
    pub current_price: u64,
    pub category: String,
    pub age_group: String,
    pub condition: String,
    pub sell_type: SellType,
    pub pickup_address: AddressId,
}

pub fn create_product(
    services: &AppServices,
    seller: UserId,
    form: ProductForm,
    uploads: Vec<ProductUpload>,
) -> DomainResult<Product> {
    services
        .addresses
        .get(&form.pickup_address)
        .map_err(internal)?
        .ok_or_else(|| DomainError::not_found(format!("address {}", form.pickup_address)))?;

    if uploads.is_empty() {
        return Err(DomainError::validation("at least one image is required"));
    }

    // Upload before the product row exists; any failure aborts creation.
    let id = ProductId::new();
    let mut images = Vec::with_capacity(uploads.len());
    for upload in &uploads {
        let url = services
            .images
            .upload(id, &upload.filename, &upload.bytes)
            .map_err(|e| DomainError::internal(format!("image upload failed: {e}")))?;
        images.push(ProductImage {
            filename: upload.filename.clone(),
            url,
        });
    }

    let product = Product::create(
        id,
        NewProduct {
            seller,
            name: form.name,
            description: form.description,
            original_price: form.original_price,
            current_price: form.current_price,
            category: form.category,
            age_group: form.age_group,
            condition: form.condition,
            sell_type: form.sell_type,
            pickup_address: form.pickup_address,
            images,
        },
        Utc::now(),
    )?;

    services.products.insert(product.clone()).map_err(internal)?;
    Ok(product)
}

pub fn get_product(services: &AppServices, id: ProductId) -> DomainResult<Product> {
    services
        .products
        .get(&id)
        .map_err(internal)?
        .ok_or_else(|| DomainError::not_found(format!("product {id}")))
}

pub fn list_products(
    services: &AppServices,
    filter: ProductFilter,
    sort: ProductSort,
    page: PageRequest,
) -> DomainResult<(Vec<Product>, Page)> {
    let all = services
        .products
        .query("by-kind", ALL_PRODUCTS_PARTITION)
        .map_err(internal)?;

    let mut hits = filter_products(all, &filter);
    sort_products(&mut hits, sort);
    Ok(Page::slice(hits, page))
}

/// Admin moderation queue: everything not yet through the consignment flow.
pub fn unapproved_products(
    services: &AppServices,
    principal: &Principal,
    page: PageRequest,
) -> DomainResult<(Vec<Product>, Page)> {
    require_admin(principal)?;

    let mut hits: Vec<Product> = services
        .products
        .query("by-kind", ALL_PRODUCTS_PARTITION)
        .map_err(internal)?
        .into_iter()
        .filter(is_unapproved)
        .collect();
    sort_products(&mut hits, ProductSort::Newest);
    Ok(Page::slice(hits, page))
}

pub fn set_product_status(
    services: &AppServices,
    principal: &Principal,
    id: ProductId,
    requested: ProductStatus,
    pickup_assignee: Option<UserId>,
) -> DomainResult<Product> {
    let product = get_product(services, id)?;

    authorize_transition(product.status, requested, principal.role)?;

    // Going ReadyToPick needs a valid delivery assignee.
    let mut assign = None;
    if requested == ProductStatus::ReadyToPick {
        let assignee = pickup_assignee
            .ok_or_else(|| DomainError::validation("pickup_assignee is required"))?;
        let user = services
            .users
            .get(&assignee)
            .map_err(internal)?
            .ok_or_else(|| DomainError::not_found(format!("user {assignee}")))?;
        if user.role != Role::DeliveryBoy {
            return Err(DomainError::validation(
                "pickup assignee must have the DeliveryBoy role",
            ));
        }
        assign = Some(assignee);
    }

    // Conditional write so a concurrent transition cannot be overwritten.
    let current = product.status;
    let check = move |p: &Product| p.status == current;
    let mut apply = |p: &mut Product| {
        p.status = requested;
        if let Some(assignee) = assign {
            p.pickup_assignee = Some(assignee);
        }
    };
    services
        .products
        .update_if(&id, &check, &mut apply)
        .map_err(|e| match e {
            StoreError::ConditionFailed(_) => {
                DomainError::conflict("product status changed concurrently")
            }
            StoreError::NotFound => DomainError::not_found(format!("product {id}")),
            other => internal(other),
        })
}
