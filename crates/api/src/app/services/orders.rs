//! Order orchestration: idempotent placement with product reservation,
//! delivery transitions, customer and admin listings.

use chrono::Utc;
use serde::Serialize;

use kidloop_auth::Role;
use kidloop_catalog::{Product, ProductStatus};
use kidloop_core::{
    AddressId, DomainError, DomainResult, OrderId, Page, PageRequest, ProductId, UserId,
};
use kidloop_orders::{
    IdempotencyRecord, Order, OrderFilter, OrderSort, OrderStatus, authorize_transition,
    filter_orders, sort_orders, total_amount,
};
use kidloop_parties::Address;
use kidloop_shopping::cart_row_for;
use kidloop_store::StoreError;

use crate::context::Principal;

use super::{AppServices, internal, require_admin};

pub struct PlaceOrder {
    pub products: Vec<ProductId>,
    pub shipping_address: AddressId,
    pub payment_status: String,
    pub payment_id: String,
    pub idempotency_key: Option<String>,
}

/// Place an order.
///
/// Each product is reserved with a compare-and-swap (`!= SoldOut` →
/// `SoldOut`); the first failed reservation aborts the placement, restores
/// the products reserved earlier in this request, and surfaces a conflict.
/// Replays under a recorded idempotency key return the original order.
pub fn place_order(
    services: &AppServices,
    customer: UserId,
    request: PlaceOrder,
) -> DomainResult<Order> {
    if let Some(key) = &request.idempotency_key {
        if let Some(marker) = services.idempotency.get(key).map_err(internal)? {
            return services
                .orders
                .get(&marker.order)
                .map_err(internal)?
                .ok_or_else(|| {
                    DomainError::internal("idempotency record points at a missing order")
                });
        }
    }

    if request.products.is_empty() {
        return Err(DomainError::validation("an order needs at least one product"));
    }

    let mut snapshot = Vec::with_capacity(request.products.len());
    for id in &request.products {
        let product = services
            .products
            .get(id)
            .map_err(internal)?
            .ok_or_else(|| DomainError::not_found(format!("product {id}")))?;
        snapshot.push(product);
    }

    let mut reserved: Vec<ProductId> = Vec::new();
    for product in &snapshot {
        let check = |p: &Product| p.is_sellable();
        let mut apply = |p: &mut Product| p.status = ProductStatus::SoldOut;
        if let Err(e) = services.products.update_if(&product.id, &check, &mut apply) {
            restore_reserved(services, &reserved, &snapshot);
            return Err(match e {
                StoreError::ConditionFailed(_) => {
                    DomainError::conflict(format!("product {} is already sold", product.id))
                }
                StoreError::NotFound => DomainError::not_found(format!("product {}", product.id)),
                other => internal(other),
            });
        }
        reserved.push(product.id);
    }

    let order = Order::place(
        OrderId::new(),
        customer,
        &snapshot,
        request.shipping_address,
        request.payment_status,
        request.payment_id,
        Utc::now(),
    )?;
    if let Err(e) = services.orders.insert(order.clone()) {
        restore_reserved(services, &reserved, &snapshot);
        return Err(internal(e));
    }

    if let Some(key) = request.idempotency_key {
        let marker = IdempotencyRecord {
            key,
            order: order.id,
            created_at: order.placed_at,
        };
        if let Err(e) = services.idempotency.insert(marker) {
            tracing::warn!(order = %order.id, error = %e, "failed to record idempotency key");
        }
    }

    // Clear purchased products from the cart. A missing row is logged and
    // skipped, never an error.
    let cart_rows = services
        .cart
        .query("by-user", &customer.to_string())
        .map_err(internal)?;
    for id in &request.products {
        match cart_row_for(&cart_rows, *id) {
            Some(row) => {
                if let Err(e) = services.cart.delete(&row.id) {
                    tracing::warn!(product = %id, error = %e, "failed to clear cart row after placement");
                }
            }
            None => {
                tracing::warn!(product = %id, customer = %customer, "no cart row for purchased product");
            }
        }
    }

    Ok(order)
}

/// Best-effort rollback after an aborted placement.
fn restore_reserved(services: &AppServices, reserved: &[ProductId], snapshot: &[Product]) {
    for id in reserved {
        let Some(original) = snapshot.iter().find(|p| p.id == *id) else {
            continue;
        };
        let status = original.status;
        let mut apply = |p: &mut Product| p.status = status;
        if let Err(e) = services.products.update(id, &mut apply) {
            tracing::warn!(product = %id, error = %e, "failed to restore product after aborted placement");
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CustomerOrder {
    #[serde(flatten)]
    pub order: Order,
    pub product_names: Vec<String>,
}

pub fn customer_orders(
    services: &AppServices,
    customer: UserId,
) -> DomainResult<Vec<CustomerOrder>> {
    let mut orders = services
        .orders
        .query("by-user", &customer.to_string())
        .map_err(internal)?;
    orders.reverse();

    let mut out = Vec::with_capacity(orders.len());
    for order in orders {
        let product_names = resolve_product_names(services, &order)?;
        out.push(CustomerOrder { order, product_names });
    }
    Ok(out)
}

pub fn get_order(
    services: &AppServices,
    principal: &Principal,
    id: OrderId,
) -> DomainResult<Order> {
    let order = load_order(services, id)?;

    let involved = order.customer == principal.user || order.delivery_boy == Some(principal.user);
    if !involved && !principal.is_admin() {
        return Err(DomainError::forbidden("order belongs to another user"));
    }
    Ok(order)
}

pub fn set_order_status(
    services: &AppServices,
    principal: &Principal,
    id: OrderId,
    requested: OrderStatus,
    delivery_boy: Option<UserId>,
) -> DomainResult<Order> {
    let order = load_order(services, id)?;

    authorize_transition(order.status, requested, principal.role)?;

    // Shipping needs a valid delivery assignee.
    let mut assign = None;
    if requested == OrderStatus::Shipped {
        let assignee =
            delivery_boy.ok_or_else(|| DomainError::validation("delivery_boy is required"))?;
        let user = services
            .users
            .get(&assignee)
            .map_err(internal)?
            .ok_or_else(|| DomainError::not_found(format!("user {assignee}")))?;
        if user.role != Role::DeliveryBoy {
            return Err(DomainError::validation(
                "delivery boy must have the DeliveryBoy role",
            ));
        }
        assign = Some(assignee);
    }

    let current = order.status;
    let check = move |o: &Order| o.status == current;
    let mut apply = |o: &mut Order| {
        o.status = requested;
        if let Some(assignee) = assign {
            o.delivery_boy = Some(assignee);
        }
    };
    services
        .orders
        .update_if(&id, &check, &mut apply)
        .map_err(|e| match e {
            StoreError::ConditionFailed(_) => {
                DomainError::conflict("order status changed concurrently")
            }
            StoreError::NotFound => DomainError::not_found(format!("order {id}")),
            other => internal(other),
        })
}

#[derive(Debug, Serialize)]
pub struct AdminOrderRow {
    #[serde(flatten)]
    pub order: Order,
    pub customer_email: Option<String>,
    pub product_names: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AdminOrderListing {
    pub items: Vec<AdminOrderRow>,
    pub page: Page,
    pub total_amount: u64,
}

pub fn admin_orders(
    services: &AppServices,
    principal: &Principal,
    filter: OrderFilter,
    sort: OrderSort,
    page: PageRequest,
) -> DomainResult<AdminOrderListing> {
    require_admin(principal)?;

    // A status filter is index-backed; everything else needs the full scan.
    let seed = match filter.status {
        Some(status) => services
            .orders
            .query("by-status", status.as_str())
            .map_err(internal)?,
        None => services.orders.scan().map_err(internal)?,
    };

    let mut hits = filter_orders(seed, &filter);
    sort_orders(&mut hits, sort);
    let amount = total_amount(&hits);
    let (page_items, page) = Page::slice(hits, page);

    let mut items = Vec::with_capacity(page_items.len());
    for order in page_items {
        let customer_email = services
            .users
            .get(&order.customer)
            .map_err(internal)?
            .map(|u| u.email);
        let product_names = resolve_product_names(services, &order)?;
        items.push(AdminOrderRow {
            order,
            customer_email,
            product_names,
        });
    }

    Ok(AdminOrderListing {
        items,
        page,
        total_amount: amount,
    })
}

#[derive(Debug, Serialize)]
pub struct AdminOrderDetails {
    pub order: Order,
    pub products: Vec<Product>,
    pub customer_email: Option<String>,
    pub shipping_address: Option<Address>,
}

pub fn admin_order_details(
    services: &AppServices,
    principal: &Principal,
    id: OrderId,
) -> DomainResult<AdminOrderDetails> {
    require_admin(principal)?;

    let order = load_order(services, id)?;

    let mut products = Vec::with_capacity(order.products.len());
    for product_id in &order.products {
        if let Some(product) = services.products.get(product_id).map_err(internal)? {
            products.push(product);
        }
    }

    let customer_email = services
        .users
        .get(&order.customer)
        .map_err(internal)?
        .map(|u| u.email);
    let shipping_address = services
        .addresses
        .get(&order.shipping_address)
        .map_err(internal)?;

    Ok(AdminOrderDetails {
        order,
        products,
        customer_email,
        shipping_address,
    })
}

fn load_order(services: &AppServices, id: OrderId) -> DomainResult<Order> {
    services
        .orders
        .get(&id)
        .map_err(internal)?
        .ok_or_else(|| DomainError::not_found(format!("order {id}")))
}

/// Fan-out read; products that no longer resolve are skipped.
fn resolve_product_names(services: &AppServices, order: &Order) -> DomainResult<Vec<String>> {
    let mut names = Vec::with_capacity(order.products.len());
    for product_id in &order.products {
        if let Some(product) = services.products.get(product_id).map_err(internal)? {
            names.push(product.name);
        }
    }
    Ok(names)
}
