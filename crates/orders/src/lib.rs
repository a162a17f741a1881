//! `kidloop-orders` — order lifecycle: placement, delivery workflow, admin
//! listing.

pub mod listing;
pub mod order;

pub use listing::{OrderFilter, OrderSort, filter_orders, sort_orders, total_amount};
pub use order::{IdempotencyRecord, Order, OrderStatus, authorize_transition, transition_roles};
