//! `kidloop-catalog` — product listings and the product status workflow.

pub mod listing;
pub mod product;

pub use listing::{ProductFilter, ProductSort, filter_products, is_unapproved, sort_products};
pub use product::{
    ALL_PRODUCTS_PARTITION, NewProduct, Product, ProductImage, ProductStatus, SellType,
    authorize_transition, transition_roles,
};
