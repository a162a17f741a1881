//! Catalog listing: filter and sort over a materialized product set.
//!
//! The public listing queries the all-products partition and then narrows in
//! memory; everything here is pure so the service layer stays thin.

use serde::Deserialize;

use kidloop_core::DomainError;

use crate::product::{Product, ProductStatus, SellType};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    pub status: Option<ProductStatus>,
    /// Case-insensitive substring over name, description and category.
    pub search: Option<String>,
    pub category: Option<String>,
    pub condition: Option<String>,
    pub age_group: Option<String>,
    pub sell_type: Option<SellType>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSort {
    PriceLowToHigh,
    PriceHighToLow,
    NameAToZ,
    NameZToA,
    Oldest,
    #[default]
    Newest,
}

impl core::str::FromStr for ProductSort {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price-low-to-high" => Ok(ProductSort::PriceLowToHigh),
            "price-high-to-low" => Ok(ProductSort::PriceHighToLow),
            "name-a-to-z" => Ok(ProductSort::NameAToZ),
            "name-z-to-a" => Ok(ProductSort::NameZToA),
            "oldest" => Ok(ProductSort::Oldest),
            "newest" => Ok(ProductSort::Newest),
            other => Err(DomainError::validation(format!("unknown sort: {other}"))),
        }
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

pub fn filter_products(products: Vec<Product>, filter: &ProductFilter) -> Vec<Product> {
    products
        .into_iter()
        .filter(|p| filter.status.is_none_or(|s| p.status == s))
        .filter(|p| {
            filter.search.as_deref().is_none_or(|term| {
                let term = term.to_lowercase();
                p.name.to_lowercase().contains(&term)
                    || p.description.to_lowercase().contains(&term)
                    || p.category.to_lowercase().contains(&term)
            })
        })
        .filter(|p| {
            filter
                .category
                .as_deref()
                .is_none_or(|c| eq_ignore_case(&p.category, c))
        })
        .filter(|p| {
            filter
                .condition
                .as_deref()
                .is_none_or(|c| eq_ignore_case(&p.condition, c))
        })
        .filter(|p| {
            filter
                .age_group
                .as_deref()
                .is_none_or(|a| eq_ignore_case(&p.age_group, a))
        })
        .filter(|p| filter.sell_type.is_none_or(|s| p.sell_type == s))
        .filter(|p| filter.min_price.is_none_or(|min| p.current_price >= min))
        .filter(|p| filter.max_price.is_none_or(|max| p.current_price <= max))
        .collect()
}

pub fn sort_products(products: &mut [Product], sort: ProductSort) {
    match sort {
        ProductSort::PriceLowToHigh => products.sort_by_key(|p| p.current_price),
        ProductSort::PriceHighToLow => {
            products.sort_by_key(|p| std::cmp::Reverse(p.current_price))
        }
        ProductSort::NameAToZ => products.sort_by(|a, b| a.name.cmp(&b.name)),
        ProductSort::NameZToA => products.sort_by(|a, b| b.name.cmp(&a.name)),
        ProductSort::Oldest => products.sort_by_key(|p| p.created_at),
        ProductSort::Newest => products.sort_by_key(|p| std::cmp::Reverse(p.created_at)),
    }
}

/// Admin moderation view: everything that has not finished the consignment
/// flow.
pub fn is_unapproved(product: &Product) -> bool {
    product.status != ProductStatus::Completed
}
