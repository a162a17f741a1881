//! Admin order listing: filter, sort and totals over a materialized set.
//!
//! The search filter must run after the full fan-out (it matches fields the
//! index cannot cover), so the set is always materialized before paging.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use kidloop_core::DomainError;

use crate::order::{Order, OrderStatus};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Case-insensitive substring over order id, customer id and payment id.
    pub search: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderSort {
    #[default]
    Newest,
    Oldest,
    AmountHighToLow,
    AmountLowToHigh,
}

impl core::str::FromStr for OrderSort {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(OrderSort::Newest),
            "oldest" => Ok(OrderSort::Oldest),
            "amount-high-to-low" => Ok(OrderSort::AmountHighToLow),
            "amount-low-to-high" => Ok(OrderSort::AmountLowToHigh),
            other => Err(DomainError::validation(format!("unknown sort: {other}"))),
        }
    }
}

pub fn filter_orders(orders: Vec<Order>, filter: &OrderFilter) -> Vec<Order> {
    orders
        .into_iter()
        .filter(|o| filter.status.is_none_or(|s| o.status == s))
        .filter(|o| {
            filter.search.as_deref().is_none_or(|term| {
                let term = term.to_lowercase();
                o.id.to_string().to_lowercase().contains(&term)
                    || o.customer.to_string().to_lowercase().contains(&term)
                    || o.payment_id.to_lowercase().contains(&term)
            })
        })
        .filter(|o| filter.start_date.is_none_or(|start| o.placed_at >= start))
        .filter(|o| filter.end_date.is_none_or(|end| o.placed_at <= end))
        .collect()
}

pub fn sort_orders(orders: &mut [Order], sort: OrderSort) {
    match sort {
        OrderSort::Newest => orders.sort_by_key(|o| std::cmp::Reverse(o.placed_at)),
        OrderSort::Oldest => orders.sort_by_key(|o| o.placed_at),
        OrderSort::AmountHighToLow => orders.sort_by_key(|o| std::cmp::Reverse(o.amount)),
        OrderSort::AmountLowToHigh => orders.sort_by_key(|o| o.amount),
    }
}

/// Sum of amounts over the filtered (pre-pagination) set.
pub fn total_amount(orders: &[Order]) -> u64 {
    orders.iter().map(|o| o.amount).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use kidloop_core::{AddressId, OrderId, ProductId, UserId};

    fn order(amount: u64, age_days: i64, payment_id: &str) -> Order {
        let placed_at = Utc::now() - Duration::days(age_days);
        Order {
            id: OrderId::new(),
            customer: UserId::new(),
            products: vec![ProductId::new()],
            amount,
            status: OrderStatus::Pending,
            shipping_address: AddressId::new(),
            payment_status: "Paid".to_string(),
            payment_id: payment_id.to_string(),
            placed_at,
            expected_delivery: placed_at + Duration::days(5),
            image: "defaultImage.png".to_string(),
            delivery_boy: None,
        }
    }

    #[test]
    fn search_matches_payment_id() {
        let orders = vec![order(100, 0, "PAY-alpha"), order(200, 0, "PAY-beta")];
        let filter = OrderFilter {
            search: Some("ALPHA".to_string()),
            ..OrderFilter::default()
        };
        let hits = filter_orders(orders, &filter);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].payment_id, "PAY-alpha");
    }

    #[test]
    fn date_range_is_inclusive_on_both_ends() {
        let orders = vec![order(1, 0, "a"), order(2, 5, "b"), order(3, 10, "c")];
        let filter = OrderFilter {
            start_date: Some(Utc::now() - Duration::days(6)),
            end_date: Some(Utc::now() - Duration::days(4)),
            ..OrderFilter::default()
        };
        let hits = filter_orders(orders, &filter);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].amount, 2);
    }

    #[test]
    fn amount_sort_orders_by_value() {
        let mut orders = vec![order(50, 0, "a"), order(150, 0, "b"), order(100, 0, "c")];
        sort_orders(&mut orders, OrderSort::AmountHighToLow);
        let amounts: Vec<_> = orders.iter().map(|o| o.amount).collect();
        assert_eq!(amounts, vec![150, 100, 50]);
    }

    #[test]
    fn totals_cover_the_whole_filtered_set() {
        let orders = vec![order(50, 0, "a"), order(150, 0, "b")];
        assert_eq!(total_amount(&orders), 200);
    }
}
