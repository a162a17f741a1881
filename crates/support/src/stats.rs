use std::collections::BTreeMap;

use serde::Serialize;

use crate::contact::{Contact, ContactStatus};

/// Aggregate counters for the admin dashboard, computed from a full scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub closed: usize,
    pub unread: usize,
    pub by_category: BTreeMap<String, usize>,
    pub by_priority: BTreeMap<String, usize>,
}

pub fn contact_stats(contacts: &[Contact]) -> ContactStats {
    let mut stats = ContactStats {
        total: contacts.len(),
        ..ContactStats::default()
    };

    for contact in contacts {
        match contact.status {
            ContactStatus::Pending => stats.pending += 1,
            ContactStatus::InProgress => stats.in_progress += 1,
            ContactStatus::Resolved => stats.resolved += 1,
            ContactStatus::Closed => stats.closed += 1,
        }
        if !contact.is_read {
            stats.unread += 1;
        }

        *stats
            .by_category
            .entry(contact.category.as_str().to_owned())
            .or_default() += 1;
        *stats
            .by_priority
            .entry(contact.priority.as_str().to_owned())
            .or_default() += 1;
    }

    stats
}
