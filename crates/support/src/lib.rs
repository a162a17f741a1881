//! `kidloop-support` — contact/support inquiries.
//!
//! A simpler sibling of the order/product workflows: the same
//! entity-plus-transition-table pattern, with its own status set and no role
//! variety (every mutation is admin-gated at the API layer).

pub mod contact;
pub mod stats;

pub use contact::{
    Contact, ContactCategory, ContactFilter, ContactPriority, ContactSource, ContactStatus,
    NewContact, allowed_transition, filter_contacts,
};
pub use stats::{ContactStats, contact_stats};
