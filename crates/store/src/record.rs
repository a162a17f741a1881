use chrono::{DateTime, Utc};

/// One secondary-index entry for a record.
///
/// `partition` is the inverted-index partition key (owning user id, status,
/// or a fixed constant for "all items of this kind"); `sort_key` is the
/// creation timestamp, so partitions read back in chronological order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub index: &'static str,
    pub partition: String,
    pub sort_key: DateTime<Utc>,
}

impl IndexEntry {
    pub fn new(index: &'static str, partition: impl Into<String>, sort_key: DateTime<Utc>) -> Self {
        Self {
            index,
            partition: partition.into(),
            sort_key,
        }
    }
}

/// A typed row shape stored in a table.
///
/// Index entries are derived from the live record on every query, so an
/// entry whose partition is a mutable attribute (e.g. status) always
/// reflects the current value.
pub trait Record: Clone + Send + Sync + 'static {
    type Key: Clone + Eq + std::hash::Hash + Send + Sync + 'static;

    /// Entity tag used in logs and error messages.
    const ENTITY: &'static str;

    fn key(&self) -> Self::Key;

    fn index_entries(&self) -> Vec<IndexEntry>;
}
