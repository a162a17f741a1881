use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failure.
///
/// Kept separate from `DomainError`: services decide how a store failure
/// surfaces (a missing row is NotFound on a read path but a Conflict guard
/// on a conditional write path).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The keyed item does not exist.
    #[error("item not found")]
    NotFound,

    /// A conditional write (insert-if-absent or compare-and-swap) failed.
    #[error("condition failed: {0}")]
    ConditionFailed(String),

    /// The store is unusable (poisoned lock, corrupt state).
    #[error("store corrupt: {0}")]
    Corrupt(String),
}
