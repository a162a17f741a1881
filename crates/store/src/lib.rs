//! `kidloop-store` — infrastructure ports and in-memory implementations.
//!
//! The service stores everything in one logical table per entity kind with a
//! primary key and secondary (inverted) indexes, in the shape of a DynamoDB
//! single-table layout. Production adapters would live here next to the
//! in-memory ones.

pub mod error;
pub mod media;
pub mod password;
pub mod record;
pub mod table;

pub use error::{StoreError, StoreResult};
pub use media::{ImageStore, InMemoryImageStore};
pub use password::Sha256PasswordHasher;
pub use record::{IndexEntry, Record};
pub use table::{InMemoryTable, Table};
