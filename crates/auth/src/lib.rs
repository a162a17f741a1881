//! `kidloop-auth` — authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage. Password
//! hashing is a port (`PasswordHasher`); the concrete implementation lives in
//! the infrastructure crate.

pub mod claims;
pub mod password;
pub mod roles;
pub mod token;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use password::PasswordHasher;
pub use roles::Role;
pub use token::{Hs256TokenCodec, TokenCodec, TokenError, TokenPair};
