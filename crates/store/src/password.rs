//! Dev implementation of the password-hashing port.
//!
//! Salted SHA-256 in the form `salt$digest` (both hex). Good enough for the
//! in-memory stack; a production deployment swaps in a KDF behind the same
//! port.

use rand::RngCore;
use sha2::{Digest, Sha256};

use kidloop_auth::PasswordHasher;
use kidloop_core::{DomainError, DomainResult};

#[derive(Debug, Default)]
pub struct Sha256PasswordHasher;

impl Sha256PasswordHasher {
    pub fn new() -> Self {
        Self
    }

    fn digest(salt: &[u8], plaintext: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(plaintext.as_bytes());
        hex(&hasher.finalize())
    }
}

fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

fn unhex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

impl PasswordHasher for Sha256PasswordHasher {
    fn hash(&self, plaintext: &str) -> DomainResult<String> {
        let mut salt = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt);
        Ok(format!("{}${}", hex(&salt), Self::digest(&salt, plaintext)))
    }

    fn verify(&self, plaintext: &str, stored: &str) -> DomainResult<bool> {
        let (salt_hex, digest_hex) = stored
            .split_once('$')
            .ok_or_else(|| DomainError::internal("malformed password hash"))?;
        let salt =
            unhex(salt_hex).ok_or_else(|| DomainError::internal("malformed password salt"))?;
        Ok(Self::digest(&salt, plaintext) == digest_hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let hasher = Sha256PasswordHasher::new();
        let stored = hasher.hash("hunter2").unwrap();
        assert!(hasher.verify("hunter2", &stored).unwrap());
        assert!(!hasher.verify("hunter3", &stored).unwrap());
    }

    #[test]
    fn same_password_hashes_differently_per_salt() {
        let hasher = Sha256PasswordHasher::new();
        let a = hasher.hash("hunter2").unwrap();
        let b = hasher.hash("hunter2").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn corrupt_stored_hash_is_an_internal_error() {
        let hasher = Sha256PasswordHasher::new();
        assert!(hasher.verify("x", "no-separator").is_err());
    }
}
