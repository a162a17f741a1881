use kidloop_core::DomainResult;

/// Password hashing boundary.
///
/// Hash format and algorithm are deliberately outside this crate; the
/// infrastructure crate supplies the implementation and the services only see
/// this port.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> DomainResult<String>;

    /// Constant-shape verify: returns Ok(false) for a mismatch, Err only for
    /// corrupt stored material.
    fn verify(&self, plaintext: &str, stored: &str) -> DomainResult<bool>;
}
