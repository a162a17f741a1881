use kidloop_auth::Role;
use kidloop_core::UserId;

/// Authenticated identity for a request, derived from the bearer token.
///
/// This is immutable and must be present for all non-public routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user: UserId,
    pub email: String,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
