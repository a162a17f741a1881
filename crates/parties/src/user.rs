use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kidloop_auth::Role;
use kidloop_core::{DomainError, DomainResult, UserId};
use kidloop_store::{IndexEntry, Record};

/// A registered account. The role is a flat tag, not a hierarchy.
///
/// `password_hash` is opaque here; hashing/verification go through the
/// `PasswordHasher` port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        let email = email.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("name is required"));
        }
        if email.trim().is_empty() || !email.contains('@') {
            return Err(DomainError::validation("a valid email is required"));
        }

        Ok(Self {
            id,
            name,
            email,
            password_hash: password_hash.into(),
            role,
            created_at,
        })
    }
}

impl Record for UserAccount {
    type Key = UserId;
    const ENTITY: &'static str = "user";

    fn key(&self) -> UserId {
        self.id
    }

    fn index_entries(&self) -> Vec<IndexEntry> {
        vec![
            // Uniqueness check and login lookup.
            IndexEntry::new("by-email", self.email.clone(), self.created_at),
            // Admin "list users by role" view.
            IndexEntry::new("by-role", self.role.as_str(), self.created_at),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(email: &str) -> DomainResult<UserAccount> {
        UserAccount::new(
            UserId::new(),
            "Asha",
            email,
            "salt$digest",
            Role::Customer,
            Utc::now(),
        )
    }

    #[test]
    fn valid_account_builds() {
        assert!(account("asha@example.com").is_ok());
    }

    #[test]
    fn email_without_at_sign_is_rejected() {
        assert!(matches!(
            account("not-an-email"),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn indexes_cover_email_and_role() {
        let user = account("asha@example.com").unwrap();
        let entries = user.index_entries();
        assert!(entries.iter().any(|e| e.index == "by-email" && e.partition == "asha@example.com"));
        assert!(entries.iter().any(|e| e.index == "by-role" && e.partition == "Customer"));
    }
}
