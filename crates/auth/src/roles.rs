use serde::{Deserialize, Serialize};

use kidloop_core::DomainError;

/// Role tag attached to every user account.
///
/// This is a flat tag, not a hierarchy: `Admin` does not implicitly hold the
/// other roles. Transition tables list every permitted role explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Customer,
    Seller,
    Admin,
    DeliveryBoy,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "Customer",
            Role::Seller => "Seller",
            Role::Admin => "Admin",
            Role::DeliveryBoy => "DeliveryBoy",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Customer" => Ok(Role::Customer),
            "Seller" => Ok(Role::Seller),
            "Admin" => Ok(Role::Admin),
            "DeliveryBoy" => Ok(Role::DeliveryBoy),
            other => Err(DomainError::validation(format!("unknown role: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_string() {
        for role in [Role::Customer, Role::Seller, Role::Admin, Role::DeliveryBoy] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_is_a_validation_error() {
        assert!(matches!(
            "Superuser".parse::<Role>(),
            Err(DomainError::Validation(_))
        ));
    }
}
