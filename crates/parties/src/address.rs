use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kidloop_core::{AddressId, DomainError, DomainResult, UserId};
use kidloop_store::{IndexEntry, Record};

/// Delivery/pickup address owned by a user.
///
/// Products and orders reference addresses by id with no referential
/// integrity: deleting an address neither cascades nor blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub user: UserId,
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub created_at: DateTime<Utc>,
}

/// Creation payload (everything but the generated id/timestamp).
#[derive(Debug, Clone, Deserialize)]
pub struct NewAddress {
    pub full_name: String,
    pub phone: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// Partial update; `None` fields are left as-is.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressPatch {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

impl Address {
    pub fn create(
        id: AddressId,
        user: UserId,
        new: NewAddress,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        for (field, value) in [
            ("full_name", &new.full_name),
            ("line1", &new.line1),
            ("city", &new.city),
            ("postal_code", &new.postal_code),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::validation(format!("{field} is required")));
            }
        }

        Ok(Self {
            id,
            user,
            full_name: new.full_name,
            phone: new.phone,
            line1: new.line1,
            line2: new.line2,
            city: new.city,
            state: new.state,
            postal_code: new.postal_code,
            created_at,
        })
    }

    pub fn apply(&mut self, patch: AddressPatch) {
        if let Some(v) = patch.full_name {
            self.full_name = v;
        }
        if let Some(v) = patch.phone {
            self.phone = v;
        }
        if let Some(v) = patch.line1 {
            self.line1 = v;
        }
        if let Some(v) = patch.line2 {
            self.line2 = Some(v);
        }
        if let Some(v) = patch.city {
            self.city = v;
        }
        if let Some(v) = patch.state {
            self.state = v;
        }
        if let Some(v) = patch.postal_code {
            self.postal_code = v;
        }
    }
}

impl Record for Address {
    type Key = AddressId;
    const ENTITY: &'static str = "address";

    fn key(&self) -> AddressId {
        self.id
    }

    fn index_entries(&self) -> Vec<IndexEntry> {
        vec![IndexEntry::new(
            "by-user",
            self.user.to_string(),
            self.created_at,
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_address() -> NewAddress {
        NewAddress {
            full_name: "Asha Rao".to_string(),
            phone: "9999999999".to_string(),
            line1: "12 MG Road".to_string(),
            line2: None,
            city: "Bengaluru".to_string(),
            state: "KA".to_string(),
            postal_code: "560001".to_string(),
        }
    }

    #[test]
    fn create_requires_line1() {
        let mut new = new_address();
        new.line1 = "  ".to_string();
        assert!(matches!(
            Address::create(AddressId::new(), UserId::new(), new, Utc::now()),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn patch_only_touches_provided_fields() {
        let mut address =
            Address::create(AddressId::new(), UserId::new(), new_address(), Utc::now()).unwrap();
        address.apply(AddressPatch {
            city: Some("Mysuru".to_string()),
            ..AddressPatch::default()
        });
        assert_eq!(address.city, "Mysuru");
        assert_eq!(address.line1, "12 MG Road");
    }
}
