//! Accounts and addresses: register/login, password changes, address book.

use chrono::Utc;

use kidloop_auth::{Role, TokenPair};
use kidloop_core::{AddressId, DomainError, DomainResult, UserId};
use kidloop_parties::{Address, AddressPatch, NewAddress, UserAccount};
use kidloop_store::StoreError;

use crate::context::Principal;

use super::{AppServices, internal, require_admin};

pub fn register(
    services: &AppServices,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> DomainResult<(UserAccount, TokenPair)> {
    let existing = services.users.query("by-email", email).map_err(internal)?;
    if !existing.is_empty() {
        return Err(DomainError::conflict("email already registered"));
    }

    let hash = services.passwords.hash(password)?;
    let user = UserAccount::new(UserId::new(), name, email, hash, role, Utc::now())?;
    services.users.insert(user.clone()).map_err(|e| match e {
        StoreError::ConditionFailed(_) => DomainError::conflict("email already registered"),
        other => internal(other),
    })?;

    let tokens = issue(services, &user)?;
    Ok((user, tokens))
}

pub fn login(
    services: &AppServices,
    email: &str,
    password: &str,
) -> DomainResult<(UserAccount, TokenPair)> {
    // Unknown email and bad password are indistinguishable on purpose.
    let invalid = || DomainError::forbidden("invalid credentials");

    let user = services
        .users
        .query("by-email", email)
        .map_err(internal)?
        .into_iter()
        .next()
        .ok_or_else(invalid)?;

    if !services.passwords.verify(password, &user.password_hash)? {
        return Err(invalid());
    }

    let tokens = issue(services, &user)?;
    Ok((user, tokens))
}

fn issue(services: &AppServices, user: &UserAccount) -> DomainResult<TokenPair> {
    services
        .tokens
        .issue_pair(user.id, &user.email, user.role, Utc::now())
        .map_err(|e| DomainError::internal(e.to_string()))
}

pub fn change_password(
    services: &AppServices,
    user: UserId,
    current: &str,
    new: &str,
) -> DomainResult<()> {
    let account = services
        .users
        .get(&user)
        .map_err(internal)?
        .ok_or_else(|| DomainError::not_found(format!("user {user}")))?;

    if !services.passwords.verify(current, &account.password_hash)? {
        return Err(DomainError::forbidden("invalid credentials"));
    }

    let hash = services.passwords.hash(new)?;
    let mut apply = |u: &mut UserAccount| u.password_hash = hash.clone();
    services.users.update(&user, &mut apply).map_err(internal)?;
    Ok(())
}

pub fn list_users(
    services: &AppServices,
    principal: &Principal,
    role: Option<Role>,
) -> DomainResult<Vec<UserAccount>> {
    require_admin(principal)?;

    let mut users = match role {
        Some(role) => services
            .users
            .query("by-role", role.as_str())
            .map_err(internal)?,
        None => services.users.scan().map_err(internal)?,
    };
    users.sort_by_key(|u| u.created_at);
    Ok(users)
}

pub fn create_address(
    services: &AppServices,
    user: UserId,
    new: NewAddress,
) -> DomainResult<Address> {
    let address = Address::create(AddressId::new(), user, new, Utc::now())?;
    services.addresses.insert(address.clone()).map_err(internal)?;
    Ok(address)
}

pub fn list_addresses(services: &AppServices, user: UserId) -> DomainResult<Vec<Address>> {
    services
        .addresses
        .query("by-user", &user.to_string())
        .map_err(internal)
}

pub fn get_address(
    services: &AppServices,
    principal: &Principal,
    id: AddressId,
) -> DomainResult<Address> {
    let address = services
        .addresses
        .get(&id)
        .map_err(internal)?
        .ok_or_else(|| DomainError::not_found(format!("address {id}")))?;

    if address.user != principal.user && !principal.is_admin() {
        return Err(DomainError::forbidden("address belongs to another user"));
    }
    Ok(address)
}

pub fn update_address(
    services: &AppServices,
    principal: &Principal,
    id: AddressId,
    patch: AddressPatch,
) -> DomainResult<Address> {
    // Ownership check before the write.
    get_address(services, principal, id)?;

    let mut patch = Some(patch);
    let mut apply = |a: &mut Address| {
        if let Some(patch) = patch.take() {
            a.apply(patch);
        }
    };
    services.addresses.update(&id, &mut apply).map_err(internal)
}

pub fn delete_address(
    services: &AppServices,
    principal: &Principal,
    id: AddressId,
) -> DomainResult<()> {
    get_address(services, principal, id)?;
    services.addresses.delete(&id).map_err(internal)
}
