//! Contact inquiries: public intake plus the admin workflow (listing,
//! transitions, responses, stats, bulk actions).

use chrono::Utc;
use serde::Serialize;

use kidloop_core::{ContactId, DomainError, DomainResult, Page, PageRequest, UserId};
use kidloop_store::StoreError;
use kidloop_support::{
    Contact, ContactFilter, ContactPriority, ContactStats, ContactStatus, NewContact,
    allowed_transition, contact_stats, filter_contacts,
};

use crate::context::Principal;

use super::{AppServices, internal, require_admin};

pub fn create_contact(services: &AppServices, new: NewContact) -> DomainResult<Contact> {
    let contact = Contact::create(ContactId::new(), new, Utc::now())?;
    services.contacts.insert(contact.clone()).map_err(internal)?;
    Ok(contact)
}

pub fn list_contacts(
    services: &AppServices,
    principal: &Principal,
    filter: ContactFilter,
    page: PageRequest,
) -> DomainResult<(Vec<Contact>, Page)> {
    require_admin(principal)?;

    // A status filter is index-backed; everything else needs the full scan.
    let seed = match filter.status {
        Some(status) => services
            .contacts
            .query("by-status", status.as_str())
            .map_err(internal)?,
        None => services.contacts.scan().map_err(internal)?,
    };

    let mut hits = filter_contacts(seed, &filter);
    hits.sort_by_key(|c| std::cmp::Reverse(c.created_at));
    Ok(Page::slice(hits, page))
}

pub fn get_contact(
    services: &AppServices,
    principal: &Principal,
    id: ContactId,
) -> DomainResult<Contact> {
    require_admin(principal)?;
    load_contact(services, id)
}

pub struct ContactStatusChange {
    pub status: ContactStatus,
    pub priority: Option<ContactPriority>,
    pub assigned_to: Option<UserId>,
    pub response: Option<String>,
}

pub fn set_contact_status(
    services: &AppServices,
    principal: &Principal,
    id: ContactId,
    change: ContactStatusChange,
) -> DomainResult<Contact> {
    require_admin(principal)?;
    transition_contact(services, principal.user, id, change)
}

pub fn respond(
    services: &AppServices,
    principal: &Principal,
    id: ContactId,
    response: String,
    target: Option<ContactStatus>,
) -> DomainResult<Contact> {
    require_admin(principal)?;

    let contact = load_contact(services, id)?;

    // Validate on a draft first; the apply closure cannot fail.
    let mut draft = contact.clone();
    draft.respond(response, principal.user, target, Utc::now())?;

    replace_if_status(services, id, contact.status, draft)
}

pub fn mark_read(
    services: &AppServices,
    principal: &Principal,
    id: ContactId,
) -> DomainResult<Contact> {
    require_admin(principal)?;
    mark_read_inner(services, id)
}

/// Soft delete: the inquiry is closed, never removed from the store.
pub fn soft_delete(
    services: &AppServices,
    principal: &Principal,
    id: ContactId,
) -> DomainResult<Contact> {
    require_admin(principal)?;
    soft_delete_inner(services, principal.user, id)
}

pub fn stats(services: &AppServices, principal: &Principal) -> DomainResult<ContactStats> {
    require_admin(principal)?;
    let all = services.contacts.scan().map_err(internal)?;
    Ok(contact_stats(&all))
}

pub enum BulkAction {
    MarkRead,
    ChangeStatus(ContactStatus),
    Assign(UserId),
    Delete,
}

#[derive(Debug, Serialize)]
pub struct BulkOutcome {
    pub id: ContactId,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn bulk(
    services: &AppServices,
    principal: &Principal,
    action: BulkAction,
    ids: &[ContactId],
) -> DomainResult<Vec<BulkOutcome>> {
    require_admin(principal)?;

    let outcomes = ids
        .iter()
        .map(|id| {
            let result = match &action {
                BulkAction::MarkRead => mark_read_inner(services, *id),
                BulkAction::ChangeStatus(status) => transition_contact(
                    services,
                    principal.user,
                    *id,
                    ContactStatusChange {
                        status: *status,
                        priority: None,
                        assigned_to: None,
                        response: None,
                    },
                ),
                BulkAction::Assign(assignee) => assign_inner(services, *id, *assignee),
                BulkAction::Delete => soft_delete_inner(services, principal.user, *id),
            };
            BulkOutcome {
                id: *id,
                ok: result.is_ok(),
                error: result.err().map(|e| e.to_string()),
            }
        })
        .collect();

    Ok(outcomes)
}

fn transition_contact(
    services: &AppServices,
    actor: UserId,
    id: ContactId,
    change: ContactStatusChange,
) -> DomainResult<Contact> {
    let contact = load_contact(services, id)?;

    if !allowed_transition(contact.status, change.status) {
        return Err(DomainError::invariant(format!(
            "no transition from '{}' to '{}'",
            contact.status, change.status
        )));
    }

    let mut draft = contact.clone();
    let now = Utc::now();
    draft.status = change.status;
    draft.updated_at = now;
    if let Some(priority) = change.priority {
        draft.priority = priority;
    }
    if let Some(assignee) = change.assigned_to {
        draft.assigned_to = Some(assignee);
    }
    if let Some(response) = change.response {
        draft.response = Some(response);
        draft.responded_by = Some(actor);
        draft.responded_at = Some(now);
    }

    replace_if_status(services, id, contact.status, draft)
}

fn mark_read_inner(services: &AppServices, id: ContactId) -> DomainResult<Contact> {
    let mut apply = |c: &mut Contact| {
        c.is_read = true;
        c.updated_at = Utc::now();
    };
    services
        .contacts
        .update(&id, &mut apply)
        .map_err(|e| match e {
            StoreError::NotFound => DomainError::not_found(format!("contact {id}")),
            other => internal(other),
        })
}

fn assign_inner(services: &AppServices, id: ContactId, assignee: UserId) -> DomainResult<Contact> {
    let mut apply = |c: &mut Contact| {
        c.assigned_to = Some(assignee);
        c.updated_at = Utc::now();
    };
    services
        .contacts
        .update(&id, &mut apply)
        .map_err(|e| match e {
            StoreError::NotFound => DomainError::not_found(format!("contact {id}")),
            other => internal(other),
        })
}

fn soft_delete_inner(
    services: &AppServices,
    actor: UserId,
    id: ContactId,
) -> DomainResult<Contact> {
    transition_contact(
        services,
        actor,
        id,
        ContactStatusChange {
            status: ContactStatus::Closed,
            priority: None,
            assigned_to: None,
            response: None,
        },
    )
}

fn load_contact(services: &AppServices, id: ContactId) -> DomainResult<Contact> {
    services
        .contacts
        .get(&id)
        .map_err(internal)?
        .ok_or_else(|| DomainError::not_found(format!("contact {id}")))
}

/// Compare-and-swap replacement keyed on the status the caller validated.
fn replace_if_status(
    services: &AppServices,
    id: ContactId,
    expected: ContactStatus,
    draft: Contact,
) -> DomainResult<Contact> {
    let check = move |c: &Contact| c.status == expected;
    let mut draft = Some(draft);
    let mut apply = |c: &mut Contact| {
        if let Some(draft) = draft.take() {
            *c = draft;
        }
    };
    services
        .contacts
        .update_if(&id, &check, &mut apply)
        .map_err(|e| match e {
            StoreError::ConditionFailed(_) => {
                DomainError::conflict("contact status changed concurrently")
            }
            StoreError::NotFound => DomainError::not_found(format!("contact {id}")),
            other => internal(other),
        })
}
