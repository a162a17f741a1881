use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kidloop_core::{ContactId, DomainError, DomainResult, UserId};
use kidloop_store::{IndexEntry, Record};

/// All contacts share one index partition for "every inquiry, oldest first".
pub const ALL_CONTACTS_PARTITION: &str = "contact";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    Pending,
    InProgress,
    Resolved,
    Closed,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::Pending => "pending",
            ContactStatus::InProgress => "in_progress",
            ContactStatus::Resolved => "resolved",
            ContactStatus::Closed => "closed",
        }
    }
}

impl core::fmt::Display for ContactStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for ContactStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ContactStatus::Pending),
            "in_progress" => Ok(ContactStatus::InProgress),
            "resolved" => Ok(ContactStatus::Resolved),
            "closed" => Ok(ContactStatus::Closed),
            other => Err(DomainError::validation(format!(
                "unknown contact status: {other}"
            ))),
        }
    }
}

/// Inquiry workflow edges. Closed is terminal; earlier states may only move
/// forward.
pub fn allowed_transition(current: ContactStatus, requested: ContactStatus) -> bool {
    use ContactStatus::*;
    matches!(
        (current, requested),
        (Pending, InProgress | Resolved | Closed) | (InProgress, Resolved | Closed) | (Resolved, Closed)
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl ContactPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactPriority::Low => "low",
            ContactPriority::Medium => "medium",
            ContactPriority::High => "high",
            ContactPriority::Urgent => "urgent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactCategory {
    General,
    Support,
    Complaint,
    Suggestion,
    Business,
}

impl ContactCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactCategory::General => "general",
            ContactCategory::Support => "support",
            ContactCategory::Complaint => "complaint",
            ContactCategory::Suggestion => "suggestion",
            ContactCategory::Business => "business",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactSource {
    Website,
    MobileApp,
    Phone,
    Email,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
    pub category: ContactCategory,
    pub source: ContactSource,
    pub status: ContactStatus,
    pub priority: ContactPriority,
    pub is_read: bool,
    pub assigned_to: Option<UserId>,
    pub response: Option<String>,
    pub responded_by: Option<UserId>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
    pub category: Option<ContactCategory>,
    pub source: Option<ContactSource>,
}

impl Contact {
    pub fn create(id: ContactId, new: NewContact, now: DateTime<Utc>) -> DomainResult<Self> {
        if new.name.trim().is_empty() {
            return Err(DomainError::validation("name is required"));
        }
        if new.message.trim().is_empty() {
            return Err(DomainError::validation("message is required"));
        }

        Ok(Self {
            id,
            name: new.name,
            email: new.email,
            phone: new.phone,
            subject: new.subject,
            message: new.message,
            category: new.category.unwrap_or(ContactCategory::General),
            source: new.source.unwrap_or(ContactSource::Website),
            status: ContactStatus::Pending,
            priority: ContactPriority::Medium,
            is_read: false,
            assigned_to: None,
            response: None,
            responded_by: None,
            responded_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Record a response: marks read, stamps responder/time, and moves to the
    /// target status (default resolved).
    pub fn respond(
        &mut self,
        response: impl Into<String>,
        responded_by: UserId,
        target: Option<ContactStatus>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let target = target.unwrap_or(ContactStatus::Resolved);
        if !allowed_transition(self.status, target) {
            return Err(DomainError::invariant(format!(
                "no transition from '{}' to '{target}'",
                self.status
            )));
        }

        self.response = Some(response.into());
        self.responded_by = Some(responded_by);
        self.responded_at = Some(now);
        self.is_read = true;
        self.status = target;
        self.updated_at = now;
        Ok(())
    }
}

impl Record for Contact {
    type Key = ContactId;
    const ENTITY: &'static str = "contact";

    fn key(&self) -> ContactId {
        self.id
    }

    fn index_entries(&self) -> Vec<IndexEntry> {
        let mut entries = vec![
            IndexEntry::new("by-kind", ALL_CONTACTS_PARTITION, self.created_at),
            IndexEntry::new("by-status", self.status.as_str(), self.created_at),
        ];
        if let Some(assignee) = self.assigned_to {
            entries.push(IndexEntry::new(
                "by-assignee",
                assignee.to_string(),
                self.created_at,
            ));
        }
        entries
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactFilter {
    pub status: Option<ContactStatus>,
    pub priority: Option<ContactPriority>,
    pub category: Option<ContactCategory>,
    pub assigned_to: Option<UserId>,
    /// Case-insensitive substring over name, email, subject and message.
    pub search: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

pub fn filter_contacts(contacts: Vec<Contact>, filter: &ContactFilter) -> Vec<Contact> {
    contacts
        .into_iter()
        .filter(|c| filter.status.is_none_or(|s| c.status == s))
        .filter(|c| filter.priority.is_none_or(|p| c.priority == p))
        .filter(|c| filter.category.is_none_or(|cat| c.category == cat))
        .filter(|c| filter.assigned_to.is_none_or(|a| c.assigned_to == Some(a)))
        .filter(|c| {
            filter.search.as_deref().is_none_or(|term| {
                let term = term.to_lowercase();
                c.name.to_lowercase().contains(&term)
                    || c.email.to_lowercase().contains(&term)
                    || c.subject.to_lowercase().contains(&term)
                    || c.message.to_lowercase().contains(&term)
            })
        })
        .filter(|c| filter.start_date.is_none_or(|start| c.created_at >= start))
        .filter(|c| filter.end_date.is_none_or(|end| c.created_at <= end))
        .collect()
}
