//! Support tickets created by inbound contact, and the storage seam for them.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketType {
    #[default]
    Contact,
    Newsletter,
    Onboarding,
    GardenInterest,
}

impl TicketType {
    pub const fn label(self) -> &'static str {
        match self {
            TicketType::Contact => "Contact Form",
            TicketType::Newsletter => "Newsletter Signup",
            TicketType::Onboarding => "Onboarding Request",
            TicketType::GardenInterest => "Garden Platform Interest",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    New,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub const fn label(self) -> &'static str {
        match self {
            TicketStatus::New => "New",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::Resolved => "Resolved",
            TicketStatus::Closed => "Closed",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TicketPriority {
    pub const fn label(self) -> &'static str {
        match self {
            TicketPriority::Low => "Low",
            TicketPriority::Medium => "Medium",
            TicketPriority::High => "High",
            TicketPriority::Urgent => "Urgent",
        }
    }
}

/// Persistent record of one inbound contact submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportTicket {
    pub id: u64,
    pub ticket_type: TicketType,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    pub subject: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    /// Internal staff notes, never shown to the visitor.
    #[serde(default)]
    pub notes: String,
}

impl SupportTicket {
    /// Fresh `new`-status ticket; `updated_at` starts equal to `created_at`.
    pub fn new(name: &str, email: &str, subject: &str, message: &str) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            ticket_type: TicketType::Contact,
            status: TicketStatus::New,
            priority: TicketPriority::Medium,
            name: name.to_string(),
            email: email.to_string(),
            company: None,
            subject: subject.to_string(),
            message: message.to_string(),
            created_at: now,
            updated_at: now,
            resolved_at: None,
            notes: String::new(),
        }
    }

    /// Status transition; bumps `updated_at` so it never trails `created_at`
    /// and stamps `resolved_at` the first time the ticket is resolved.
    pub fn set_status(&mut self, status: TicketStatus) {
        self.status = status;
        self.updated_at = Utc::now().max(self.created_at);
        if status == TicketStatus::Resolved && self.resolved_at.is_none() {
            self.resolved_at = Some(self.updated_at);
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TicketStoreError {
    #[error("ticket {id} not found")]
    NotFound { id: u64 },
    #[error("ticket store unavailable: {0}")]
    Unavailable(String),
}

/// Storage seam for tickets. The in-process implementation below backs tests
/// and the default deployment; a database-backed one can slot in without
/// touching the pipeline.
pub trait TicketStore: Send + Sync {
    fn save(&self, ticket: SupportTicket) -> Result<SupportTicket, TicketStoreError>;
    fn get(&self, id: u64) -> Result<SupportTicket, TicketStoreError>;
    fn all(&self) -> Result<Vec<SupportTicket>, TicketStoreError>;
}

/// Mutex-guarded in-memory store.
#[derive(Debug, Default)]
pub struct InMemoryTicketStore {
    inner: Mutex<Vec<SupportTicket>>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TicketStore for InMemoryTicketStore {
    fn save(&self, mut ticket: SupportTicket) -> Result<SupportTicket, TicketStoreError> {
        let mut tickets = self
            .inner
            .lock()
            .map_err(|err| TicketStoreError::Unavailable(err.to_string()))?;
        if ticket.id == 0 {
            ticket.id = tickets.len() as u64 + 1;
            tickets.push(ticket.clone());
        } else {
            match tickets.iter_mut().find(|existing| existing.id == ticket.id) {
                Some(existing) => *existing = ticket.clone(),
                None => return Err(TicketStoreError::NotFound { id: ticket.id }),
            }
        }
        Ok(ticket)
    }

    fn get(&self, id: u64) -> Result<SupportTicket, TicketStoreError> {
        self.inner
            .lock()
            .map_err(|err| TicketStoreError::Unavailable(err.to_string()))?
            .iter()
            .find(|ticket| ticket.id == id)
            .cloned()
            .ok_or(TicketStoreError::NotFound { id })
    }

    fn all(&self) -> Result<Vec<SupportTicket>, TicketStoreError> {
        Ok(self
            .inner
            .lock()
            .map_err(|err| TicketStoreError::Unavailable(err.to_string()))?
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_assigns_sequential_ids() {
        let store = InMemoryTicketStore::new();
        let a = store
            .save(SupportTicket::new("A", "a@example.com", "hi", "message"))
            .expect("saves");
        let b = store
            .save(SupportTicket::new("B", "b@example.com", "hi", "message"))
            .expect("saves");
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(store.all().expect("all").len(), 2);
    }

    #[test]
    fn save_with_existing_id_updates_in_place() {
        let store = InMemoryTicketStore::new();
        let mut ticket = store
            .save(SupportTicket::new("A", "a@example.com", "hi", "message"))
            .expect("saves");
        ticket.set_status(TicketStatus::Resolved);
        store.save(ticket.clone()).expect("updates");
        let fetched = store.get(ticket.id).expect("found");
        assert_eq!(fetched.status, TicketStatus::Resolved);
        assert!(fetched.updated_at >= fetched.created_at);
        assert_eq!(fetched.resolved_at, Some(fetched.updated_at));
    }

    #[test]
    fn updating_an_unknown_id_fails() {
        let store = InMemoryTicketStore::new();
        let mut ticket = SupportTicket::new("A", "a@example.com", "hi", "message");
        ticket.id = 42;
        assert!(matches!(
            store.save(ticket),
            Err(TicketStoreError::NotFound { id: 42 })
        ));
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(TicketType::Contact.label(), "Contact Form");
        assert_eq!(TicketType::GardenInterest.label(), "Garden Platform Interest");
        assert_eq!(TicketStatus::InProgress.label(), "In Progress");
        assert_eq!(TicketPriority::Urgent.label(), "Urgent");
    }

    #[test]
    fn new_tickets_serialize_with_the_legacy_vocabulary() {
        let ticket = SupportTicket::new("Pat", "pat@example.com", "hi", "message");
        let json = serde_json::to_value(&ticket).expect("serializes");
        assert_eq!(json["status"], "new");
        assert_eq!(json["priority"], "medium");
        assert_eq!(json["ticket_type"], "contact");

        let garden: TicketType =
            serde_json::from_str("\"garden_interest\"").expect("known ticket type");
        assert_eq!(garden, TicketType::GardenInterest);
        let medium: TicketPriority = serde_json::from_str("\"medium\"").expect("known priority");
        assert_eq!(medium, TicketPriority::Medium);
    }
}
