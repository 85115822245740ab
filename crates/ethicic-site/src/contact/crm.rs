//! Optional CRM directory seam, fed best-effort after a submission lands.

use std::sync::Mutex;

pub const CRM_SOURCE: &str = "Website Contact Form";
const NOTE_MESSAGE_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct CrmContact {
    pub name: String,
    pub email: String,
    /// `Some` overwrites the directory's stored company; `None` leaves it
    /// untouched.
    pub company: Option<String>,
    pub source: String,
    pub notes: String,
}

impl CrmContact {
    /// Notes carry the subject plus the head of the message so a CRM entry is
    /// useful without opening the ticket.
    pub fn from_submission(
        name: &str,
        email: &str,
        company: Option<&str>,
        subject: &str,
        message: &str,
    ) -> Self {
        let head: String = message.chars().take(NOTE_MESSAGE_CHARS).collect();
        Self {
            name: name.to_string(),
            email: email.to_string(),
            company: company.map(str::to_string),
            source: CRM_SOURCE.to_string(),
            notes: format!("{subject}\n\n{head}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("crm upsert failed: {0}")]
pub struct CrmError(pub String);

pub trait CrmDirectory: Send + Sync {
    fn upsert(&self, contact: CrmContact) -> Result<(), CrmError>;
}

/// Captures upserts for assertions.
#[derive(Debug, Default)]
pub struct RecordingCrm {
    contacts: Mutex<Vec<CrmContact>>,
}

impl RecordingCrm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contacts(&self) -> Vec<CrmContact> {
        self.contacts
            .lock()
            .map(|contacts| contacts.clone())
            .unwrap_or_default()
    }
}

impl CrmDirectory for RecordingCrm {
    fn upsert(&self, contact: CrmContact) -> Result<(), CrmError> {
        self.contacts
            .lock()
            .map_err(|err| CrmError(err.to_string()))?
            .push(contact);
        Ok(())
    }
}

/// Fails every upsert; used to show CRM failures never surface.
#[derive(Debug, Default)]
pub struct FailingCrm;

impl CrmDirectory for FailingCrm {
    fn upsert(&self, _contact: CrmContact) -> Result<(), CrmError> {
        Err(CrmError("directory offline".into()))
    }
}
