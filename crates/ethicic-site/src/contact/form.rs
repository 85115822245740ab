//! Contact form binding and validation.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::content::tickets::TicketType;

pub const MIN_MESSAGE_CHARS: usize = 10;

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"))
}

/// Raw form fields as posted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    /// Optional; never validated.
    pub company: Option<String>,
    pub subject: String,
    pub message: String,
    pub ticket_type: Option<TicketType>,
}

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl ContactSubmission {
    /// Validate every field, collecting all failures rather than stopping at
    /// the first.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError {
                field: "name",
                message: "name is required",
            });
        }
        let email = self.email.trim();
        if email.is_empty() {
            errors.push(FieldError {
                field: "email",
                message: "email is required",
            });
        } else if !email_re().is_match(email) {
            errors.push(FieldError {
                field: "email",
                message: "enter a valid email address",
            });
        }
        if self.subject.trim().is_empty() {
            errors.push(FieldError {
                field: "subject",
                message: "subject is required",
            });
        }
        if self.message.trim().chars().count() < MIN_MESSAGE_CHARS {
            errors.push(FieldError {
                field: "message",
                message: "message must be at least 10 characters",
            });
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn ticket_type(&self) -> TicketType {
        self.ticket_type.unwrap_or(TicketType::Contact)
    }

    /// Trimmed company name, with blank values treated as absent.
    pub fn company(&self) -> Option<String> {
        self.company
            .as_deref()
            .map(str::trim)
            .filter(|company| !company.is_empty())
            .map(str::to_string)
    }
}
