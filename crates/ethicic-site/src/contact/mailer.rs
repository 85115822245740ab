//! Outbound email seam.
//!
//! Transport is deployment-specific, so the pipeline only talks to the
//! [`Mailer`] trait. The logging and recording implementations here cover the
//! default deployment and tests.

use std::sync::Mutex;

use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundEmail {
    pub to: String,
    pub from: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

#[derive(Debug, thiserror::Error)]
#[error("mail delivery failed: {0}")]
pub struct MailerError(pub String);

pub trait Mailer: Send + Sync {
    fn send(&self, email: &OutboundEmail) -> Result<(), MailerError>;
}

/// Logs the email instead of delivering it.
#[derive(Debug, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, email: &OutboundEmail) -> Result<(), MailerError> {
        info!(to = %email.to, subject = %email.subject, "outbound email (log transport)");
        Ok(())
    }
}

/// Captures sent email for assertions.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutboundEmail>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, email: &OutboundEmail) -> Result<(), MailerError> {
        self.sent
            .lock()
            .map_err(|err| MailerError(err.to_string()))?
            .push(email.clone());
        Ok(())
    }
}

/// Fails every send; used to exercise the pipeline's failure paths.
#[derive(Debug, Default)]
pub struct FailingMailer;

impl Mailer for FailingMailer {
    fn send(&self, _email: &OutboundEmail) -> Result<(), MailerError> {
        Err(MailerError("transport unavailable".into()))
    }
}
