//! The contact submission pipeline.
//!
//! Ordering matters: validate, rate-limit, persist the ticket, notify the
//! firm, auto-reply, CRM upsert. A firm-notification failure aborts the
//! success path but the ticket is already saved; auto-reply and CRM failures
//! are logged and swallowed so the visitor still sees success.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use minijinja::{context, Environment};
use tracing::{info, warn};

use super::crm::{CrmContact, CrmDirectory};
use super::form::{ContactSubmission, FieldError};
use super::mailer::{Mailer, MailerError, OutboundEmail};
use super::rate_limit::FixedWindowLimiter;
use crate::config::MailConfig;
use crate::content::blocks::strip_tags;
use crate::content::tickets::{SupportTicket, TicketStore, TicketStoreError};

/// Flash message shown after a successful submission.
pub const SUCCESS_MESSAGE: &str =
    "Thank you for your message! We will get back to you within 24 hours.";

const USER_AGENT_CHARS: usize = 200;

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error("invalid submission: {}", join_errors(.errors))]
    Invalid { errors: Vec<FieldError> },
    #[error("too many submissions; retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
    #[error(transparent)]
    Store(#[from] TicketStoreError),
    #[error(transparent)]
    Notification(#[from] MailerError),
    #[error("email template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Request metadata recorded with the submission.
#[derive(Debug, Clone, Default)]
pub struct SubmissionMeta {
    pub client_ip: String,
    pub user_agent: String,
}

/// What the handler gets back on success.
#[derive(Debug, Clone)]
pub struct ContactReceipt {
    pub ticket: SupportTicket,
    pub message: &'static str,
}

pub struct ContactPipeline {
    store: Arc<dyn TicketStore>,
    mailer: Arc<dyn Mailer>,
    crm: Option<Arc<dyn CrmDirectory>>,
    limiter: FixedWindowLimiter,
    mail: MailConfig,
    templates: Environment<'static>,
}

impl ContactPipeline {
    pub fn new(
        store: Arc<dyn TicketStore>,
        mailer: Arc<dyn Mailer>,
        crm: Option<Arc<dyn CrmDirectory>>,
        mail: MailConfig,
        max_submissions: u32,
        window: Duration,
    ) -> Result<Self, ContactError> {
        let mut templates = Environment::new();
        templates.add_template(
            "contact_notification.html",
            include_str!("../../templates/contact_notification.html"),
        )?;
        templates.add_template(
            "contact_autoreply.html",
            include_str!("../../templates/contact_autoreply.html"),
        )?;
        Ok(Self {
            store,
            mailer,
            crm,
            limiter: FixedWindowLimiter::new(max_submissions, window),
            mail,
            templates,
        })
    }

    /// Run one submission through the whole pipeline.
    pub fn submit(
        &self,
        submission: &ContactSubmission,
        meta: &SubmissionMeta,
    ) -> Result<ContactReceipt, ContactError> {
        submission
            .validate()
            .map_err(|errors| ContactError::Invalid { errors })?;
        self.limiter
            .check(&meta.client_ip)
            .map_err(|retry_after_secs| ContactError::RateLimited { retry_after_secs })?;

        let mut ticket = SupportTicket::new(
            submission.name.trim(),
            submission.email.trim(),
            submission.subject.trim(),
            submission.message.trim(),
        );
        ticket.ticket_type = submission.ticket_type();
        ticket.company = submission.company();
        let ticket = self.store.save(ticket)?;
        info!(ticket = ticket.id, email = %ticket.email, "contact ticket saved");

        // Failure here is surfaced: the firm must learn about the submission.
        self.notify_firm(&ticket, meta)?;

        if let Err(err) = self.auto_reply(&ticket) {
            warn!(ticket = ticket.id, error = %err, "auto-reply failed");
        }
        if let Some(crm) = &self.crm {
            let contact = CrmContact::from_submission(
                &ticket.name,
                &ticket.email,
                ticket.company.as_deref(),
                &ticket.subject,
                &ticket.message,
            );
            if let Err(err) = crm.upsert(contact) {
                warn!(ticket = ticket.id, error = %err, "crm upsert failed");
            }
        }

        Ok(ContactReceipt {
            ticket,
            message: SUCCESS_MESSAGE,
        })
    }

    fn notify_firm(
        &self,
        ticket: &SupportTicket,
        meta: &SubmissionMeta,
    ) -> Result<(), ContactError> {
        let user_agent: String = meta.user_agent.chars().take(USER_AGENT_CHARS).collect();
        let html_body = self
            .templates
            .get_template("contact_notification.html")?
            .render(context! {
                name => ticket.name,
                email => ticket.email,
                subject => ticket.subject,
                message => ticket.message,
                ticket_id => ticket.id,
                client_ip => meta.client_ip,
                user_agent => user_agent,
                submitted_at => Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            })?;
        let email = OutboundEmail {
            to: self.mail.firm_inbox.clone(),
            from: self.mail.default_from.clone(),
            reply_to: Some(ticket.email.clone()),
            subject: format!("Contact Form: {} - {}", ticket.subject, ticket.name),
            text_body: strip_tags(&html_body),
            html_body,
        };
        self.mailer.send(&email)?;
        Ok(())
    }

    fn auto_reply(&self, ticket: &SupportTicket) -> Result<(), ContactError> {
        let html_body = self
            .templates
            .get_template("contact_autoreply.html")?
            .render(context! {
                name => ticket.name,
                subject => ticket.subject,
            })?;
        let email = OutboundEmail {
            to: ticket.email.clone(),
            from: self.mail.default_from.clone(),
            reply_to: None,
            subject: "We received your message".to_string(),
            text_body: strip_tags(&html_body),
            html_body,
        };
        self.mailer.send(&email)?;
        Ok(())
    }
}
