//! Inbound contact handling: form validation, rate limiting, and the
//! submission pipeline with its mail and CRM seams.

pub mod crm;
pub mod form;
pub mod mailer;
pub mod pipeline;
pub mod rate_limit;

pub use crm::{CrmContact, CrmDirectory, CrmError};
pub use form::{ContactSubmission, FieldError};
pub use mailer::{LogMailer, Mailer, MailerError, OutboundEmail, RecordingMailer};
pub use pipeline::{
    ContactError, ContactPipeline, ContactReceipt, SubmissionMeta, SUCCESS_MESSAGE,
};
pub use rate_limit::{client_ip, FixedWindowLimiter};
