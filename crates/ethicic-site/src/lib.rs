//! Core library for the Ethical Capital public site: the CMS page tree and
//! its typed page bodies, content ingestion jobs, the contact pipeline, and
//! the DDQ-to-FAQ synchronizer. The HTTP service in `services/web` builds on
//! this crate.

pub mod config;
pub mod contact;
pub mod content;
pub mod ddq;
pub mod error;
pub mod ingest;
pub mod telemetry;

pub use error::SiteError;
