//! Offline content ingestion jobs.
//!
//! Every job is idempotent by natural key (title or slug): re-running an
//! import against the same input counts the existing records as skipped
//! instead of duplicating them. Jobs commit per batch and skip individual
//! malformed records rather than aborting the run.

pub mod ddq_markdown;
pub mod fixtures;
pub mod performance;
pub mod rewrite;
pub mod text;
pub mod wordpress;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::content::tree::TreeError;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("xml parse error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("json parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv parse error: {0}")]
    Csv(#[from] csv::Error),
    #[error("page tree error: {0}")]
    Tree(#[from] TreeError),
    #[error("no live {kind} index page to import under")]
    MissingIndex { kind: &'static str },
    #[error("malformed record: {0}")]
    Malformed(String),
}

/// Outcome counts for one import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl ImportSummary {
    pub fn merge(&mut self, other: ImportSummary) {
        self.created += other.created;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "created {}, skipped {}, failed {}",
            self.created, self.skipped, self.failed
        )
    }
}
