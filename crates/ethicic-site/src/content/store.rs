//! File-backed persistence for the whole site.
//!
//! Ingestion jobs and the server both run against the same JSON snapshot, so
//! a command-line import is visible to the next server start without any
//! shared database. Writes land in a temp file first and are renamed into
//! place, so a crash mid-save never leaves a truncated snapshot.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::fields::{
    BlogIndexFields, EncyclopediaIndexFields, FaqIndexFields, HomeFields, PageBody,
    StrategyListFields,
};
use super::site_config::SiteConfiguration;
use super::tickets::SupportTicket;
use super::tree::PageTree;
use crate::error::SiteError;

/// Everything the site persists: the page tree, tickets, and the singleton
/// site configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteContent {
    pub tree: PageTree,
    pub tickets: Vec<SupportTicket>,
    pub site_config: SiteConfiguration,
}

impl SiteContent {
    /// Minimal working site: a home root with the standard index pages
    /// published underneath it.
    pub fn bootstrap() -> Result<Self, SiteError> {
        let mut tree = PageTree::new();
        let root = tree.create_root("Ethical Capital", PageBody::Home(HomeFields::fallback()))?;
        for (title, body) in [
            ("Blog", PageBody::BlogIndex(BlogIndexFields::default())),
            ("FAQ", PageBody::FaqIndex(FaqIndexFields::default())),
            (
                "Encyclopedia",
                PageBody::EncyclopediaIndex(EncyclopediaIndexFields::default()),
            ),
            (
                "Strategies",
                PageBody::StrategyList(StrategyListFields::default()),
            ),
        ] {
            let id = tree.add_child(root, title, body)?;
            tree.publish(id)?;
        }
        Ok(Self {
            tree,
            tickets: Vec::new(),
            site_config: SiteConfiguration::default(),
        })
    }
}

/// Loads and saves [`SiteContent`] at a configured path.
#[derive(Debug, Clone)]
pub struct ContentStore {
    path: PathBuf,
}

impl ContentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the snapshot, bootstrapping (and persisting) a default skeleton
    /// when the file does not exist yet.
    pub fn load(&self) -> Result<SiteContent, SiteError> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "content database absent, bootstrapping");
            let content = SiteContent::bootstrap()?;
            self.save(&content)?;
            return Ok(content);
        }
        let raw = fs::read_to_string(&self.path)?;
        serde_json::from_str(&raw)
            .map_err(|err| SiteError::Store(format!("{}: {err}", self.path.display())))
    }

    /// Persist atomically: write a sibling temp file, then rename over the
    /// target.
    pub fn save(&self, content: &SiteContent) -> Result<(), SiteError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(content)
            .map_err(|err| SiteError::Store(err.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(raw.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Load, apply `mutate`, save, and return the mutation's output.
    pub fn update<T>(
        &self,
        mutate: impl FnOnce(&mut SiteContent) -> Result<T, SiteError>,
    ) -> Result<T, SiteError> {
        let mut content = self.load()?;
        let out = mutate(&mut content)?;
        self.save(&content)?;
        Ok(out)
    }
}
