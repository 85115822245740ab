use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, RwLock};

use ethicic_site::contact::ContactPipeline;
use ethicic_site::content::tickets::{SupportTicket, TicketStore, TicketStoreError};
use ethicic_site::content::{ContentStore, SiteContent};
use metrics_exporter_prometheus::PrometheusHandle;
use minijinja::Environment;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) content: Arc<RwLock<SiteContent>>,
    pub(crate) pipeline: Arc<ContactPipeline>,
    pub(crate) templates: Arc<Environment<'static>>,
    pub(crate) media_root: PathBuf,
}

/// Ticket store backed by the shared in-memory snapshot, flushed to the
/// content store on every save so a restart never loses a submission.
pub(crate) struct SharedTicketStore {
    content: Arc<RwLock<SiteContent>>,
    store: ContentStore,
}

impl SharedTicketStore {
    pub(crate) fn new(content: Arc<RwLock<SiteContent>>, store: ContentStore) -> Self {
        Self { content, store }
    }
}

impl TicketStore for SharedTicketStore {
    fn save(&self, mut ticket: SupportTicket) -> Result<SupportTicket, TicketStoreError> {
        let mut content = self
            .content
            .write()
            .map_err(|err| TicketStoreError::Unavailable(err.to_string()))?;
        if ticket.id == 0 {
            ticket.id = content.tickets.len() as u64 + 1;
            content.tickets.push(ticket.clone());
        } else {
            match content
                .tickets
                .iter_mut()
                .find(|existing| existing.id == ticket.id)
            {
                Some(existing) => *existing = ticket.clone(),
                None => return Err(TicketStoreError::NotFound { id: ticket.id }),
            }
        }
        self.store
            .save(&content)
            .map_err(|err| TicketStoreError::Unavailable(err.to_string()))?;
        Ok(ticket)
    }

    fn get(&self, id: u64) -> Result<SupportTicket, TicketStoreError> {
        self.content
            .read()
            .map_err(|err| TicketStoreError::Unavailable(err.to_string()))?
            .tickets
            .iter()
            .find(|ticket| ticket.id == id)
            .cloned()
            .ok_or(TicketStoreError::NotFound { id })
    }

    fn all(&self) -> Result<Vec<SupportTicket>, TicketStoreError> {
        Ok(self
            .content
            .read()
            .map_err(|err| TicketStoreError::Unavailable(err.to_string()))?
            .tickets
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_store_persists_tickets_across_reloads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ContentStore::new(dir.path().join("content.json"));
        let content = Arc::new(RwLock::new(store.load().expect("bootstraps")));
        let tickets = SharedTicketStore::new(content, store.clone());

        let saved = tickets
            .save(SupportTicket::new(
                "Pat",
                "pat@example.com",
                "Hello",
                "A long enough message.",
            ))
            .expect("saves");
        assert_eq!(saved.id, 1);

        let reloaded = store.load().expect("loads");
        assert_eq!(reloaded.tickets.len(), 1);
        assert_eq!(reloaded.tickets[0].email, "pat@example.com");
    }

    #[test]
    fn updating_a_missing_ticket_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ContentStore::new(dir.path().join("content.json"));
        let content = Arc::new(RwLock::new(store.load().expect("bootstraps")));
        let tickets = SharedTicketStore::new(content, store);

        let mut ticket = SupportTicket::new("Pat", "pat@example.com", "Hi", "Message body here.");
        ticket.id = 42;
        let err = tickets.save(ticket).expect_err("missing");
        assert!(matches!(err, TicketStoreError::NotFound { id: 42 }));
    }
}
