//! Client-side ticket state and its reconciliation with the service.
//!
//! [`TicketController`] owns the local ticket list together with the filter,
//! search and draft form state. Intents take `&self`, so several requests
//! may be in flight at once; the state lock is only taken around the local
//! mutation that follows each response, which makes the last response to
//! arrive win.
//!
//! Policies:
//! - Delete removes the ticket locally before the request is sent and puts
//!   it back at its old position if the request fails.
//! - Search never narrows the held tickets. It only changes the derived
//!   view, so clearing the query needs no refetch.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::{derive_view, ClientError, FilterCriteria, HttpTicketService, SearchQuery, TicketService};
use crate::config::ClientConfig;
use crate::ticket::{Priority, Ticket, TicketDraft};

/// Everything the presentation layer renders from.
#[derive(Debug, Clone, Default)]
pub struct ClientState {
    /// Tickets mirrored from the service, in service order. Ids are unique.
    pub tickets: Vec<Ticket>,
    pub filter: FilterCriteria,
    pub search: SearchQuery,
    /// Submission form contents.
    pub draft: TicketDraft,
    /// Message of the most recent failed intent, cleared by the next success.
    pub last_error: Option<String>,
}

impl ClientState {
    /// The tickets to display.
    pub fn view(&self) -> Vec<Ticket> {
        derive_view(&self.tickets, &self.filter, &self.search)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.tickets.iter().position(|t| t.id == id)
    }

    fn record_failure(&mut self, action: &str, error: &ClientError) {
        warn!(action, error = %error, "Ticket request failed");
        self.last_error = Some(format!("Failed to {}: {}", action, error));
    }
}

/// Holds the local ticket view and applies user intents against a [`TicketService`].
pub struct TicketController {
    service: Arc<dyn TicketService>,
    state: RwLock<ClientState>,
}

impl TicketController {
    /// Controller with empty state. Nothing is fetched until [`load`](Self::load)
    /// runs; use [`connect`](Self::connect) to load on construction.
    pub fn new(service: Arc<dyn TicketService>) -> Self {
        Self {
            service,
            state: RwLock::new(ClientState::default()),
        }
    }

    /// Controller talking HTTP to the configured service. Like [`new`](Self::new),
    /// this does not load.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(Arc::new(HttpTicketService::from_config(config)))
    }

    /// Controller that has already run its initial load.
    ///
    /// A failed load still yields a controller: the ticket list stays empty
    /// and the failure is available from [`last_error`](Self::last_error).
    pub async fn connect(service: Arc<dyn TicketService>) -> Self {
        let controller = Self::new(service);
        // Failure is recorded in the state
        let _ = controller.load().await;
        controller
    }

    // ============================================================================
    // Intents
    // ============================================================================

    /// Replace the local tickets with the service's full list.
    ///
    /// Returns the number of tickets now held. On failure the held tickets
    /// are left as they were.
    pub async fn load(&self) -> Result<usize, ClientError> {
        match self.service.list_tickets().await {
            Ok(tickets) => {
                let tickets = dedup_by_id(tickets);
                let count = tickets.len();

                let mut state = self.state.write().await;
                state.tickets = tickets;
                state.last_error = None;

                info!(count, "Loaded tickets");
                Ok(count)
            }
            Err(e) => {
                self.state.write().await.record_failure("load tickets", &e);
                Err(e)
            }
        }
    }

    /// Put `draft` in the form and submit it.
    pub async fn create(&self, draft: TicketDraft) -> Result<Ticket, ClientError> {
        self.state.write().await.draft = draft;
        self.submit_draft().await
    }

    /// Submit the draft currently held in the form.
    ///
    /// On success the stored ticket is appended and the form is reset,
    /// unless it was edited while the request was in flight. On failure the
    /// form keeps its contents.
    pub async fn submit_draft(&self) -> Result<Ticket, ClientError> {
        let draft = self.state.read().await.draft.clone();

        match self.service.create_ticket(&draft).await {
            Ok(ticket) => {
                let mut state = self.state.write().await;
                match state.position(&ticket.id) {
                    // A concurrent load already brought it in
                    Some(index) => state.tickets[index] = ticket.clone(),
                    None => state.tickets.push(ticket.clone()),
                }
                if state.draft == draft {
                    state.draft = TicketDraft::default();
                }
                state.last_error = None;

                info!(ticket_id = %ticket.id, "Created ticket");
                Ok(ticket)
            }
            Err(e) => {
                self.state.write().await.record_failure("create ticket", &e);
                Err(e)
            }
        }
    }

    /// Delete a ticket, hiding it immediately and restoring it if the service refuses.
    pub async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let removed = {
            let mut state = self.state.write().await;
            state
                .position(id)
                .map(|index| (index, state.tickets.remove(index)))
        };

        match self.service.delete_ticket(id).await {
            Ok(()) => {
                self.state.write().await.last_error = None;
                info!(ticket_id = %id, "Deleted ticket");
                Ok(())
            }
            Err(e) => {
                let mut state = self.state.write().await;
                if let Some((index, ticket)) = removed {
                    if state.position(&ticket.id).is_none() {
                        let index = index.min(state.tickets.len());
                        state.tickets.insert(index, ticket);
                        debug!(ticket_id = %id, index, "Restored ticket after failed delete");
                    }
                }
                state.record_failure("delete ticket", &e);
                Err(e)
            }
        }
    }

    /// Change a ticket's priority.
    ///
    /// The local copy takes the priority echoed by the service; nothing else
    /// about it changes and it keeps its place in the list.
    pub async fn update_priority(&self, id: &str, priority: Priority) -> Result<Ticket, ClientError> {
        match self.service.update_ticket_priority(id, priority).await {
            Ok(updated) => {
                let mut state = self.state.write().await;
                match state.tickets.iter_mut().find(|t| t.id == id) {
                    Some(ticket) => ticket.priority = updated.priority,
                    None => debug!(ticket_id = %id, "Updated ticket is no longer held locally"),
                }
                state.last_error = None;

                info!(ticket_id = %id, priority = %updated.priority, "Updated ticket priority");
                Ok(updated)
            }
            Err(e) => {
                self.state.write().await.record_failure("update priority", &e);
                Err(e)
            }
        }
    }

    /// Replace the filter criteria.
    pub async fn set_filter(&self, criteria: FilterCriteria) {
        self.state.write().await.filter = criteria;
    }

    /// Set the search text. Only the derived view changes.
    pub async fn search(&self, query: &str) {
        let query = SearchQuery::new(query);
        debug!(needle = query.needle(), "Search updated");
        self.state.write().await.search = query;
    }

    // ============================================================================
    // Form
    // ============================================================================

    /// Replace the form contents.
    pub async fn set_draft(&self, draft: TicketDraft) {
        self.state.write().await.draft = draft;
    }

    /// Edit the form contents in place.
    pub async fn update_draft(&self, edit: impl FnOnce(&mut TicketDraft)) {
        edit(&mut self.state.write().await.draft);
    }

    // ============================================================================
    // Reads
    // ============================================================================

    /// The tickets to display, in list order.
    pub async fn view(&self) -> Vec<Ticket> {
        self.state.read().await.view()
    }

    /// All tickets held locally, ignoring filter and search.
    pub async fn tickets(&self) -> Vec<Ticket> {
        self.state.read().await.tickets.clone()
    }

    pub async fn filter(&self) -> FilterCriteria {
        self.state.read().await.filter
    }

    pub async fn search_query(&self) -> SearchQuery {
        self.state.read().await.search.clone()
    }

    pub async fn draft(&self) -> TicketDraft {
        self.state.read().await.draft.clone()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.read().await.last_error.clone()
    }

    /// Copy of the whole state.
    pub async fn snapshot(&self) -> ClientState {
        self.state.read().await.clone()
    }
}

/// Keep the first ticket for each id, preserving order.
fn dedup_by_id(tickets: Vec<Ticket>) -> Vec<Ticket> {
    let mut seen = HashSet::new();
    tickets
        .into_iter()
        .filter(|t| seen.insert(t.id.clone()))
        .collect()
}
