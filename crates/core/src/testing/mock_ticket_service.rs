//! Mock ticket service for testing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{watch, RwLock};

use crate::client::{ClientError, TicketService};
use crate::ticket::{Priority, Ticket, TicketDraft, TicketStatus};

/// A recorded service call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCall {
    List,
    Create(TicketDraft),
    Delete(String),
    UpdatePriority { id: String, priority: Priority },
}

/// In-memory implementation of the TicketService trait.
///
/// Provides controllable behavior for testing:
/// - Serve and mutate a configurable ticket list
/// - Track calls for assertions
/// - Fail the next call with a chosen error
/// - Hold calls in flight until resumed
///
/// # Example
///
/// ```rust,ignore
/// use ticketdesk_core::testing::{fixtures, MockTicketService};
///
/// let service = Arc::new(MockTicketService::with_tickets(fixtures::tickets(3)));
/// let controller = TicketController::new(service.clone());
///
/// service.fail_next(ClientError::Network("down".into())).await;
/// assert!(controller.load().await.is_err());
/// assert_eq!(service.call_count().await, 1);
/// ```
#[derive(Debug)]
pub struct MockTicketService {
    tickets: Arc<RwLock<Vec<Ticket>>>,
    calls: Arc<RwLock<Vec<ServiceCall>>>,
    /// If set, the next call will fail with this error.
    next_error: Arc<RwLock<Option<ClientError>>>,
    /// If set, priority updates store and echo this value instead of the requested one.
    echo_priority: Arc<RwLock<Option<Priority>>>,
    /// `true` while calls are held before doing any work.
    paused: watch::Sender<bool>,
    next_id: AtomicU64,
}

impl Default for MockTicketService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTicketService {
    /// Create a mock service with no tickets.
    pub fn new() -> Self {
        Self::with_tickets(Vec::new())
    }

    /// Create a mock service serving the given tickets.
    pub fn with_tickets(tickets: Vec<Ticket>) -> Self {
        let (paused, _) = watch::channel(false);
        Self {
            tickets: Arc::new(RwLock::new(tickets)),
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            echo_priority: Arc::new(RwLock::new(None)),
            paused,
            next_id: AtomicU64::new(1),
        }
    }

    /// Replace the served tickets.
    pub async fn set_tickets(&self, tickets: Vec<Ticket>) {
        *self.tickets.write().await = tickets;
    }

    /// Tickets currently held by the service.
    pub async fn tickets(&self) -> Vec<Ticket> {
        self.tickets.read().await.clone()
    }

    /// Make the next call fail.
    pub async fn fail_next(&self, error: ClientError) {
        *self.next_error.write().await = Some(error);
    }

    /// Store and echo `priority` on updates regardless of what was requested.
    pub async fn echo_priority(&self, priority: Option<Priority>) {
        *self.echo_priority.write().await = priority;
    }

    /// Hold every call after it is recorded until [`resume`](Self::resume).
    pub fn pause(&self) {
        self.paused.send_replace(true);
    }

    /// Release held calls.
    pub fn resume(&self) {
        self.paused.send_replace(false);
    }

    /// Calls received so far, in order.
    pub async fn calls(&self) -> Vec<ServiceCall> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Record the call, wait while paused, then surface any injected error.
    async fn begin(&self, call: ServiceCall) -> Result<(), ClientError> {
        self.calls.write().await.push(call);

        let mut rx = self.paused.subscribe();
        // The sender lives in self, so the channel cannot close here
        let _ = rx.wait_for(|paused| !*paused).await;

        match self.next_error.write().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn not_found(id: &str) -> ClientError {
        ClientError::Service {
            status: 404,
            message: format!("Ticket not found: {}", id),
        }
    }
}

#[async_trait]
impl TicketService for MockTicketService {
    async fn list_tickets(&self) -> Result<Vec<Ticket>, ClientError> {
        self.begin(ServiceCall::List).await?;
        Ok(self.tickets.read().await.clone())
    }

    async fn create_ticket(&self, draft: &TicketDraft) -> Result<Ticket, ClientError> {
        self.begin(ServiceCall::Create(draft.clone())).await?;

        let now = Utc::now();
        let ticket = Ticket {
            id: format!("mock-{}", self.next_id.fetch_add(1, Ordering::SeqCst)),
            title: draft.title.clone(),
            description: draft.description.clone(),
            created_by: draft.created_by.clone(),
            priority: draft.priority,
            status: TicketStatus::Open,
            created_at: now,
            updated_at: now,
        };
        self.tickets.write().await.push(ticket.clone());
        Ok(ticket)
    }

    async fn delete_ticket(&self, id: &str) -> Result<(), ClientError> {
        self.begin(ServiceCall::Delete(id.to_string())).await?;

        let mut tickets = self.tickets.write().await;
        let index = tickets
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        tickets.remove(index);
        Ok(())
    }

    async fn update_ticket_priority(
        &self,
        id: &str,
        priority: Priority,
    ) -> Result<Ticket, ClientError> {
        self.begin(ServiceCall::UpdatePriority {
            id: id.to_string(),
            priority,
        })
        .await?;

        let stored = self.echo_priority.read().await.unwrap_or(priority);
        let mut tickets = self.tickets.write().await;
        let ticket = tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Self::not_found(id))?;
        ticket.priority = stored;
        ticket.updated_at = Utc::now();
        Ok(ticket.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_records_calls_in_order() {
        let service = MockTicketService::with_tickets(fixtures::tickets(1));

        service.list_tickets().await.unwrap();
        service.delete_ticket("ticket-1").await.unwrap();

        assert_eq!(
            service.calls().await,
            vec![ServiceCall::List, ServiceCall::Delete("ticket-1".to_string())]
        );
        assert!(service.tickets().await.is_empty());
    }

    #[tokio::test]
    async fn test_fail_next_applies_once() {
        let service = MockTicketService::new();
        service.fail_next(ClientError::Network("down".into())).await;

        assert!(service.list_tickets().await.is_err());
        assert!(service.list_tickets().await.is_ok());
    }

    #[tokio::test]
    async fn test_create_assigns_distinct_ids() {
        let service = MockTicketService::new();
        let draft = TicketDraft::new("a", "b", "c");

        let first = service.create_ticket(&draft).await.unwrap();
        let second = service.create_ticket(&draft).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.status, TicketStatus::Open);
    }

    #[tokio::test]
    async fn test_paused_call_waits_for_resume() {
        let service = Arc::new(MockTicketService::new());
        service.pause();

        let task = {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.list_tickets().await })
        };
        while service.call_count().await == 0 {
            tokio::task::yield_now().await;
        }
        assert!(!task.is_finished());

        service.resume();
        assert!(task.await.unwrap().is_ok());
    }
}
