//! The ticket service seen from the client side.

use async_trait::async_trait;

use super::ClientError;
use crate::ticket::{Priority, Ticket, TicketDraft};

/// Remote operations the client controller relies on.
///
/// Every call is one request; implementations must not retry.
#[async_trait]
pub trait TicketService: Send + Sync {
    /// Fetch every ticket, in service order.
    async fn list_tickets(&self) -> Result<Vec<Ticket>, ClientError>;

    /// Submit a draft and return the stored ticket (with id and status).
    async fn create_ticket(&self, draft: &TicketDraft) -> Result<Ticket, ClientError>;

    /// Remove a ticket.
    async fn delete_ticket(&self, id: &str) -> Result<(), ClientError>;

    /// Change a ticket's priority and return the updated ticket.
    async fn update_ticket_priority(
        &self,
        id: &str,
        priority: Priority,
    ) -> Result<Ticket, ClientError>;
}
