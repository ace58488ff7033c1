//! Ticket storage trait and types.

use thiserror::Error;

use crate::ticket::{Priority, Ticket, TicketDraft, TicketPatch, TicketStatus};

/// Error type for ticket operations.
#[derive(Debug, Error)]
pub enum TicketError {
    /// Ticket not found.
    #[error("Ticket not found: {0}")]
    NotFound(String),

    /// Request rejected before reaching the database.
    #[error("Invalid ticket: {0}")]
    Validation(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl From<rusqlite::Error> for TicketError {
    fn from(e: rusqlite::Error) -> Self {
        TicketError::Database(e.to_string())
    }
}

/// Filter for querying tickets.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    /// Filter by status.
    pub status: Option<TicketStatus>,
    /// Filter by priority.
    pub priority: Option<Priority>,
}

impl TicketFilter {
    /// Create a filter matching every ticket.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter by status.
    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Filter by priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }
}

/// Trait for ticket storage backends.
pub trait TicketStore: Send + Sync {
    /// Create a new ticket. The store assigns the id and the initial status.
    fn create(&self, draft: TicketDraft) -> Result<Ticket, TicketError>;

    /// Get a ticket by ID.
    fn get(&self, id: &str) -> Result<Option<Ticket>, TicketError>;

    /// List tickets matching the filter, oldest first.
    fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, TicketError>;

    /// Count tickets matching the filter.
    fn count(&self, filter: &TicketFilter) -> Result<i64, TicketError>;

    /// Apply a partial update and return the updated ticket.
    fn update(&self, id: &str, patch: TicketPatch) -> Result<Ticket, TicketError>;

    /// Permanently delete a ticket.
    /// Returns the deleted ticket if found.
    fn delete(&self, id: &str) -> Result<Ticket, TicketError>;
}

/// Check the fields the store requires before inserting a draft.
pub fn validate_draft(draft: &TicketDraft) -> Result<(), TicketError> {
    if draft.title.trim().is_empty() {
        return Err(TicketError::Validation("title is required".to_string()));
    }
    if draft.description.trim().is_empty() {
        return Err(TicketError::Validation(
            "description is required".to_string(),
        ));
    }
    Ok(())
}
