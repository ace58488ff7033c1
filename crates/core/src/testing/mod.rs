//! Testing utilities: an in-memory ticket service and ticket fixtures.

mod mock_ticket_service;

pub use mock_ticket_service::{MockTicketService, ServiceCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{TimeZone, Utc};

    use crate::ticket::{Priority, Ticket, TicketStatus};

    /// Create an open, low-priority ticket.
    pub fn ticket(id: &str, title: &str) -> Ticket {
        ticket_with(id, title, TicketStatus::Open, Priority::Low)
    }

    /// Create a ticket with the given status and priority.
    pub fn ticket_with(id: &str, title: &str, status: TicketStatus, priority: Priority) -> Ticket {
        // Fixed timestamp so fixtures compare equal across calls
        let created_at = Utc
            .with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        Ticket {
            id: id.to_string(),
            title: title.to_string(),
            description: format!("Description of {}", title.to_lowercase()),
            created_by: "tester".to_string(),
            priority,
            status,
            created_at,
            updated_at: created_at,
        }
    }

    /// `ticket-1` .. `ticket-n`, titled `Ticket 1` .. `Ticket n`.
    pub fn tickets(n: usize) -> Vec<Ticket> {
        (1..=n)
            .map(|i| ticket(&format!("ticket-{}", i), &format!("Ticket {}", i)))
            .collect()
    }
}
