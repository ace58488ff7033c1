//! Filter and search criteria, and the derived view they produce.

use std::str::FromStr;

use crate::ticket::{ParseEnumError, Priority, Ticket, TicketStatus};

/// Label used by the UI for "no constraint".
pub const ALL: &str = "All";

/// Status and priority constraints on the displayed tickets.
///
/// `None` means "All".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub status: Option<TicketStatus>,
    pub priority: Option<Priority>,
}

impl FilterCriteria {
    /// Criteria matching every ticket.
    pub fn all() -> Self {
        Self::default()
    }

    /// Only show tickets with this status.
    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Only show tickets with this priority.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Build criteria from UI selections such as `("Open", "All")`.
    pub fn parse(status: &str, priority: &str) -> Result<Self, ParseEnumError> {
        Ok(Self {
            status: parse_selection(status)?,
            priority: parse_selection(priority)?,
        })
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.status.is_none_or(|s| ticket.status == s)
            && self.priority.is_none_or(|p| ticket.priority == p)
    }
}

/// Parse a selection label, mapping `"All"` to `None`.
pub fn parse_selection<T>(label: &str) -> Result<Option<T>, T::Err>
where
    T: FromStr,
{
    if label == ALL {
        Ok(None)
    } else {
        label.parse().map(Some)
    }
}

/// Free-text search over title, description and submitter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    raw: String,
    needle: String,
}

impl SearchQuery {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let needle = raw.trim().to_lowercase();
        Self { raw, needle }
    }

    /// The text as typed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Trimmed, lowercased form used for matching.
    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// An empty query matches everything.
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches(&self, ticket: &Ticket) -> bool {
        self.is_empty() || ticket.matches_text(&self.needle)
    }
}

/// Tickets to display: those passing both the filter and the search, in list order.
pub fn derive_view(tickets: &[Ticket], filter: &FilterCriteria, search: &SearchQuery) -> Vec<Ticket> {
    tickets
        .iter()
        .filter(|t| filter.matches(t) && search.matches(t))
        .cloned()
        .collect()
}
