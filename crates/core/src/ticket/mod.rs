//! Ticket model and persistence.

mod sqlite_store;
mod store;
mod types;

pub use sqlite_store::SqliteTicketStore;
pub use store::{validate_draft, TicketError, TicketFilter, TicketStore};
pub use types::{ParseEnumError, Priority, Ticket, TicketDraft, TicketPatch, TicketStatus};
