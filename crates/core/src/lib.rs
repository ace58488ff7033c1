//! Core library for ticketdesk: the ticket model and store, configuration,
//! and the client-side controller that mirrors the ticket service.

pub mod client;
pub mod config;
pub mod testing;
pub mod ticket;

pub use client::{
    derive_view, ClientError, ClientState, FilterCriteria, HttpTicketService, SearchQuery,
    TicketController, TicketService,
};
pub use config::{
    load_config, load_config_from_str, validate_config, ClientConfig, Config, ConfigError,
    DatabaseConfig, ServerConfig,
};
pub use ticket::{
    Priority, SqliteTicketStore, Ticket, TicketDraft, TicketError, TicketFilter, TicketPatch,
    TicketStatus, TicketStore,
};
