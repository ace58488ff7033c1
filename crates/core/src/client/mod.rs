//! Client State Controller: the local ticket view and the service it mirrors.
//!
//! ```rust,ignore
//! use ticketdesk_core::client::{FilterCriteria, TicketController};
//!
//! let controller = TicketController::from_config(&config.client);
//! controller.load().await?;
//! controller.set_filter(FilterCriteria::parse("Open", "All")?).await;
//! controller.search("printer").await;
//! for ticket in controller.view().await {
//!     println!("{} [{}]", ticket.title, ticket.priority);
//! }
//! ```

mod controller;
mod error;
mod http;
mod service;
mod view;

pub use controller::{ClientState, TicketController};
pub use error::ClientError;
pub use http::HttpTicketService;
pub use service::TicketService;
pub use view::{derive_view, parse_selection, FilterCriteria, SearchQuery, ALL};
