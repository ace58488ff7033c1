//! HTTP service exposing the ticket store.

pub mod api;
pub mod metrics;
pub mod state;
