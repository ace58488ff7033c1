//! Ticket API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ticketdesk_core::{
    Priority, Ticket, TicketDraft, TicketError, TicketFilter, TicketPatch, TicketStatus,
};
use tracing::{error, info};

use crate::metrics::{TICKETS_CREATED_TOTAL, TICKETS_DELETED_TOTAL, TICKET_UPDATES_TOTAL};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a ticket
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketBody {
    pub title: String,
    pub description: String,
    /// Free text naming the submitter
    #[serde(default)]
    pub created_by: String,
    /// Defaults to Low
    pub priority: Option<Priority>,
}

/// Query parameters for listing tickets
#[derive(Debug, Deserialize)]
pub struct ListTicketsParams {
    /// Filter by status
    pub status: Option<TicketStatus>,
    /// Filter by priority
    pub priority: Option<Priority>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct TicketErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<TicketErrorResponse>);

fn api_error(e: TicketError) -> ApiError {
    let status = match &e {
        TicketError::NotFound(_) => StatusCode::NOT_FOUND,
        TicketError::Validation(_) => StatusCode::BAD_REQUEST,
        TicketError::Database(_) => {
            error!("Ticket store failure: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (
        status,
        Json(TicketErrorResponse {
            error: e.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a new ticket
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTicketBody>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    let draft = TicketDraft {
        title: body.title,
        description: body.description,
        created_by: body.created_by,
        priority: body.priority.unwrap_or_default(),
    };

    let ticket = state.ticket_store().create(draft).map_err(api_error)?;

    TICKETS_CREATED_TOTAL.inc();
    info!(ticket_id = %ticket.id, priority = %ticket.priority, "Ticket created");

    Ok((StatusCode::CREATED, Json(ticket)))
}

/// Get a ticket by ID
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Ticket>, ApiError> {
    match state.ticket_store().get(&id).map_err(api_error)? {
        Some(ticket) => Ok(Json(ticket)),
        None => Err(api_error(TicketError::NotFound(id))),
    }
}

/// List tickets with optional filters, oldest first
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListTicketsParams>,
) -> Result<Json<Vec<Ticket>>, ApiError> {
    let filter = TicketFilter {
        status: params.status,
        priority: params.priority,
    };

    let tickets = state.ticket_store().list(&filter).map_err(api_error)?;

    Ok(Json(tickets))
}

/// Update priority and/or status (PATCH endpoint)
pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<TicketPatch>,
) -> Result<Json<Ticket>, ApiError> {
    let ticket = state
        .ticket_store()
        .update(&id, patch.clone())
        .map_err(api_error)?;

    if patch.priority.is_some() {
        TICKET_UPDATES_TOTAL.with_label_values(&["priority"]).inc();
    }
    if patch.status.is_some() {
        TICKET_UPDATES_TOTAL.with_label_values(&["status"]).inc();
    }
    info!(
        ticket_id = %ticket.id,
        priority = %ticket.priority,
        status = %ticket.status,
        "Ticket updated"
    );

    Ok(Json(ticket))
}

/// Permanently delete a ticket (DELETE endpoint)
pub async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let ticket = state.ticket_store().delete(&id).map_err(api_error)?;

    TICKETS_DELETED_TOTAL.inc();
    info!(ticket_id = %ticket.id, "Ticket deleted");

    Ok(StatusCode::NO_CONTENT)
}
