//! Ticket API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::sync::Arc;
use ticketdesk_core::{parse_page, CreateTicketRequest, Page, Ticket, UpdateTicketRequest};

use super::extract::AppJson;
use crate::error::{ApiError, Result};
use crate::metrics::{TICKETS_CLOSED_TOTAL, TICKETS_CREATED_TOTAL, VALIDATION_FAILURES_TOTAL};
use crate::state::AppState;

/// Confirmation returned by the close endpoint.
pub const CLOSED_MESSAGE: &str = "Ticket closed successfully!";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Response for ticket operations
#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: String,
    pub closed_at: Option<String>,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        Self {
            id: ticket.id,
            title: ticket.title,
            description: ticket.description,
            created_at: timestamp(&ticket.created_at),
            updated_at: timestamp(&ticket.updated_at),
            closed_at: ticket.closed_at.as_ref().map(timestamp),
        }
    }
}

/// Plain message body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Ticket ids are integers; anything else cannot name a ticket.
fn parse_id(raw: &str) -> Result<i64> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::NotFound(raw.to_string()))
}

/// First `page` value of the query string. Query pairs are taken raw so that
/// repeated or malformed values fall back to page 1 instead of rejecting.
fn page_param(params: &[(String, String)]) -> Option<&str> {
    params
        .iter()
        .find(|(key, _)| key == "page")
        .map(|(_, value)| value.as_str())
}

fn record_validation_failure(operation: &str, error: &ApiError) {
    if matches!(error, ApiError::Validation(_)) {
        VALIDATION_FAILURES_TOTAL
            .with_label_values(&[operation])
            .inc();
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// List tickets, fifteen per page, oldest first
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Page<TicketResponse>>> {
    let page = parse_page(page_param(&params));
    let tickets = state.tickets().list(page, &state.ticket_list_url())?;

    Ok(Json(tickets.map(TicketResponse::from)))
}

/// Create a new open ticket
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<CreateTicketRequest>,
) -> Result<(StatusCode, Json<TicketResponse>)> {
    let ticket = state.tickets().create(body).map_err(|e| {
        let e = ApiError::from(e);
        record_validation_failure("create", &e);
        e
    })?;

    TICKETS_CREATED_TOTAL.inc();

    Ok((StatusCode::CREATED, Json(TicketResponse::from(ticket))))
}

/// Get a ticket by ID
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TicketResponse>> {
    let id = parse_id(&id)?;
    let ticket = state.tickets().get(id)?;

    Ok(Json(TicketResponse::from(ticket)))
}

/// Change the title and/or description of a ticket
pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(body): AppJson<UpdateTicketRequest>,
) -> Result<Json<TicketResponse>> {
    let id = parse_id(&id)?;
    let ticket = state.tickets().update(id, body).map_err(|e| {
        let e = ApiError::from(e);
        record_validation_failure("update", &e);
        e
    })?;

    Ok(Json(TicketResponse::from(ticket)))
}

/// Close a ticket
pub async fn close_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id = parse_id(&id)?;
    state.tickets().close(id)?;

    TICKETS_CLOSED_TOTAL.inc();

    Ok(Json(MessageResponse {
        message: CLOSED_MESSAGE.to_string(),
    }))
}
