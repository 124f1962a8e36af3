//! Ticket storage trait and types.

use thiserror::Error;

use super::{FieldErrors, NewTicket, Ticket, TicketChanges, TicketState};

/// Error type for ticket operations.
#[derive(Debug, Error)]
pub enum TicketError {
    /// Request fields failed validation. Nothing was written.
    #[error("The given data was invalid.")]
    Validation(FieldErrors),
    /// Ticket not found.
    #[error("Ticket not found: {0}")]
    NotFound(String),
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
#[derive(Debug, Clone)]
pub struct TicketFilter {
    /// Filter by lifecycle state.
    pub state: Option<TicketState>,
    /// Maximum number of results.
    pub limit: i64,
    /// Offset for pagination.
    pub offset: i64,
}

impl Default for TicketFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl TicketFilter {
    /// Create a new filter with defaults.
    pub fn new() -> Self {
        Self {
            state: None,
            limit: 100,
            offset: 0,
        }
    }

    /// Filter by state.
    pub fn with_state(mut self, state: TicketState) -> Self {
        self.state = Some(state);
        self
    }

    /// Set limit.
    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Set offset.
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }
}

/// Trait for ticket storage backends.
///
/// Implementations only persist; validation and lifecycle rules live in
/// [`TicketService`](super::TicketService).
pub trait TicketStore: Send + Sync {
    /// Insert a new open ticket.
    fn create(&self, ticket: NewTicket) -> Result<Ticket, TicketError>;

    /// Get a ticket by ID.
    fn get(&self, id: i64) -> Result<Option<Ticket>, TicketError>;

    /// Apply a change set and bump `updated_at`.
    ///
    /// Returns [`TicketError::NotFound`] if the ticket does not exist.
    fn update(&self, id: i64, changes: TicketChanges) -> Result<Ticket, TicketError>;

    /// List tickets matching the filter, oldest first.
    fn list(&self, filter: &TicketFilter) -> Result<Vec<Ticket>, TicketError>;

    /// Count tickets matching the filter, ignoring limit and offset.
    fn count(&self, filter: &TicketFilter) -> Result<i64, TicketError>;
}
