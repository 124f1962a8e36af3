//! Ticket domain types.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a ticket, derived from `closed_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketState {
    /// `closed_at` is null.
    Open,
    /// `closed_at` is set.
    Closed,
}

impl TicketState {
    /// Returns the state type as a string (for metrics labels and logging).
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketState::Open => "open",
            TicketState::Closed => "closed",
        }
    }

    /// All states, in lifecycle order.
    pub fn all() -> [TicketState; 2] {
        [TicketState::Open, TicketState::Closed]
    }
}

impl std::fmt::Display for TicketState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A support ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique identifier, assigned by the store in insertion order.
    pub id: i64,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// When the ticket was closed. `None` while open.
    pub closed_at: Option<DateTime<Utc>>,
}

impl Ticket {
    pub fn state(&self) -> TicketState {
        if self.closed_at.is_some() {
            TicketState::Closed
        } else {
            TicketState::Open
        }
    }
}

/// Validated fields for a new ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
}

/// Partial change set applied by [`TicketStore::update`](super::TicketStore::update).
///
/// `None` leaves the column untouched, so `closed_at` can be set but never cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// Current time truncated to whole seconds, the precision timestamps are stored at.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}
