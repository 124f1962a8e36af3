//! Ticket system: model, validation, storage and lifecycle operations.

mod service;
mod sqlite_store;
mod store;
mod types;
mod validation;

pub use service::TicketService;
pub use sqlite_store::SqliteTicketStore;
pub use store::{TicketError, TicketFilter, TicketStore};
pub use types::{now, NewTicket, Ticket, TicketChanges, TicketState};
pub use validation::{
    validate_create, validate_update, CreateTicketRequest, FieldErrors, UpdateTicketRequest,
    AT_LEAST_ONE_FIELD, DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS,
};
