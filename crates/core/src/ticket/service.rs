//! Ticket operations: validation, lifecycle and paginated listing on top of a
//! [`TicketStore`].

use std::sync::Arc;

use tracing::{debug, info};

use super::types::now;
use super::{
    validate_create, validate_update, CreateTicketRequest, Ticket, TicketChanges, TicketError,
    TicketFilter, TicketStore, UpdateTicketRequest,
};
use crate::pagination::{Page, PageLinks, PER_PAGE};

/// Entry point for every ticket operation exposed over the API.
pub struct TicketService {
    store: Arc<dyn TicketStore>,
}

impl TicketService {
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn TicketStore {
        self.store.as_ref()
    }

    /// List one page of tickets in insertion order.
    ///
    /// `path` is the absolute listing URL used to build the navigation links.
    pub fn list(&self, page: u64, path: &str) -> Result<Page<Ticket>, TicketError> {
        let total = self.store.count(&TicketFilter::new())?;
        let links = PageLinks::new(u64::try_from(total).unwrap_or(0), page, PER_PAGE, path);

        let data = if links.from.is_some() {
            let filter = TicketFilter::new()
                .with_limit(PER_PAGE as i64)
                .with_offset(i64::try_from(links.offset()).unwrap_or(i64::MAX));
            self.store.list(&filter)?
        } else {
            Vec::new()
        };

        debug!(
            "Listed page {} ({} of {} tickets)",
            links.current_page,
            data.len(),
            total
        );

        Ok(Page::new(links, data))
    }

    /// Fetch a single ticket.
    pub fn get(&self, id: i64) -> Result<Ticket, TicketError> {
        self.store
            .get(id)?
            .ok_or_else(|| TicketError::NotFound(id.to_string()))
    }

    /// Validate and persist a new open ticket.
    pub fn create(&self, request: CreateTicketRequest) -> Result<Ticket, TicketError> {
        let new_ticket = validate_create(request).map_err(TicketError::Validation)?;
        let ticket = self.store.create(new_ticket)?;

        info!("Ticket created: id={}", ticket.id);
        Ok(ticket)
    }

    /// Apply a partial update. The ticket must exist before the payload is
    /// looked at, so an unknown id wins over an invalid body.
    pub fn update(&self, id: i64, request: UpdateTicketRequest) -> Result<Ticket, TicketError> {
        self.get(id)?;

        let changes = validate_update(request).map_err(TicketError::Validation)?;
        let ticket = self.store.update(id, changes)?;

        info!("Ticket updated: id={}", ticket.id);
        Ok(ticket)
    }

    /// Move a ticket to the closed state.
    ///
    /// Closing an already closed ticket refreshes `closed_at`.
    pub fn close(&self, id: i64) -> Result<Ticket, TicketError> {
        let current = self.get(id)?;
        let previous_state = current.state();

        let ticket = self.store.update(
            id,
            TicketChanges {
                closed_at: Some(now()),
                ..Default::default()
            },
        )?;

        info!(
            "Ticket closed: id={}, previous_state={}",
            ticket.id, previous_state
        );
        Ok(ticket)
    }
}
