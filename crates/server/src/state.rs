use std::sync::Arc;
use ticketdesk_core::{Config, TicketService, TicketStore};

/// Shared application state
pub struct AppState {
    config: Config,
    tickets: TicketService,
}

impl AppState {
    pub fn new(config: Config, ticket_store: Arc<dyn TicketStore>) -> Self {
        Self {
            config,
            tickets: TicketService::new(ticket_store),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tickets(&self) -> &TicketService {
        &self.tickets
    }

    pub fn ticket_store(&self) -> &dyn TicketStore {
        self.tickets.store()
    }

    /// Absolute URL of the ticket listing, the base of every pagination link.
    pub fn ticket_list_url(&self) -> String {
        self.config.server.url("/ticket")
    }
}
