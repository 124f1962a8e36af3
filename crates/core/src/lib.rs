pub mod config;
pub mod pagination;
pub mod ticket;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DatabaseConfig,
    ServerConfig,
};
pub use pagination::{parse_page, Page, PageLinks, PER_PAGE};
pub use ticket::{
    CreateTicketRequest, FieldErrors, SqliteTicketStore, Ticket, TicketError, TicketFilter,
    TicketService, TicketState, TicketStore, UpdateTicketRequest,
};
