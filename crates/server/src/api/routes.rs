use axum::{
    middleware::from_fn,
    routing::{get, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{handlers, middleware::metrics_middleware, tickets};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health and metrics
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        // Tickets
        .route(
            "/ticket",
            get(tickets::list_tickets).post(tickets::create_ticket),
        )
        .route(
            "/ticket/{id}",
            get(tickets::get_ticket).put(tickets::update_ticket),
        )
        .route("/ticket/{id}/close", put(tickets::close_ticket))
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
