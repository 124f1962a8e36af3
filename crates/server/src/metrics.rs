//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the ticketdesk server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Ticket lifecycle counters
//! - Ticket counts by state (collected on scrape)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
    Opts, Registry, TextEncoder,
};
use regex_lite::Regex;
use ticketdesk_core::{TicketFilter, TicketState};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "ticketdesk_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("ticketdesk_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "ticketdesk_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Ticket Metrics
// =============================================================================

/// Tickets by current state (collected dynamically).
pub static TICKETS_BY_STATE: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("ticketdesk_tickets_by_state", "Current ticket count by state"),
        &["state"],
    )
    .unwrap()
});

/// Tickets created total.
pub static TICKETS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "ticketdesk_tickets_created_total",
        "Total tickets created since startup",
    )
    .unwrap()
});

/// Close operations total (repeated closes of the same ticket count each time).
pub static TICKETS_CLOSED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "ticketdesk_tickets_closed_total",
        "Total close operations since startup",
    )
    .unwrap()
});

/// Validation rejections by operation.
pub static VALIDATION_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "ticketdesk_validation_failures_total",
            "Requests rejected by field validation",
        ),
        &["operation"],
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Tickets
    registry
        .register(Box::new(TICKETS_BY_STATE.clone()))
        .unwrap();
    registry
        .register(Box::new(TICKETS_CREATED_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(TICKETS_CLOSED_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(VALIDATION_FAILURES_TOTAL.clone()))
        .unwrap();
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so the state gauges reflect the store contents.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let ticket_store = state.ticket_store();
    for ticket_state in TicketState::all() {
        let filter = TicketFilter::new().with_state(ticket_state);
        if let Ok(count) = ticket_store.count(&filter) {
            TICKETS_BY_STATE
                .with_label_values(&[ticket_state.as_str()])
                .set(count);
        }
    }
}

static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    NUMERIC_SEGMENT.replace_all(path, "/{id}$1").to_string()
}
