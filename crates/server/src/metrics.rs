//! Prometheus metrics for observability.
//!
//! - HTTP request metrics (latency, counts, in flight)
//! - Ticket mutation counters and current ticket counts

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
    Opts, Registry, TextEncoder,
};
use ticketdesk_core::{TicketFilter, TicketStatus, TicketStore};
use tracing::error;

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
    .expect("valid metric definition")
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("ticketdesk_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .expect("valid metric definition")
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "ticketdesk_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .expect("valid metric definition")
});

// =============================================================================
// Ticket Metrics
// =============================================================================

/// Tickets created since startup.
pub static TICKETS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "ticketdesk_tickets_created_total",
        "Total tickets created since startup",
    )
    .expect("valid metric definition")
});

/// Tickets deleted since startup.
pub static TICKETS_DELETED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "ticketdesk_tickets_deleted_total",
        "Total tickets deleted since startup",
    )
    .expect("valid metric definition")
});

/// Ticket updates by changed field.
pub static TICKET_UPDATES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("ticketdesk_ticket_updates_total", "Ticket field updates"),
        &["field"],
    )
    .expect("valid metric definition")
});

/// Tickets currently stored.
pub static TICKETS_TOTAL: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("ticketdesk_tickets", "Current number of stored tickets")
        .expect("valid metric definition")
});

/// Tickets by current status (collected at scrape time).
pub static TICKETS_BY_STATUS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("ticketdesk_tickets_by_status", "Current ticket count by status"),
        &["status"],
    )
    .expect("valid metric definition")
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(HTTP_REQUEST_DURATION.clone()),
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()),
        Box::new(TICKETS_CREATED_TOTAL.clone()),
        Box::new(TICKETS_DELETED_TOTAL.clone()),
        Box::new(TICKET_UPDATES_TOTAL.clone()),
        Box::new(TICKETS_TOTAL.clone()),
        Box::new(TICKETS_BY_STATUS.clone()),
    ];

    for collector in collectors {
        if let Err(e) = registry.register(collector) {
            error!("Failed to register metric: {}", e);
        }
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Refresh gauges that mirror the store.
pub fn collect_ticket_metrics(store: &dyn TicketStore) {
    if let Ok(count) = store.count(&TicketFilter::new()) {
        TICKETS_TOTAL.set(count);
    }

    for status in TicketStatus::ALL {
        let filter = TicketFilter::new().with_status(status);
        if let Ok(count) = store.count(&filter) {
            TICKETS_BY_STATUS
                .with_label_values(&[status.as_str()])
                .set(count);
        }
    }
}

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    static UUID: Lazy<regex_lite::Regex> = Lazy::new(|| {
        regex_lite::Regex::new(
            r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
        )
        .expect("valid regex")
    });
    // Anything after /api/tickets/ is an id, whatever its shape
    static TICKET_ID: Lazy<regex_lite::Regex> =
        Lazy::new(|| regex_lite::Regex::new(r"^/api/tickets/[^/]+$").expect("valid regex"));

    if TICKET_ID.is_match(path) {
        return "/api/tickets/{id}".to_string();
    }
    UUID.replace_all(path, "{id}").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticketdesk_core::{SqliteTicketStore, TicketDraft, TicketPatch};

    #[test]
    fn test_normalize_path_uuid() {
        let path = "/api/tickets/550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(normalize_path(path), "/api/tickets/{id}");
    }

    #[test]
    fn test_normalize_path_arbitrary_ticket_id() {
        assert_eq!(normalize_path("/api/tickets/abc"), "/api/tickets/{id}");
    }

    #[test]
    fn test_normalize_path_no_ids() {
        assert_eq!(normalize_path("/api/health"), "/api/health");
        assert_eq!(normalize_path("/api/tickets"), "/api/tickets");
    }

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("ticketdesk_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_collect_ticket_metrics() {
        let store = SqliteTicketStore::in_memory().unwrap();
        store.create(TicketDraft::new("a", "b", "c")).unwrap();
        let resolved = store.create(TicketDraft::new("d", "e", "f")).unwrap();
        store
            .update(&resolved.id, TicketPatch::status(TicketStatus::Resolved))
            .unwrap();

        collect_ticket_metrics(&store);

        let output = encode_metrics();
        assert!(output.contains("ticketdesk_tickets_by_status{status=\"Resolved\"}"));
        assert!(output.contains("ticketdesk_tickets "));
    }
}
