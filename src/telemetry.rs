use axum::{extract::State, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

pub const DISCOVERY_REQUESTS: &str = "discovery_requests_total";
pub const DISCOVERY_DURATION: &str = "discovery_duration_seconds";
pub const AVAILABILITY_PROBES: &str = "availability_probes_total";

/// Register descriptions for application metrics
pub fn describe() {
    metrics::describe_counter!(
        DISCOVERY_REQUESTS,
        "Discovery calls by outcome (ok, empty, validation, unavailable, backend, unknown)"
    );
    metrics::describe_histogram!(
        DISCOVERY_DURATION,
        "Wall-clock time of discovery calls that reached the network"
    );
    metrics::describe_counter!(
        AVAILABILITY_PROBES,
        "Availability probes by result (online, offline)"
    );
}

/// Prometheus metrics scrape endpoint.
/// Returns metrics in Prometheus text exposition format.
pub async fn prometheus_metrics(State(handle): State<Arc<PrometheusHandle>>) -> impl IntoResponse {
    handle.render()
}
