//! Observability infrastructure for the LogCentral client
//!
//! Provides:
//! - Prometheus metrics (buffer size, publish throughput, flush latency, heartbeat failures)
//! - Structured JSON logging with tracing

use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for publish latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ClientMetricsInner> = OnceLock::new();

struct ClientMetricsInner {
    buffered_records: IntGauge,
    connected: IntGauge,
    published_records: IntCounter,
    published_batches: IntCounter,
    flush_failures: IntCounter,
    ping_failures: IntCounter,
    synchronizations: IntCounter,
    connect_attempts: IntCounterVec,
    received_records: IntCounter,
    publish_latency_seconds: Histogram,
}

impl ClientMetricsInner {
    fn new() -> Self {
        Self {
            buffered_records: register_int_gauge!(
                "logcentral_client_buffered_records",
                "Number of log records waiting to be published"
            )
            .expect("Failed to register buffered_records"),

            connected: register_int_gauge!(
                "logcentral_client_connected",
                "1 while the producer is registered with the central service"
            )
            .expect("Failed to register connected"),

            published_records: register_int_counter!(
                "logcentral_client_published_records_total",
                "Total number of log records published"
            )
            .expect("Failed to register published_records"),

            published_batches: register_int_counter!(
                "logcentral_client_published_batches_total",
                "Total number of batches published"
            )
            .expect("Failed to register published_batches"),

            flush_failures: register_int_counter!(
                "logcentral_client_flush_failures_total",
                "Total number of failed publish attempts"
            )
            .expect("Failed to register flush_failures"),

            ping_failures: register_int_counter!(
                "logcentral_client_ping_failures_total",
                "Total number of failed heartbeat pings"
            )
            .expect("Failed to register ping_failures"),

            synchronizations: register_int_counter!(
                "logcentral_client_synchronizations_total",
                "Total number of clock synchronizations sent"
            )
            .expect("Failed to register synchronizations"),

            connect_attempts: register_int_counter_vec!(
                "logcentral_client_connect_attempts_total",
                "Registration attempts by outcome",
                &["outcome"]
            )
            .expect("Failed to register connect_attempts"),

            received_records: register_int_counter!(
                "logcentral_tool_received_records_total",
                "Total number of log records pushed to the tool"
            )
            .expect("Failed to register received_records"),

            publish_latency_seconds: register_histogram!(
                "logcentral_client_publish_latency_seconds",
                "Time spent publishing one batch",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register publish_latency_seconds"),
        }
    }
}

/// Client metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share the same
/// underlying metrics.
#[derive(Clone)]
pub struct ClientMetrics {
    _private: (),
}

impl Default for ClientMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ClientMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ClientMetrics")
    }
}

impl ClientMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ClientMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ClientMetricsInner {
        GLOBAL_METRICS.get_or_init(ClientMetricsInner::new)
    }

    pub fn set_buffered(&self, records: usize) {
        self.inner().buffered_records.set(records as i64);
    }

    pub fn set_connected(&self, connected: bool) {
        self.inner().connected.set(i64::from(connected));
    }

    /// Record a successful publish
    pub fn observe_publish(&self, records: usize, duration_secs: f64) {
        let inner = self.inner();
        inner.published_batches.inc();
        inner.published_records.inc_by(records as u64);
        inner.publish_latency_seconds.observe(duration_secs);
    }

    pub fn inc_flush_failures(&self) {
        self.inner().flush_failures.inc();
    }

    pub fn inc_ping_failures(&self) {
        self.inner().ping_failures.inc();
    }

    pub fn inc_synchronizations(&self) {
        self.inner().synchronizations.inc();
    }

    /// Count a registration attempt ("ok", "rejected" or "error")
    pub fn inc_connect_attempt(&self, outcome: &str) {
        self.inner()
            .connect_attempts
            .with_label_values(&[outcome])
            .inc();
    }

    pub fn inc_received(&self, records: usize) {
        self.inner().received_records.inc_by(records as u64);
    }
}

/// Structured logger for session events
///
/// Keeps the event names and fields of lifecycle logs consistent across the
/// producer and tool runtimes.
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    role: &'static str,
}

impl StructuredLogger {
    pub fn new(role: &'static str) -> Self {
        Self { role }
    }

    pub fn log_connected(&self, name: &str, reason: &str) {
        info!(
            event = "session_connected",
            role = self.role,
            name = %name,
            reason = %reason,
            "Registered with central log service"
        );
    }

    pub fn log_connect_failed(&self, name: &str, error: &str) {
        warn!(
            event = "session_connect_failed",
            role = self.role,
            name = %name,
            error = %error,
            "Registration with central log service failed"
        );
    }

    pub fn log_disconnected(&self, name: &str, reason: &str) {
        info!(
            event = "session_disconnected",
            role = self.role,
            name = %name,
            reason = %reason,
            "Unregistered from central log service"
        );
    }

    pub fn log_unregister_failed(&self, name: &str, error: &str) {
        warn!(
            event = "session_unregister_failed",
            role = self.role,
            name = %name,
            error = %error,
            "Unregister failed, session closed locally"
        );
    }

    pub fn log_renamed(&self, old_name: &str, new_name: &str) {
        info!(
            event = "session_renamed",
            role = self.role,
            old_name = %old_name,
            new_name = %new_name,
            "Session name changed"
        );
    }

    /// Log process startup
    pub fn log_startup(&self, version: &str, endpoint: &str) {
        info!(
            event = "client_started",
            role = self.role,
            version = %version,
            endpoint = %endpoint,
            "LogCentral client started"
        );
    }

    /// Log process shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "client_shutdown",
            role = self.role,
            reason = %reason,
            "LogCentral client shutting down"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_metrics_creation() {
        let metrics = ClientMetrics::new();

        metrics.set_buffered(3);
        metrics.set_connected(true);
        metrics.observe_publish(3, 0.002);
        metrics.inc_flush_failures();
        metrics.inc_ping_failures();
        metrics.inc_synchronizations();
        metrics.inc_connect_attempt("ok");
        metrics.inc_received(2);

        // A second handle shares the registry instead of registering again
        let other = ClientMetrics::new();
        other.set_connected(false);
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("producer");
        assert_eq!(logger.role, "producer");
        logger.log_connected("app1", "startup");
    }
}
