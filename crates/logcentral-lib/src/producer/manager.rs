//! Producer connection manager

use super::buffer::{BufferStats, MessageBuffer};
use super::filter::TagFilter;
use super::flush::FlushTask;
use super::heartbeat::HeartbeatTask;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::health::{components, HealthRegistry};
use crate::lifecycle::{BackgroundTask, Connection, Lifecycle, Role};
use crate::models::{ConnectionState, LogRecord, LogTime, StatusCode};
use crate::observability::ClientMetrics;
use crate::remote::{with_timeout, RegisterProducer, RemoteEndpoint};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Hostname reported at registration
///
/// Looks at `HOSTNAME`, then the kernel hostname, then falls back to
/// `localhost`.
pub fn local_hostname() -> String {
    if let Ok(name) = std::env::var("HOSTNAME") {
        let name = name.trim();
        if !name.is_empty() {
            return name.to_string();
        }
    }
    std::fs::read_to_string("/proc/sys/kernel/hostname")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

/// Producer half of a session: registration plus the flush and heartbeat tasks
pub struct ProducerRole {
    endpoint: Arc<dyn RemoteEndpoint>,
    buffer: Arc<MessageBuffer>,
    filter: Arc<TagFilter>,
    hostname: String,
    config: ClientConfig,
    metrics: ClientMetrics,
    health: Option<HealthRegistry>,
}

#[async_trait]
impl Role for ProducerRole {
    const ROLE: &'static str = "producer";

    async fn register(&self, name: &str, reason: &str) -> Result<String, ClientError> {
        let request = RegisterProducer {
            name: name.to_string(),
            hostname: self.hostname.clone(),
            reason: reason.to_string(),
            callback: self.filter.clone(),
            timestamp: LogTime::now(),
        };

        self.filter.begin_registration();
        let registration = match with_timeout(
            self.config.request_timeout,
            self.endpoint.register_producer(request),
        )
        .await
        {
            Ok(registration) => registration,
            Err(e) => {
                self.filter.cancel_registration();
                self.metrics.inc_connect_attempt("error");
                self.mark_connection_unhealthy(format!("registration failed: {}", e))
                    .await;
                return Err(ClientError::Register(e));
            }
        };

        if !registration.status.is_ok() {
            self.filter.cancel_registration();
            self.metrics.inc_connect_attempt("rejected");
            self.mark_connection_unhealthy(format!(
                "registration rejected: {}",
                registration.status
            ))
            .await;
            return Err(ClientError::Rejected(registration.status));
        }

        self.filter.finish_registration(registration.tag_filter);
        self.metrics.inc_connect_attempt("ok");
        self.metrics.set_connected(true);
        if let Some(health) = &self.health {
            health.set_healthy(components::CONNECTION).await;
        }

        if registration.assigned_name.is_empty() {
            Ok(name.to_string())
        } else {
            Ok(registration.assigned_name)
        }
    }

    async fn unregister(&self, name: &str, reason: &str) -> Result<(), ClientError> {
        let result = with_timeout(
            self.config.request_timeout,
            self.endpoint.unregister_producer(name, reason),
        )
        .await;

        match result {
            Ok(StatusCode::Ok) => Ok(()),
            Ok(status) => Err(ClientError::UnregisterRejected(status)),
            Err(e) => Err(ClientError::Unregister(e)),
        }
    }

    fn start_tasks(&self, name: &str) -> Vec<BackgroundTask> {
        let heartbeat = HeartbeatTask::new(
            self.endpoint.clone(),
            name,
            self.config.sync_every,
            self.config.request_timeout,
        )
        .with_health(self.health.clone());
        let flush = FlushTask::new(
            self.endpoint.clone(),
            self.buffer.clone(),
            self.config.request_timeout,
        )
        .with_health(self.health.clone());

        vec![
            heartbeat.start(self.config.heartbeat_interval),
            flush.start(self.config.flush_interval),
        ]
    }

    async fn on_stopped(&self) {
        self.metrics.set_connected(false);
        self.mark_connection_unhealthy("disconnected".to_string()).await;
    }
}

impl ProducerRole {
    async fn mark_connection_unhealthy(&self, message: String) {
        if let Some(health) = &self.health {
            health.set_unhealthy(components::CONNECTION, message).await;
        }
    }
}

/// Owns the buffer and tag filter of a producer and drives its session
///
/// `log` and `is_loggable` never block on the network and can be called
/// from any thread, connected or not. Records logged while disconnected are
/// published after the next successful `connect`.
pub struct ConnectionManager {
    lifecycle: Lifecycle<ProducerRole>,
}

impl ConnectionManager {
    /// Manager with the default configuration
    pub fn new(endpoint: Arc<dyn RemoteEndpoint>, name: impl Into<String>) -> Self {
        Self::builder(endpoint, name).assemble()
    }

    pub fn builder(
        endpoint: Arc<dyn RemoteEndpoint>,
        name: impl Into<String>,
    ) -> ConnectionManagerBuilder {
        ConnectionManagerBuilder {
            endpoint,
            name: name.into(),
            config: ClientConfig::default(),
            hostname: None,
            health: None,
        }
    }

    fn role(&self) -> &ProducerRole {
        self.lifecycle.role()
    }

    /// Buffer a text record under the current name
    pub fn log(&self, tag: &str, text: &str) {
        self.log_with(tag, text, false);
    }

    /// Buffer a record with an explicit binary flag
    pub fn log_with(&self, tag: &str, text: &str, is_binary: bool) {
        let record = LogRecord::new(self.lifecycle.name(), tag, text).binary(is_binary);
        let pending = self.role().buffer.push(record);
        self.role().metrics.set_buffered(pending);
    }

    /// Whether `tag` is in the filter most recently pushed by the service
    pub fn is_loggable(&self, tag: &str) -> bool {
        self.role().filter.is_loggable(tag)
    }

    pub fn hostname(&self) -> &str {
        &self.role().hostname
    }

    pub fn config(&self) -> &ClientConfig {
        &self.role().config
    }

    /// Number of records waiting to be published
    pub fn pending(&self) -> usize {
        self.role().buffer.len()
    }

    pub fn buffer_stats(&self) -> BufferStats {
        self.role().buffer.stats()
    }

    pub fn tag_filter_snapshot(&self) -> Vec<String> {
        self.role().filter.snapshot()
    }
}

#[async_trait]
impl Connection for ConnectionManager {
    async fn connect(&self, reason: &str) -> Result<(), ClientError> {
        self.lifecycle.connect(reason).await
    }

    async fn disconnect(&self, reason: &str) -> Result<(), ClientError> {
        self.lifecycle.disconnect(reason).await
    }

    async fn rename(&self, new_name: &str) -> Result<(), ClientError> {
        self.lifecycle.rename(new_name).await
    }

    fn name(&self) -> String {
        self.lifecycle.name()
    }

    fn state(&self) -> ConnectionState {
        self.lifecycle.state()
    }
}

/// Builder for `ConnectionManager`
pub struct ConnectionManagerBuilder {
    endpoint: Arc<dyn RemoteEndpoint>,
    name: String,
    config: ClientConfig,
    hostname: Option<String>,
    health: Option<HealthRegistry>,
}

impl ConnectionManagerBuilder {
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the reported hostname
    pub fn hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Report session health to `health`
    pub fn health(mut self, health: HealthRegistry) -> Self {
        self.health = Some(health);
        self
    }

    /// Fails when the configuration would stall or spin the session tasks
    pub fn build(self) -> anyhow::Result<ConnectionManager> {
        self.config.validate()?;
        Ok(self.assemble())
    }

    fn assemble(self) -> ConnectionManager {
        let hostname = self.hostname.unwrap_or_else(local_hostname);
        debug!(name = %self.name, hostname = %hostname, "Creating connection manager");

        let role = ProducerRole {
            endpoint: self.endpoint,
            buffer: Arc::new(MessageBuffer::new(self.config.buffer_warn_threshold)),
            filter: Arc::new(TagFilter::new()),
            hostname,
            config: self.config,
            metrics: ClientMetrics::new(),
            health: self.health,
        };

        ConnectionManager {
            lifecycle: Lifecycle::new(role, self.name),
        }
    }
}
