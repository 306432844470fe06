//! Call contract of the central log service
//!
//! The runtime never talks to a transport directly. Producers go through
//! `RemoteEndpoint`, tools through `ToolEndpoint`; pushes from the service
//! come back through `ProducerCallback` and `MessageReceiver`.

use crate::error::RemoteError;
use crate::models::{Filter, LogRecord, LogTime, StatusCode};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Inbound configuration pushes addressed to a producer
pub trait ProducerCallback: Send + Sync {
    fn set_tag_filter(&self, tags: Vec<String>);
    fn add_tag_filter(&self, tags: Vec<String>);
    fn remove_tag_filter(&self, tags: Vec<String>);
}

/// Inbound message pushes addressed to a tool
pub trait MessageReceiver: Send + Sync {
    fn deliver_batch(&self, records: Vec<LogRecord>);
}

/// Arguments of a producer registration
#[derive(Clone)]
pub struct RegisterProducer {
    /// Requested name; empty asks the service to generate one
    pub name: String,
    pub hostname: String,
    pub reason: String,
    /// Target of the configuration pushes for this session
    pub callback: Arc<dyn ProducerCallback>,
    pub timestamp: LogTime,
}

impl std::fmt::Debug for RegisterProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterProducer")
            .field("name", &self.name)
            .field("hostname", &self.hostname)
            .field("reason", &self.reason)
            .field("timestamp", &self.timestamp)
            .finish_non_exhaustive()
    }
}

/// Answer to a producer registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub status: StatusCode,
    /// Name the service registered the producer under
    pub assigned_name: String,
    /// Initial tag filter
    pub tag_filter: Vec<String>,
}

/// Producer side of the central log service
#[async_trait]
pub trait RemoteEndpoint: Send + Sync + 'static {
    async fn register_producer(&self, request: RegisterProducer) -> Result<Registration, RemoteError>;

    async fn unregister_producer(&self, name: &str, reason: &str) -> Result<StatusCode, RemoteError>;

    /// Liveness signal
    async fn ping(&self, name: &str) -> Result<(), RemoteError>;

    /// Report the producer clock so the service can correct timestamps
    async fn synchronize(&self, name: &str, timestamp: LogTime) -> Result<(), RemoteError>;

    async fn publish_batch(&self, records: &[LogRecord]) -> Result<(), RemoteError>;
}

/// Tool side of the central log service
#[async_trait]
pub trait ToolEndpoint: Send + Sync + 'static {
    /// Register a tool; returns the status and the name it was registered under
    async fn connect_tool(
        &self,
        name: &str,
        receiver: Arc<dyn MessageReceiver>,
    ) -> Result<(StatusCode, String), RemoteError>;

    async fn disconnect_tool(&self, name: &str) -> Result<StatusCode, RemoteError>;

    async fn add_filter(&self, name: &str, filter: &Filter) -> Result<StatusCode, RemoteError>;

    async fn remove_filter(&self, name: &str, filter_name: &str) -> Result<StatusCode, RemoteError>;

    async fn flush_all_filters(&self, name: &str) -> Result<StatusCode, RemoteError>;

    async fn defined_tags(&self) -> Result<Vec<String>, RemoteError>;

    async fn defined_components(&self) -> Result<Vec<String>, RemoteError>;
}

/// Bound a remote call so a stalled service cannot wedge a session
pub async fn with_timeout<T, F>(timeout: Duration, call: F) -> Result<T, RemoteError>
where
    F: Future<Output = Result<T, RemoteError>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| RemoteError::Timeout(timeout))?
}
