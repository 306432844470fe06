//! Tool session: registration plus inbound message delivery

use crate::config::DEFAULT_REQUEST_TIMEOUT;
use crate::error::{ClientError, RemoteError};
use crate::lifecycle::{BackgroundTask, Connection, Lifecycle, Role};
use crate::models::{ConnectionState, Filter, LogRecord, StatusCode};
use crate::observability::ClientMetrics;
use crate::remote::{with_timeout, MessageReceiver, ToolEndpoint};
use async_trait::async_trait;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Forwards pushed records to the application while a session is live
pub struct ChannelReceiver {
    tx: mpsc::UnboundedSender<LogRecord>,
    active: AtomicBool,
    metrics: ClientMetrics,
}

impl ChannelReceiver {
    fn new(tx: mpsc::UnboundedSender<LogRecord>) -> Self {
        Self {
            tx,
            active: AtomicBool::new(false),
            metrics: ClientMetrics::new(),
        }
    }

    fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl MessageReceiver for ChannelReceiver {
    fn deliver_batch(&self, records: Vec<LogRecord>) {
        if !self.is_active() {
            trace!(records = records.len(), "Dropping batch pushed outside a session");
            return;
        }
        let count = records.len();
        for record in records {
            if self.tx.send(record).is_err() {
                debug!("Record receiver closed");
                return;
            }
        }
        self.metrics.inc_received(count);
    }
}

/// Tool half of a session; tools run no periodic tasks
pub struct ToolRole {
    endpoint: Arc<dyn ToolEndpoint>,
    receiver: Arc<ChannelReceiver>,
    request_timeout: Duration,
}

#[async_trait]
impl Role for ToolRole {
    const ROLE: &'static str = "tool";

    async fn register(&self, name: &str, _reason: &str) -> Result<String, ClientError> {
        // Pushes may arrive before the answer does
        self.receiver.set_active(true);

        let result = with_timeout(
            self.request_timeout,
            self.endpoint.connect_tool(name, self.receiver.clone()),
        )
        .await;

        match result {
            Ok((StatusCode::Ok, assigned)) if assigned.is_empty() => Ok(name.to_string()),
            Ok((StatusCode::Ok, assigned)) => Ok(assigned),
            Ok((status, _)) => {
                self.receiver.set_active(false);
                Err(ClientError::Rejected(status))
            }
            Err(e) => {
                self.receiver.set_active(false);
                Err(ClientError::Register(e))
            }
        }
    }

    async fn unregister(&self, name: &str, _reason: &str) -> Result<(), ClientError> {
        match with_timeout(self.request_timeout, self.endpoint.disconnect_tool(name)).await {
            Ok(StatusCode::Ok) => Ok(()),
            Ok(status) => Err(ClientError::UnregisterRejected(status)),
            Err(e) => Err(ClientError::Unregister(e)),
        }
    }

    fn start_tasks(&self, _name: &str) -> Vec<BackgroundTask> {
        Vec::new()
    }

    async fn on_stopped(&self) {
        self.receiver.set_active(false);
    }
}

/// Consumer of the records collected by the central service
///
/// Records pushed by the service while connected are forwarded to the
/// receiver returned by `new`.
pub struct ToolClient {
    lifecycle: Lifecycle<ToolRole>,
}

impl ToolClient {
    pub fn new(
        endpoint: Arc<dyn ToolEndpoint>,
        name: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<LogRecord>) {
        Self::with_timeout(endpoint, name, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        endpoint: Arc<dyn ToolEndpoint>,
        name: impl Into<String>,
        request_timeout: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<LogRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let role = ToolRole {
            endpoint,
            receiver: Arc::new(ChannelReceiver::new(tx)),
            request_timeout,
        };
        let client = Self {
            lifecycle: Lifecycle::new(role, name),
        };
        (client, rx)
    }

    fn role(&self) -> &ToolRole {
        self.lifecycle.role()
    }

    /// Run a filter call for the live session
    async fn session_call<F, Fut>(&self, call: F) -> Result<(), ClientError>
    where
        F: FnOnce(String) -> Fut + Send,
        Fut: Future<Output = Result<StatusCode, RemoteError>> + Send,
    {
        if !self.lifecycle.is_connected() {
            return Err(ClientError::NotConnected);
        }
        let status = with_timeout(self.role().request_timeout, call(self.lifecycle.name()))
            .await
            .map_err(ClientError::Request)?;
        if status.is_ok() {
            Ok(())
        } else {
            Err(ClientError::RequestRejected(status))
        }
    }

    /// Ask the service to forward records matching `filter`
    pub async fn add_filter(&self, filter: &Filter) -> Result<(), ClientError> {
        let endpoint = self.role().endpoint.clone();
        self.session_call(|name| async move { endpoint.add_filter(&name, filter).await })
            .await
    }

    pub async fn remove_filter(&self, filter_name: &str) -> Result<(), ClientError> {
        let endpoint = self.role().endpoint.clone();
        self.session_call(|name| async move { endpoint.remove_filter(&name, filter_name).await })
            .await
    }

    pub async fn flush_all_filters(&self) -> Result<(), ClientError> {
        let endpoint = self.role().endpoint.clone();
        self.session_call(|name| async move { endpoint.flush_all_filters(&name).await })
            .await
    }

    /// Tags known to the central service
    pub async fn defined_tags(&self) -> Result<Vec<String>, ClientError> {
        with_timeout(self.role().request_timeout, self.role().endpoint.defined_tags())
            .await
            .map_err(ClientError::Request)
    }

    /// Producers known to the central service
    pub async fn defined_components(&self) -> Result<Vec<String>, ClientError> {
        with_timeout(
            self.role().request_timeout,
            self.role().endpoint.defined_components(),
        )
        .await
        .map_err(ClientError::Request)
    }
}

#[async_trait]
impl Connection for ToolClient {
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
