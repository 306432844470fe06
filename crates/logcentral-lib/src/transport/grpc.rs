//! gRPC adapter for the central log service
//!
//! This module provides a `GrpcEndpoint` that:
//! - Connects lazily and caches one HTTP/2 channel, with optional mTLS
//! - Drops the cached channel on transport failures so the next call reconnects
//! - Receives tag filter pushes (producers) and record batches (tools) over
//!   server-streaming calls opened once a session is registered, and reopens
//!   them when they fail

use super::stream::{follow_stream, ReopenBackoff};
use crate::error::RemoteError;
use crate::health::HealthRegistry;
use crate::models::{Filter, LogRecord, LogTime, StatusCode};
use crate::proto::{self as pb, FilterAction, LogCentralComponentClient, LogCentralToolClient};
use crate::remote::{
    MessageReceiver, ProducerCallback, RegisterProducer, Registration, RemoteEndpoint,
    ToolEndpoint,
};
use anyhow::Context;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Identity};
use tracing::{info, warn};

/// TLS material for the channel
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// CA certificate used to verify the service
    pub ca_cert_path: PathBuf,
    /// Client certificate and key, for mTLS
    pub client_cert_path: Option<PathBuf>,
    pub client_key_path: Option<PathBuf>,
}

/// Configuration for the gRPC transport
#[derive(Debug, Clone)]
pub struct GrpcConfig {
    /// Service URL (e.g., "http://logcentral:7400")
    pub endpoint: String,
    pub connect_timeout: Duration,
    /// Transport-level timeout of a single call
    pub request_timeout: Duration,
    pub keepalive_interval: Duration,
    pub keepalive_timeout: Duration,
    pub tls: Option<TlsConfig>,
    /// Delay before reopening a failed push stream
    pub reopen_backoff: ReopenBackoff,
}

impl Default for GrpcConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:7400".to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(5),
            keepalive_interval: Duration::from_secs(30),
            keepalive_timeout: Duration::from_secs(10),
            tls: None,
            reopen_backoff: ReopenBackoff::default(),
        }
    }
}

impl GrpcConfig {
    pub fn builder() -> GrpcConfigBuilder {
        GrpcConfigBuilder::default()
    }
}

/// Builder for `GrpcConfig`
#[derive(Debug, Default)]
pub struct GrpcConfigBuilder {
    config: GrpcConfig,
}

impl GrpcConfigBuilder {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn keepalive(mut self, interval: Duration, timeout: Duration) -> Self {
        self.config.keepalive_interval = interval;
        self.config.keepalive_timeout = timeout;
        self
    }

    pub fn tls(mut self, tls: TlsConfig) -> Self {
        self.config.tls = Some(tls);
        self
    }

    pub fn reopen_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.config.reopen_backoff = ReopenBackoff { initial, max };
        self
    }

    pub fn build(self) -> anyhow::Result<GrpcConfig> {
        let url = url::Url::parse(&self.config.endpoint)
            .with_context(|| format!("Invalid endpoint URL: {}", self.config.endpoint))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("Unsupported endpoint scheme: {}", url.scheme());
        }
        if url.host_str().is_none() {
            anyhow::bail!("No host in endpoint URL: {}", self.config.endpoint);
        }
        if let Some(tls) = &self.config.tls {
            if tls.client_cert_path.is_some() != tls.client_key_path.is_some() {
                anyhow::bail!("Client certificate and key must be configured together");
            }
        }
        let backoff = self.config.reopen_backoff;
        if backoff.initial.is_zero() || backoff.max < backoff.initial {
            anyhow::bail!("Stream reopen backoff must satisfy 0 < initial <= max");
        }
        Ok(self.config)
    }
}

/// Apply one tag filter push to `callback`
pub fn apply_filter_update(callback: &dyn ProducerCallback, update: pb::TagFilterUpdate) {
    match FilterAction::try_from(update.action) {
        Ok(FilterAction::Set) => callback.set_tag_filter(update.tags),
        Ok(FilterAction::Add) => callback.add_tag_filter(update.tags),
        Ok(FilterAction::Remove) => callback.remove_tag_filter(update.tags),
        Err(_) => warn!(action = update.action, "Ignoring unknown tag filter action"),
    }
}

/// Remote endpoint reached over gRPC
pub struct GrpcEndpoint {
    config: GrpcConfig,
    channel: Arc<RwLock<Option<Channel>>>,
    /// Tag filter watches, by producer name
    watches: Mutex<HashMap<String, CancellationToken>>,
    /// Record subscriptions, by tool name
    subscriptions: Mutex<HashMap<String, CancellationToken>>,
    health: Option<HealthRegistry>,
}

impl GrpcEndpoint {
    pub fn new(config: GrpcConfig) -> Self {
        Self {
            config,
            channel: Arc::new(RwLock::new(None)),
            watches: Mutex::new(HashMap::new()),
            subscriptions: Mutex::new(HashMap::new()),
            health: None,
        }
    }

    /// Report push stream state to `health`
    pub fn with_health(mut self, health: HealthRegistry) -> Self {
        self.health = Some(health);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Whether a channel is currently cached
    pub async fn has_channel(&self) -> bool {
        self.channel.read().await.is_some()
    }

    async fn load_tls_config(&self, tls: &TlsConfig) -> Result<ClientTlsConfig, RemoteError> {
        let ca_cert = tokio::fs::read(&tls.ca_cert_path).await.map_err(|e| {
            RemoteError::Tls(format!(
                "Failed to read CA certificate from {:?}: {}",
                tls.ca_cert_path, e
            ))
        })?;
        let mut config = ClientTlsConfig::new()
            .ca_certificate(Certificate::from_pem(ca_cert))
            .domain_name(self.extract_domain()?);

        if let (Some(cert_path), Some(key_path)) = (&tls.client_cert_path, &tls.client_key_path) {
            let cert = tokio::fs::read(cert_path).await.map_err(|e| {
                RemoteError::Tls(format!(
                    "Failed to read client certificate from {:?}: {}",
                    cert_path, e
                ))
            })?;
            let key = tokio::fs::read(key_path).await.map_err(|e| {
                RemoteError::Tls(format!("Failed to read client key from {:?}: {}", key_path, e))
            })?;
            config = config.identity(Identity::from_pem(cert, key));
        }
        Ok(config)
    }

    fn extract_domain(&self) -> Result<String, RemoteError> {
        let url = url::Url::parse(&self.config.endpoint)
            .map_err(|e| RemoteError::InvalidEndpoint(format!("{}: {}", self.config.endpoint, e)))?;
        url.host_str()
            .map(|s| s.to_string())
            .ok_or_else(|| RemoteError::InvalidEndpoint("No host in endpoint URL".to_string()))
    }

    async fn create_channel(&self) -> Result<Channel, RemoteError> {
        let mut endpoint = Channel::from_shared(self.config.endpoint.clone())
            .map_err(|e| RemoteError::InvalidEndpoint(e.to_string()))?;

        if let Some(tls) = &self.config.tls {
            let tls_config = self.load_tls_config(tls).await?;
            endpoint = endpoint
                .tls_config(tls_config)
                .map_err(|e| RemoteError::Tls(e.to_string()))?;
        }

        endpoint
            .connect_timeout(self.config.connect_timeout)
            .timeout(self.config.request_timeout)
            .http2_keep_alive_interval(self.config.keepalive_interval)
            .keep_alive_timeout(self.config.keepalive_timeout)
            .keep_alive_while_idle(true)
            .connect()
            .await
            .map_err(|e| {
                RemoteError::Unavailable(format!(
                    "Failed to connect to {}: {}",
                    self.config.endpoint, e
                ))
            })
    }

    /// Get or create the cached channel
    async fn get_channel(&self) -> Result<Channel, RemoteError> {
        {
            let channel = self.channel.read().await;
            if let Some(ch) = channel.as_ref() {
                return Ok(ch.clone());
            }
        }

        let mut channel = self.channel.write().await;
        if let Some(ch) = channel.as_ref() {
            return Ok(ch.clone());
        }
        let new_channel = self.create_channel().await?;
        *channel = Some(new_channel.clone());

        info!(endpoint = %self.config.endpoint, "Connected to central log service");
        Ok(new_channel)
    }

    async fn component_client(&self) -> Result<LogCentralComponentClient<Channel>, RemoteError> {
        Ok(LogCentralComponentClient::new(self.get_channel().await?))
    }

    async fn tool_client(&self) -> Result<LogCentralToolClient<Channel>, RemoteError> {
        Ok(LogCentralToolClient::new(self.get_channel().await?))
    }

    /// Unwrap a response; transport-level failures drop the cached channel
    async fn checked<T>(
        &self,
        result: Result<tonic::Response<T>, tonic::Status>,
    ) -> Result<T, RemoteError> {
        match result {
            Ok(response) => Ok(response.into_inner()),
            Err(status) => {
                if matches!(
                    status.code(),
                    tonic::Code::Unavailable | tonic::Code::Unknown | tonic::Code::Cancelled
                ) {
                    *self.channel.write().await = None;
                    warn!(
                        endpoint = %self.config.endpoint,
                        error = %status,
                        "Connection to central log service failed"
                    );
                }
                Err(RemoteError::Rpc(status))
            }
        }
    }

    fn replace_token(map: &Mutex<HashMap<String, CancellationToken>>, name: &str) -> CancellationToken {
        let token = CancellationToken::new();
        let previous = map
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }
        token
    }

    fn cancel_token(map: &Mutex<HashMap<String, CancellationToken>>, name: &str) {
        if let Some(token) = map.lock().unwrap_or_else(|e| e.into_inner()).remove(name) {
            token.cancel();
        }
    }

    /// Follow the tag filter pushes of `name` until unregistered
    async fn start_watch(&self, name: &str, callback: Arc<dyn ProducerCallback>) -> Result<(), RemoteError> {
        let client = self.component_client().await?;
        let cancel = Self::replace_token(&self.watches, name);
        let request = pb::NameRequest {
            name: name.to_string(),
        };

        tokio::spawn(follow_stream(
            "watch",
            name.to_string(),
            cancel,
            self.config.reopen_backoff,
            self.health.clone(),
            move || {
                let mut client = client.clone();
                let request = request.clone();
                async move {
                    client
                        .watch_config(request)
                        .await
                        .map(tonic::Response::into_inner)
                }
            },
            move |update: pb::TagFilterUpdate| apply_filter_update(callback.as_ref(), update),
        ));
        Ok(())
    }

    /// Deliver the records pushed to tool `name` until disconnected
    async fn start_subscription(
        &self,
        name: &str,
        receiver: Arc<dyn MessageReceiver>,
    ) -> Result<(), RemoteError> {
        let client = self.tool_client().await?;
        let cancel = Self::replace_token(&self.subscriptions, name);
        let request = pb::NameRequest {
            name: name.to_string(),
        };

        tokio::spawn(follow_stream(
            "subscription",
            name.to_string(),
            cancel,
            self.config.reopen_backoff,
            self.health.clone(),
            move || {
                let mut client = client.clone();
                let request = request.clone();
                async move { client.subscribe(request).await.map(tonic::Response::into_inner) }
            },
            move |batch: pb::MessageBatch| {
                receiver.deliver_batch(batch.records.into_iter().map(LogRecord::from).collect())
            },
        ));
        Ok(())
    }
}

impl Drop for GrpcEndpoint {
    fn drop(&mut self) {
        for map in [&self.watches, &self.subscriptions] {
            for (_, token) in map.lock().unwrap_or_else(|e| e.into_inner()).drain() {
                token.cancel();
            }
        }
    }
}

#[async_trait]
impl RemoteEndpoint for GrpcEndpoint {
    async fn register_producer(&self, request: RegisterProducer) -> Result<Registration, RemoteError> {
        let mut client = self.component_client().await?;
        let reply = self
            .checked(
                client
                    .register_component(pb::RegisterComponentRequest {
                        name: request.name.clone(),
                        hostname: request.hostname.clone(),
                        reason: request.reason.clone(),
                        timestamp: Some(request.timestamp.into()),
                    })
                    .await,
            )
            .await?;

        let status = StatusCode::from_wire(reply.status);
        if status.is_ok() {
            let name = if reply.assigned_name.is_empty() {
                &request.name
            } else {
                &reply.assigned_name
            };
            self.start_watch(name, request.callback.clone()).await?;
        }

        Ok(Registration {
            status,
            assigned_name: reply.assigned_name,
            tag_filter: reply.tag_filter,
        })
    }

    async fn unregister_producer(&self, name: &str, reason: &str) -> Result<StatusCode, RemoteError> {
        Self::cancel_token(&self.watches, name);
        let mut client = self.component_client().await?;
        let reply = self
            .checked(
                client
                    .unregister_component(pb::UnregisterComponentRequest {
                        name: name.to_string(),
                        reason: reason.to_string(),
                    })
                    .await,
            )
            .await?;
        Ok(StatusCode::from_wire(reply.status))
    }

    async fn ping(&self, name: &str) -> Result<(), RemoteError> {
        let mut client = self.component_client().await?;
        self.checked(
            client
                .ping(pb::NameRequest {
                    name: name.to_string(),
                })
                .await,
        )
        .await?;
        Ok(())
    }

    async fn synchronize(&self, name: &str, timestamp: LogTime) -> Result<(), RemoteError> {
        let mut client = self.component_client().await?;
        self.checked(
            client
                .synchronize(pb::SynchronizeRequest {
                    name: name.to_string(),
                    timestamp: Some(timestamp.into()),
                })
                .await,
        )
        .await?;
        Ok(())
    }

    async fn publish_batch(&self, records: &[LogRecord]) -> Result<(), RemoteError> {
        let mut client = self.component_client().await?;
        let batch = pb::MessageBatch {
            records: records.iter().map(pb::LogRecord::from).collect(),
        };
        self.checked(client.publish_batch(batch).await).await?;
        Ok(())
    }
}

#[async_trait]
impl ToolEndpoint for GrpcEndpoint {
    async fn connect_tool(
        &self,
        name: &str,
        receiver: Arc<dyn MessageReceiver>,
    ) -> Result<(StatusCode, String), RemoteError> {
        let mut client = self.tool_client().await?;
        let reply = self
            .checked(
                client
                    .connect_tool(pb::NameRequest {
                        name: name.to_string(),
                    })
                    .await,
            )
            .await?;

        let status = StatusCode::from_wire(reply.status);
        let assigned = if reply.assigned_name.is_empty() {
            name.to_string()
        } else {
            reply.assigned_name
        };
        if status.is_ok() {
            self.start_subscription(&assigned, receiver).await?;
        }
        Ok((status, assigned))
    }

    async fn disconnect_tool(&self, name: &str) -> Result<StatusCode, RemoteError> {
        Self::cancel_token(&self.subscriptions, name);
        let mut client = self.tool_client().await?;
        let reply = self
            .checked(
                client
                    .disconnect_tool(pb::NameRequest {
                        name: name.to_string(),
                    })
                    .await,
            )
            .await?;
        Ok(StatusCode::from_wire(reply.status))
    }

    async fn add_filter(&self, name: &str, filter: &Filter) -> Result<StatusCode, RemoteError> {
        let mut client = self.tool_client().await?;
        let reply = self
            .checked(
                client
                    .add_filter(pb::AddFilterRequest {
                        tool_name: name.to_string(),
                        filter: Some(filter.into()),
                    })
                    .await,
            )
            .await?;
        Ok(StatusCode::from_wire(reply.status))
    }

    async fn remove_filter(&self, name: &str, filter_name: &str) -> Result<StatusCode, RemoteError> {
        let mut client = self.tool_client().await?;
        let reply = self
            .checked(
                client
                    .remove_filter(pb::RemoveFilterRequest {
                        tool_name: name.to_string(),
                        filter_name: filter_name.to_string(),
                    })
                    .await,
            )
            .await?;
        Ok(StatusCode::from_wire(reply.status))
    }

    async fn flush_all_filters(&self, name: &str) -> Result<StatusCode, RemoteError> {
        let mut client = self.tool_client().await?;
        let reply = self
            .checked(
                client
                    .flush_all_filters(pb::NameRequest {
                        name: name.to_string(),
                    })
                    .await,
            )
            .await?;
        Ok(StatusCode::from_wire(reply.status))
    }

    async fn defined_tags(&self) -> Result<Vec<String>, RemoteError> {
        let mut client = self.tool_client().await?;
        let reply = self.checked(client.get_defined_tags(pb::Ack {}).await).await?;
        Ok(reply.names)
    }

    async fn defined_components(&self) -> Result<Vec<String>, RemoteError> {
        let mut client = self.tool_client().await?;
        let reply = self
            .checked(client.get_defined_components(pb::Ack {}).await)
            .await?;
        Ok(reply.names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producer::TagFilter;
    use tempfile::TempDir;

    #[test]
    fn test_grpc_config_default() {
        let config = GrpcConfig::default();
        assert_eq!(config.endpoint, "http://localhost:7400");
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert!(config.tls.is_none());
    }

    #[test]
    fn test_builder_validates_endpoint() {
        let config = GrpcConfig::builder()
            .endpoint("https://logcentral.example.com:7400")
            .request_timeout(Duration::from_secs(2))
            .build()
            .unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(2));

        assert!(GrpcConfig::builder().endpoint("not a url").build().is_err());
        assert!(GrpcConfig::builder()
            .endpoint("ftp://logcentral:21")
            .build()
            .is_err());
    }

    #[test]
    fn test_builder_requires_cert_and_key_together() {
        let result = GrpcConfig::builder()
            .tls(TlsConfig {
                ca_cert_path: PathBuf::from("/tmp/ca.crt"),
                client_cert_path: Some(PathBuf::from("/tmp/client.crt")),
                client_key_path: None,
            })
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_validates_reopen_backoff() {
        let config = GrpcConfig::builder()
            .reopen_backoff(Duration::from_millis(100), Duration::from_secs(5))
            .build()
            .unwrap();
        assert_eq!(config.reopen_backoff.initial, Duration::from_millis(100));
        assert_eq!(GrpcConfig::default().reopen_backoff, ReopenBackoff::default());

        assert!(GrpcConfig::builder()
            .reopen_backoff(Duration::ZERO, Duration::from_secs(5))
            .build()
            .is_err());
        assert!(GrpcConfig::builder()
            .reopen_backoff(Duration::from_secs(10), Duration::from_secs(5))
            .build()
            .is_err());
    }

    #[test]
    fn test_extract_domain() {
        let endpoint = GrpcEndpoint::new(
            GrpcConfig::builder()
                .endpoint("https://logs.internal:7400")
                .build()
                .unwrap(),
        );
        assert_eq!(endpoint.extract_domain().unwrap(), "logs.internal");
        assert_eq!(endpoint.endpoint(), "https://logs.internal:7400");
    }

    #[tokio::test]
    async fn test_missing_ca_certificate_is_a_tls_error() {
        let dir = TempDir::new().unwrap();
        let config = GrpcConfig::builder()
            .endpoint("https://logs.internal:7400")
            .tls(TlsConfig {
                ca_cert_path: dir.path().join("missing.crt"),
                client_cert_path: None,
                client_key_path: None,
            })
            .build()
            .unwrap();
        let endpoint = GrpcEndpoint::new(config);

        let result = endpoint.ping("app1").await;
        assert!(matches!(result, Err(RemoteError::Tls(_))));
        assert!(!endpoint.has_channel().await);
    }

    #[tokio::test]
    async fn test_unreachable_service_is_unavailable() {
        let config = GrpcConfig::builder()
            .endpoint("http://127.0.0.1:1")
            .connect_timeout(Duration::from_millis(200))
            .build()
            .unwrap();
        let endpoint = GrpcEndpoint::new(config);

        let result = endpoint.publish_batch(&[LogRecord::new("p", "INFO", "x")]).await;
        assert!(matches!(result, Err(RemoteError::Unavailable(_))));
        assert!(!endpoint.has_channel().await);
    }

    #[test]
    fn test_apply_filter_update() {
        let filter = TagFilter::new();
        apply_filter_update(
            &filter,
            pb::TagFilterUpdate {
                action: FilterAction::Set as i32,
                tags: vec!["A".into(), "B".into()],
            },
        );
        apply_filter_update(
            &filter,
            pb::TagFilterUpdate {
                action: FilterAction::Add as i32,
                tags: vec!["C".into()],
            },
        );
        apply_filter_update(
            &filter,
            pb::TagFilterUpdate {
                action: FilterAction::Remove as i32,
                tags: vec!["A".into()],
            },
        );
        apply_filter_update(
            &filter,
            pb::TagFilterUpdate {
                action: 42,
                tags: vec!["Z".into()],
            },
        );
        assert_eq!(filter.snapshot(), vec!["B", "C"]);
    }
}
