//! Session health tracking
//!
//! The producer runtime reports the state of its registration and of its
//! background activities (heartbeat, flush, push streams) here; the producer
//! binary turns it into liveness and readiness checks.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Health status of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    /// Working, but the last remote call failed
    Degraded,
    Unhealthy,
}

/// Health of one component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Unix seconds since the component entered this status
    pub since: i64,
    /// Reports in a row that were not healthy
    #[serde(default, skip_serializing_if = "is_zero")]
    pub failures: u32,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl ComponentHealth {
    fn with(status: ComponentStatus, message: Option<String>) -> Self {
        Self {
            status,
            message,
            since: chrono::Utc::now().timestamp(),
            failures: u32::from(status != ComponentStatus::Healthy),
        }
    }

    pub fn healthy() -> Self {
        Self::with(ComponentStatus::Healthy, None)
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self::with(ComponentStatus::Degraded, Some(message.into()))
    }

    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self::with(ComponentStatus::Unhealthy, Some(message.into()))
    }
}

/// Overall health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: HashMap<String, ComponentHealth>,
}

impl HealthResponse {
    /// Worst status among the components
    pub fn compute_status(components: &HashMap<String, ComponentHealth>) -> ComponentStatus {
        components
            .values()
            .map(|h| h.status)
            .max_by_key(|s| match s {
                ComponentStatus::Healthy => 0,
                ComponentStatus::Degraded => 1,
                ComponentStatus::Unhealthy => 2,
            })
            .unwrap_or(ComponentStatus::Healthy)
    }
}

/// Readiness response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Component names for health tracking
pub mod components {
    pub const CONNECTION: &str = "connection";
    pub const HEARTBEAT: &str = "heartbeat";
    pub const FLUSH: &str = "flush";
    /// Server-streaming pushes (tag filter watch, record subscription)
    pub const STREAM: &str = "stream";
}

/// Registry of component health, cheap to clone
#[derive(Debug, Clone, Default)]
pub struct HealthRegistry {
    components: Arc<RwLock<HashMap<String, ComponentHealth>>>,
}

impl HealthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component with an initial status
    pub async fn register(&self, name: &str, health: ComponentHealth) {
        self.components.write().await.insert(name.to_string(), health);
    }

    /// Record a report; unknown components are registered on the fly
    ///
    /// Repeated reports of the same status keep the original `since`, and
    /// every report that is not healthy extends the failure streak.
    pub async fn update(&self, name: &str, mut health: ComponentHealth) {
        let mut components = self.components.write().await;
        if let Some(current) = components.get(name) {
            if health.status == current.status {
                health.since = current.since;
            }
            if health.status != ComponentStatus::Healthy {
                health.failures = current.failures.saturating_add(1);
            }
        }
        components.insert(name.to_string(), health);
    }

    pub async fn set_healthy(&self, name: &str) {
        self.update(name, ComponentHealth::healthy()).await;
    }

    pub async fn set_degraded(&self, name: &str, message: impl Into<String>) {
        self.update(name, ComponentHealth::degraded(message)).await;
    }

    pub async fn set_unhealthy(&self, name: &str, message: impl Into<String>) {
        self.update(name, ComponentHealth::unhealthy(message)).await;
    }

    pub async fn health(&self) -> HealthResponse {
        let components = self.components.read().await.clone();
        let status = HealthResponse::compute_status(&components);
        HealthResponse { status, components }
    }

    /// Ready once the connection component is registered and healthy
    pub async fn readiness(&self) -> ReadinessResponse {
        let components = self.components.read().await;
        match components.get(components::CONNECTION) {
            None => ReadinessResponse {
                ready: false,
                reason: Some("Not yet connected to central service".to_string()),
            },
            Some(h) if h.status != ComponentStatus::Healthy => ReadinessResponse {
                ready: false,
                reason: Some(
                    h.message
                        .clone()
                        .unwrap_or_else(|| "Connection unhealthy".to_string()),
                ),
            },
            Some(_) => ReadinessResponse {
                ready: true,
                reason: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_registry_initial_state() {
        let registry = HealthRegistry::new();
        let health = registry.health().await;

        assert_eq!(health.status, ComponentStatus::Healthy);
        assert!(health.components.is_empty());
    }

    #[tokio::test]
    async fn test_worst_component_wins() {
        let registry = HealthRegistry::new();
        registry.set_healthy(components::CONNECTION).await;
        registry.set_degraded(components::FLUSH, "publish timed out").await;
        assert_eq!(registry.health().await.status, ComponentStatus::Degraded);

        registry.set_unhealthy(components::HEARTBEAT, "stopped").await;
        assert_eq!(registry.health().await.status, ComponentStatus::Unhealthy);

        registry.set_healthy(components::HEARTBEAT).await;
        registry.set_healthy(components::FLUSH).await;
        assert_eq!(registry.health().await.status, ComponentStatus::Healthy);
    }

    #[tokio::test]
    async fn test_readiness_follows_connection() {
        let registry = HealthRegistry::new();
        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert!(readiness.reason.is_some());

        registry.set_healthy(components::CONNECTION).await;
        assert!(registry.readiness().await.ready);

        registry
            .set_unhealthy(components::CONNECTION, "registration rejected")
            .await;
        let readiness = registry.readiness().await;
        assert!(!readiness.ready);
        assert_eq!(readiness.reason.as_deref(), Some("registration rejected"));
    }

    #[tokio::test]
    async fn test_degraded_flush_does_not_block_readiness() {
        let registry = HealthRegistry::new();
        registry.set_healthy(components::CONNECTION).await;
        registry.set_degraded(components::FLUSH, "retrying").await;
        assert!(registry.readiness().await.ready);
    }

    #[tokio::test]
    async fn test_failure_streak() {
        let registry = HealthRegistry::new();
        registry.set_healthy(components::FLUSH).await;
        registry.set_degraded(components::FLUSH, "publish failed").await;
        registry.set_degraded(components::FLUSH, "publish timed out").await;

        let health = registry.health().await;
        let flush = &health.components[components::FLUSH];
        assert_eq!(flush.failures, 2);
        assert_eq!(flush.message.as_deref(), Some("publish timed out"));

        registry.set_healthy(components::FLUSH).await;
        assert_eq!(registry.health().await.components[components::FLUSH].failures, 0);
    }

    #[test]
    fn test_registry_usable_from_sync_code() {
        let registry = HealthRegistry::new();
        tokio_test::block_on(registry.set_healthy(components::CONNECTION));
        assert!(tokio_test::block_on(registry.readiness()).ready);
    }
}
