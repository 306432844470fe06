//! Integration tests for the producer API endpoints and line forwarding

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use log_producer::api::{create_router, AppState};
use log_producer::forward::{connect_with_backoff, forward_lines, ForwardStats};
use logcentral_lib::{
    health::{components, ComponentHealth, HealthRegistry},
    observability::ClientMetrics,
    remote::{RegisterProducer, Registration},
    ClientConfigBuilder, Connection, ConnectionManager, LogRecord, LogTime, RemoteEndpoint,
    RemoteError, StatusCode as ServiceStatus,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

/// Central service stand-in accepting everything
#[derive(Default)]
struct RecordingEndpoint {
    /// Registrations refused before the first success
    refusals: AtomicUsize,
    registrations: AtomicUsize,
    published: Mutex<Vec<LogRecord>>,
}

#[async_trait]
impl RemoteEndpoint for RecordingEndpoint {
    async fn register_producer(&self, request: RegisterProducer) -> Result<Registration, RemoteError> {
        self.registrations.fetch_add(1, Ordering::SeqCst);
        let refused = self
            .refusals
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(RemoteError::Unavailable("starting up".into()));
        }
        Ok(Registration {
            status: ServiceStatus::Ok,
            assigned_name: request.name,
            tag_filter: vec!["ERROR".into(), "WARN".into()],
        })
    }

    async fn unregister_producer(&self, _name: &str, _reason: &str) -> Result<ServiceStatus, RemoteError> {
        Ok(ServiceStatus::Ok)
    }

    async fn ping(&self, _name: &str) -> Result<(), RemoteError> {
        Ok(())
    }

    async fn synchronize(&self, _name: &str, _timestamp: LogTime) -> Result<(), RemoteError> {
        Ok(())
    }

    async fn publish_batch(&self, records: &[LogRecord]) -> Result<(), RemoteError> {
        self.published.lock().unwrap().extend_from_slice(records);
        Ok(())
    }
}

fn build_manager(endpoint: Arc<RecordingEndpoint>, health: &HealthRegistry) -> Arc<ConnectionManager> {
    let config = ClientConfigBuilder::new()
        .flush_interval(Duration::from_millis(10))
        .heartbeat_interval(Duration::from_millis(50))
        .request_timeout(Duration::from_millis(500))
        .build()
        .unwrap();
    Arc::new(
        ConnectionManager::builder(endpoint, "app1")
            .config(config)
            .hostname("node-a")
            .health(health.clone())
            .build()
            .unwrap(),
    )
}

async fn setup_test_app() -> (Router, Arc<AppState>, Arc<RecordingEndpoint>) {
    let health_registry = HealthRegistry::new();
    health_registry
        .register(components::CONNECTION, ComponentHealth::unhealthy("not connected"))
        .await;
    health_registry
        .register(components::FLUSH, ComponentHealth::healthy())
        .await;

    let endpoint = Arc::new(RecordingEndpoint::default());
    let manager = build_manager(endpoint.clone(), &health_registry);
    let state = Arc::new(AppState::new(health_registry, manager));
    (create_router(state.clone()), state, endpoint)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_healthz_returns_503_before_connect() {
    let (app, _state, _endpoint) = setup_test_app().await;

    let (status, health) = get_json(app, "/healthz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(health["status"], "unhealthy");
    assert!(health["components"]["connection"].is_object());
}

#[tokio::test]
async fn test_readyz_follows_connection() {
    let (app, state, _endpoint) = setup_test_app().await;

    let (status, readiness) = get_json(app.clone(), "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(readiness["ready"], false);

    state.manager.connect("startup").await.unwrap();
    let (status, readiness) = get_json(app.clone(), "/readyz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(readiness["ready"], true);

    let (status, _) = get_json(app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);

    state.manager.disconnect("shutdown").await.unwrap();
}

#[tokio::test]
async fn test_healthz_returns_ok_when_degraded() {
    let (app, state, _endpoint) = setup_test_app().await;
    state.manager.connect("startup").await.unwrap();
    state
        .health_registry
        .set_degraded(components::FLUSH, "publish failed")
        .await;

    let (status, health) = get_json(app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "degraded");

    state.manager.disconnect("shutdown").await.unwrap();
}

#[tokio::test]
async fn test_status_reports_session() {
    let (app, state, _endpoint) = setup_test_app().await;
    state.manager.log("ERROR", "queued");

    let (status, body) = get_json(app.clone(), "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "app1");
    assert_eq!(body["hostname"], "node-a");
    assert_eq!(body["state"], "disconnected");
    assert_eq!(body["pending"], 1);
    assert_eq!(body["pending_text_bytes"], 6);

    state.manager.connect("startup").await.unwrap();
    let (_, body) = get_json(app, "/status").await;
    assert_eq!(body["state"], "connected");
    assert_eq!(body["tag_filter"], serde_json::json!(["ERROR", "WARN"]));

    state.manager.disconnect("shutdown").await.unwrap();
}

#[tokio::test]
async fn test_metrics_endpoint_returns_prometheus_format() {
    let (app, _state, _endpoint) = setup_test_app().await;

    let metrics = ClientMetrics::new();
    metrics.set_buffered(3);
    metrics.observe_publish(2, 0.001);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers().get("content-type").unwrap();
    assert!(content_type.to_str().unwrap().contains("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let metrics_text = String::from_utf8(body.to_vec()).unwrap();

    assert!(metrics_text.contains("logcentral_client_buffered_records"));
    assert!(metrics_text.contains("logcentral_client_published_records_total"));
    assert!(metrics_text.contains("logcentral_client_publish_latency_seconds_bucket"));
}

#[tokio::test]
async fn test_forward_lines_respects_filter() {
    let health = HealthRegistry::new();
    let endpoint = Arc::new(RecordingEndpoint::default());
    let manager = build_manager(endpoint.clone(), &health);
    manager.connect("startup").await.unwrap();

    let input: &[u8] = b"ERROR boot failed\nDEBUG noisy\n\nplain line\nWARN disk low\n";
    let stats = forward_lines(input, &manager, false).await.unwrap();
    assert_eq!(
        stats,
        ForwardStats {
            forwarded: 2,
            filtered: 2
        }
    );

    let mut published = Vec::new();
    for _ in 0..200 {
        published = endpoint.published.lock().unwrap().clone();
        if published.len() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    let lines: Vec<(String, String)> = published
        .iter()
        .map(|r| (r.tag.clone(), r.text.clone()))
        .collect();
    assert_eq!(
        lines,
        vec![
            ("ERROR".to_string(), "boot failed".to_string()),
            ("WARN".to_string(), "disk low".to_string()),
        ]
    );

    manager.disconnect("shutdown").await.unwrap();
}

#[tokio::test]
async fn test_forward_lines_can_ignore_filter() {
    let health = HealthRegistry::new();
    let endpoint = Arc::new(RecordingEndpoint::default());
    let manager = build_manager(endpoint, &health);

    let input: &[u8] = b"DEBUG one\nplain two\n";
    let stats = forward_lines(input, &manager, true).await.unwrap();
    assert_eq!(stats.forwarded, 2);
    assert_eq!(manager.pending(), 2);
}

#[tokio::test]
async fn test_connect_with_backoff_retries() {
    let health = HealthRegistry::new();
    let endpoint = Arc::new(RecordingEndpoint::default());
    endpoint.refusals.store(2, Ordering::SeqCst);
    let manager = build_manager(endpoint.clone(), &health);

    tokio::time::timeout(
        Duration::from_secs(2),
        connect_with_backoff(
            &manager,
            "startup",
            Duration::from_millis(5),
            Duration::from_millis(20),
        ),
    )
    .await
    .unwrap();

    assert_eq!(endpoint.registrations.load(Ordering::SeqCst), 3);
    assert!(manager.state() == logcentral_lib::ConnectionState::Connected);
    manager.disconnect("shutdown").await.unwrap();
}
