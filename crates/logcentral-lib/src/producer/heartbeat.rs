//! Keep-alive pings and periodic clock synchronization

use crate::health::{components, HealthRegistry};
use crate::lifecycle::BackgroundTask;
use crate::models::LogTime;
use crate::observability::ClientMetrics;
use crate::remote::{with_timeout, RemoteEndpoint};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Pings the central service and synchronizes the clock every `sync_every` beats
pub struct HeartbeatTask {
    endpoint: Arc<dyn RemoteEndpoint>,
    name: String,
    sync_every: u32,
    counter: u32,
    request_timeout: Duration,
    metrics: ClientMetrics,
    health: Option<HealthRegistry>,
}

impl HeartbeatTask {
    pub fn new(
        endpoint: Arc<dyn RemoteEndpoint>,
        name: impl Into<String>,
        sync_every: u32,
        request_timeout: Duration,
    ) -> Self {
        Self {
            endpoint,
            name: name.into(),
            sync_every: sync_every.max(1),
            counter: 0,
            request_timeout,
            metrics: ClientMetrics::new(),
            health: None,
        }
    }

    pub fn with_health(mut self, health: Option<HealthRegistry>) -> Self {
        self.health = health;
        self
    }

    /// Beats since the last synchronization
    #[cfg(test)]
    pub(crate) fn counter(&self) -> u32 {
        self.counter
    }

    /// One heartbeat; returns true when it also synchronized the clock
    ///
    /// Failures are logged and never end the session.
    pub async fn beat(&mut self) -> bool {
        match with_timeout(self.request_timeout, self.endpoint.ping(&self.name)).await {
            Ok(()) => {
                if let Some(health) = &self.health {
                    health.set_healthy(components::HEARTBEAT).await;
                }
            }
            Err(e) => {
                self.metrics.inc_ping_failures();
                if let Some(health) = &self.health {
                    health
                        .set_degraded(components::HEARTBEAT, format!("ping failed: {}", e))
                        .await;
                }
                warn!(producer = %self.name, error = %e, "Ping failed");
            }
        }

        self.counter += 1;
        if self.counter < self.sync_every {
            return false;
        }
        self.counter = 0;

        let now = LogTime::now();
        match with_timeout(self.request_timeout, self.endpoint.synchronize(&self.name, now)).await {
            Ok(()) => {
                self.metrics.inc_synchronizations();
                debug!(producer = %self.name, timestamp = %now, "Clock synchronized");
            }
            Err(e) => warn!(producer = %self.name, error = %e, "Clock synchronization failed"),
        }
        true
    }

    /// Beat every `period` until stopped
    pub fn start(mut self, period: Duration) -> BackgroundTask {
        BackgroundTask::spawn("heartbeat", move |cancel| async move {
            info!(
                producer = %self.name,
                interval_ms = period.as_millis() as u64,
                sync_every = self.sync_every,
                "Starting heartbeat task"
            );
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        self.beat().await;
                    }
                }
            }
        })
    }
}
