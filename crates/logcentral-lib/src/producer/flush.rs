//! Periodic publication of buffered records

use super::buffer::MessageBuffer;
use crate::health::{components, HealthRegistry};
use crate::lifecycle::BackgroundTask;
use crate::observability::ClientMetrics;
use crate::remote::{with_timeout, RemoteEndpoint};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Result of one flush cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was buffered
    Idle,
    Published(usize),
    /// Publication failed, the batch is back at the front of the buffer
    Requeued(usize),
}

/// Drains the buffer to the central service
pub struct FlushTask {
    endpoint: Arc<dyn RemoteEndpoint>,
    buffer: Arc<MessageBuffer>,
    request_timeout: Duration,
    metrics: ClientMetrics,
    health: Option<HealthRegistry>,
}

impl FlushTask {
    pub fn new(
        endpoint: Arc<dyn RemoteEndpoint>,
        buffer: Arc<MessageBuffer>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            endpoint,
            buffer,
            request_timeout,
            metrics: ClientMetrics::new(),
            health: None,
        }
    }

    pub fn with_health(mut self, health: Option<HealthRegistry>) -> Self {
        self.health = health;
        self
    }

    /// Run one cycle: take the whole buffer and try to publish it
    pub async fn flush_once(&self) -> FlushOutcome {
        let batch = self.buffer.take();
        if batch.is_empty() {
            return FlushOutcome::Idle;
        }

        let count = batch.len();
        let start = Instant::now();
        let result = with_timeout(self.request_timeout, self.endpoint.publish_batch(&batch)).await;

        match result {
            Ok(()) => {
                self.metrics
                    .observe_publish(count, start.elapsed().as_secs_f64());
                self.metrics.set_buffered(self.buffer.len());
                if let Some(health) = &self.health {
                    health.set_healthy(components::FLUSH).await;
                }
                debug!(records = count, "Published batch");
                FlushOutcome::Published(count)
            }
            Err(e) => {
                self.buffer.requeue_front(batch);
                self.metrics.inc_flush_failures();
                self.metrics.set_buffered(self.buffer.len());
                if let Some(health) = &self.health {
                    health
                        .set_degraded(components::FLUSH, format!("publish failed: {}", e))
                        .await;
                }
                warn!(records = count, error = %e, "Publish failed, batch kept for retry");
                FlushOutcome::Requeued(count)
            }
        }
    }

    /// Run a cycle every `period` until stopped
    pub fn start(self, period: Duration) -> BackgroundTask {
        BackgroundTask::spawn("flush", move |cancel| async move {
            info!(interval_ms = period.as_millis() as u64, "Starting flush task");
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        self.flush_once().await;
                    }
                }
            }

            debug!(pending = self.buffer.len(), "Flush task stopped");
        })
    }
}
