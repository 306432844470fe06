//! Server-streaming pushes that outlive stream failures
//!
//! A push stream (tag filter watch, record subscription) is opened once per
//! session. When it errors or the service closes it, the stream is reopened
//! with capped exponential backoff until the session's token is cancelled.

use crate::health::{components, HealthRegistry};
use std::future::Future;
use std::time::Duration;
use tokio_stream::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Delay between two attempts at reopening a push stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReopenBackoff {
    pub initial: Duration,
    pub max: Duration,
}

impl Default for ReopenBackoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(500),
            max: Duration::from_secs(30),
        }
    }
}

impl ReopenBackoff {
    fn next(&self, current: Duration) -> Duration {
        current.saturating_mul(2).min(self.max)
    }
}

/// Keep a push stream open until `cancel` fires
///
/// `open` is called for every attempt; each item is handed to `on_item`.
/// Stream state is reported under the `stream` health component.
pub(crate) async fn follow_stream<T, S, Open, Fut, OnItem>(
    label: &'static str,
    name: String,
    cancel: CancellationToken,
    backoff: ReopenBackoff,
    health: Option<HealthRegistry>,
    mut open: Open,
    mut on_item: OnItem,
) where
    Open: FnMut() -> Fut,
    Fut: Future<Output = Result<S, tonic::Status>>,
    S: Stream<Item = Result<T, tonic::Status>> + Unpin,
    OnItem: FnMut(T),
{
    let mut delay = backoff.initial;

    loop {
        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            opened = open() => Some(opened),
        };
        let Some(opened) = opened else { break };

        let failure = match opened {
            Ok(mut stream) => {
                delay = backoff.initial;
                if let Some(health) = &health {
                    health.set_healthy(components::STREAM).await;
                }
                debug!(stream = label, name = %name, "Push stream open");

                loop {
                    let next = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => None,
                        item = stream.next() => Some(item),
                    };
                    match next {
                        None => {
                            debug!(stream = label, name = %name, "Push stream ended");
                            return;
                        }
                        Some(Some(Ok(item))) => on_item(item),
                        Some(Some(Err(status))) => break status.to_string(),
                        Some(None) => break "closed by the service".to_string(),
                    }
                }
            }
            Err(status) => status.to_string(),
        };

        warn!(
            stream = label,
            name = %name,
            error = %failure,
            retry_ms = delay.as_millis() as u64,
            "Push stream down, reopening"
        );
        if let Some(health) = &health {
            health
                .set_degraded(components::STREAM, format!("{} stream down: {}", label, failure))
                .await;
        }

        let cancelled = tokio::select! {
            biased;
            _ = cancel.cancelled() => true,
            _ = tokio::time::sleep(delay) => false,
        };
        if cancelled {
            break;
        }
        delay = backoff.next(delay);
    }

    debug!(stream = label, name = %name, "Push stream ended");
}
