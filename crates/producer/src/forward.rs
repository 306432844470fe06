//! Line forwarding and connection retries

use logcentral_lib::{Connection, ConnectionManager};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

/// Tag used for lines without one
pub const DEFAULT_TAG: &str = "INFO";

/// Split a `TAG message...` line; blank lines yield nothing
pub fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return None;
    }
    match line.split_once(' ') {
        Some((tag, text)) if !tag.is_empty() => Some((tag, text)),
        Some((_, text)) => Some((DEFAULT_TAG, text.trim_start())),
        None => Some((DEFAULT_TAG, line)),
    }
}

/// Counters of a forwarding run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ForwardStats {
    pub forwarded: u64,
    /// Lines whose tag the service did not ask for
    pub filtered: u64,
}

/// Log every line of `reader` until EOF
pub async fn forward_lines<R>(
    reader: R,
    manager: &ConnectionManager,
    ignore_filter: bool,
) -> std::io::Result<ForwardStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut stats = ForwardStats::default();

    while let Some(line) = lines.next_line().await? {
        let Some((tag, text)) = parse_line(&line) else {
            continue;
        };
        if ignore_filter || manager.is_loggable(tag) {
            manager.log(tag, text);
            stats.forwarded += 1;
        } else {
            stats.filtered += 1;
        }
    }

    debug!(
        forwarded = stats.forwarded,
        filtered = stats.filtered,
        "Input exhausted"
    );
    Ok(stats)
}

/// Connect, retrying with exponential backoff until it succeeds
pub async fn connect_with_backoff(
    manager: &ConnectionManager,
    reason: &str,
    initial_backoff: Duration,
    max_backoff: Duration,
) {
    let mut backoff = initial_backoff;
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match manager.connect(reason).await {
            Ok(()) => {
                info!(name = %manager.name(), attempts, "Producer connected");
                return;
            }
            Err(e) => {
                warn!(
                    error = %e,
                    attempts,
                    next_backoff_ms = backoff.as_millis() as u64,
                    "Connection attempt failed"
                );
                tokio::time::sleep(backoff).await;
                backoff = std::cmp::min(backoff * 2, max_backoff);
            }
        }
    }
}
