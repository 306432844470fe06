//! Pending-record buffer between the application and the flush task
//!
//! This module provides the FIFO queue log records wait in until they are
//! published:
//! - Appends from any thread, never blocking on I/O
//! - Whole-buffer take for the flush task, indivisible w.r.t. appends
//! - Re-prepending of a batch whose publication failed, keeping append order
//!
//! The buffer is unbounded. While the central service is unreachable it grows
//! with every logged record; a warning is logged once the configured
//! threshold is crossed.

use crate::models::{LogRecord, LogTime};
use crate::config::DEFAULT_BUFFER_WARN_THRESHOLD;
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::{info, warn};

/// FIFO buffer of records waiting to be published
#[derive(Debug)]
pub struct MessageBuffer {
    inner: Mutex<BufferInner>,
    warn_threshold: usize,
}

#[derive(Debug, Default)]
struct BufferInner {
    records: VecDeque<LogRecord>,
    /// Set while the growth warning has been emitted and not yet re-armed
    warned: bool,
}

impl Default for MessageBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_WARN_THRESHOLD)
    }
}

impl MessageBuffer {
    /// Create an empty buffer warning above `warn_threshold` records
    pub fn new(warn_threshold: usize) -> Self {
        Self {
            inner: Mutex::new(BufferInner::default()),
            warn_threshold,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BufferInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a record, returning the new buffer length
    pub fn push(&self, record: LogRecord) -> usize {
        let mut inner = self.lock();
        inner.records.push_back(record);
        let len = inner.records.len();
        self.check_growth(&mut inner, len);
        len
    }

    /// Take every buffered record, leaving the buffer empty
    pub fn take(&self) -> Vec<LogRecord> {
        let mut inner = self.lock();
        let records = std::mem::take(&mut inner.records);
        if inner.warned {
            info!(
                drained = records.len(),
                "Pending log buffer drained below growth threshold"
            );
            inner.warned = false;
        }
        records.into()
    }

    /// Put a batch back in front of anything appended since it was taken
    pub fn requeue_front(&self, batch: Vec<LogRecord>) {
        if batch.is_empty() {
            return;
        }
        let mut inner = self.lock();
        let newer = std::mem::take(&mut inner.records);
        let mut records = VecDeque::from(batch);
        records.extend(newer);
        inner.records = records;
        let len = inner.records.len();
        self.check_growth(&mut inner, len);
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    /// Get statistics about the buffer
    pub fn stats(&self) -> BufferStats {
        let inner = self.lock();
        BufferStats {
            entries: inner.records.len(),
            text_bytes: inner.records.iter().map(|r| r.text.len()).sum(),
            oldest_timestamp: inner.records.front().map(|r| r.timestamp),
            newest_timestamp: inner.records.back().map(|r| r.timestamp),
            warn_threshold: self.warn_threshold,
        }
    }

    fn check_growth(&self, inner: &mut BufferInner, len: usize) {
        if len > self.warn_threshold && !inner.warned {
            inner.warned = true;
            warn!(
                pending = len,
                threshold = self.warn_threshold,
                "Pending log buffer keeps growing, central service may be unreachable"
            );
        }
    }
}

/// Buffer statistics
#[derive(Debug, Clone, PartialEq)]
pub struct BufferStats {
    /// Number of records waiting
    pub entries: usize,
    /// Total size of the record texts in bytes
    pub text_bytes: usize,
    /// Timestamp of the oldest waiting record
    pub oldest_timestamp: Option<LogTime>,
    /// Timestamp of the newest waiting record
    pub newest_timestamp: Option<LogTime>,
    /// Growth warning threshold
    pub warn_threshold: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn record(text: &str) -> LogRecord {
        LogRecord::new("test", "INFO", text)
    }

    fn texts(records: &[LogRecord]) -> Vec<String> {
        records.iter().map(|r| r.text.clone()).collect()
    }

    #[test]
    fn test_buffer_push_and_take() {
        let buffer = MessageBuffer::default();

        assert_eq!(buffer.push(record("a")), 1);
        assert_eq!(buffer.push(record("b")), 2);

        let taken = buffer.take();
        assert_eq!(texts(&taken), vec!["a", "b"]);
        assert!(buffer.is_empty());
        assert!(buffer.take().is_empty());
    }

    #[test]
    fn test_requeue_keeps_original_order() {
        let buffer = MessageBuffer::default();
        buffer.push(record("1"));
        buffer.push(record("2"));

        let failed = buffer.take();
        buffer.push(record("3"));
        buffer.requeue_front(failed);

        assert_eq!(texts(&buffer.take()), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_requeue_empty_batch_is_noop() {
        let buffer = MessageBuffer::default();
        buffer.push(record("x"));
        buffer.requeue_front(Vec::new());
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_buffer_stats() {
        let buffer = MessageBuffer::new(2);
        assert_eq!(buffer.stats().entries, 0);
        assert!(buffer.stats().oldest_timestamp.is_none());

        buffer.push(record("abc"));
        buffer.push(record("de"));
        buffer.push(record("f"));

        let stats = buffer.stats();
        assert_eq!(stats.entries, 3);
        assert_eq!(stats.text_bytes, 6);
        assert_eq!(stats.warn_threshold, 2);
        assert!(stats.oldest_timestamp.unwrap() <= stats.newest_timestamp.unwrap());
    }

    #[test]
    fn test_growth_warning_rearms_after_take() {
        let buffer = MessageBuffer::new(1);
        buffer.push(record("a"));
        buffer.push(record("b"));
        assert!(buffer.lock().warned);

        buffer.take();
        assert!(!buffer.lock().warned);
    }

    #[test]
    fn test_concurrent_push_and_take_loses_nothing() {
        let buffer = Arc::new(MessageBuffer::default());
        let producers: Vec<_> = (0..4)
            .map(|p| {
                let buffer = buffer.clone();
                std::thread::spawn(move || {
                    for i in 0..250 {
                        buffer.push(record(&format!("{}-{}", p, i)));
                    }
                })
            })
            .collect();

        let mut collected = Vec::new();
        while collected.len() < 1000 {
            collected.extend(buffer.take());
            std::thread::yield_now();
        }
        for handle in producers {
            handle.join().unwrap();
        }
        collected.extend(buffer.take());

        assert_eq!(collected.len(), 1000);
        // Per-producer order is preserved
        for p in 0..4 {
            let prefix = format!("{}-", p);
            let seq: Vec<usize> = collected
                .iter()
                .filter_map(|r| r.text.strip_prefix(&prefix))
                .map(|n| n.parse().unwrap())
                .collect();
            assert_eq!(seq, (0..250).collect::<Vec<_>>());
        }
    }
}
