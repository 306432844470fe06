//! Conversions between wire messages and runtime types

use crate::models::{Filter, LogRecord, LogTime};
use crate::proto as pb;

impl From<LogTime> for prost_types::Timestamp {
    fn from(t: LogTime) -> Self {
        prost_types::Timestamp {
            seconds: t.sec,
            nanos: t.msec * 1_000_000,
        }
    }
}

impl From<prost_types::Timestamp> for LogTime {
    fn from(ts: prost_types::Timestamp) -> Self {
        LogTime::new(ts.seconds, ts.nanos.clamp(0, 999_999_999) / 1_000_000)
    }
}

impl From<&LogRecord> for pb::LogRecord {
    fn from(record: &LogRecord) -> Self {
        pb::LogRecord {
            producer_name: record.producer_name.clone(),
            timestamp: Some(record.timestamp.into()),
            is_binary: record.is_binary,
            tag: record.tag.clone(),
            text: record.text.clone(),
        }
    }
}

impl From<pb::LogRecord> for LogRecord {
    fn from(record: pb::LogRecord) -> Self {
        LogRecord {
            producer_name: record.producer_name,
            timestamp: record.timestamp.map(LogTime::from).unwrap_or_default(),
            is_binary: record.is_binary,
            tag: record.tag,
            text: record.text,
        }
    }
}

impl From<&Filter> for pb::FilterSpec {
    fn from(filter: &Filter) -> Self {
        pb::FilterSpec {
            name: filter.name.clone(),
            tags: filter.tags.clone(),
            components: filter.components.clone(),
        }
    }
}
