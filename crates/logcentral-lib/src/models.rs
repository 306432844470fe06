//! Core data models shared by the producer and tool runtimes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wall-clock timestamp with millisecond precision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LogTime {
    pub sec: i64,
    pub msec: i32,
}

impl LogTime {
    pub fn new(sec: i64, msec: i32) -> Self {
        Self { sec, msec }
    }

    /// Current wall-clock time
    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    /// Milliseconds since the Unix epoch
    pub fn as_millis(&self) -> i64 {
        self.sec * 1000 + i64::from(self.msec)
    }
}

impl From<DateTime<Utc>> for LogTime {
    fn from(dt: DateTime<Utc>) -> Self {
        Self {
            sec: dt.timestamp(),
            msec: dt.timestamp_subsec_millis() as i32,
        }
    }
}

impl fmt::Display for LogTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::<Utc>::from_timestamp(self.sec, (self.msec.max(0) as u32) * 1_000_000) {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
            None => write!(f, "{}.{:03}", self.sec, self.msec),
        }
    }
}

/// A single log message emitted by a producer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub producer_name: String,
    pub timestamp: LogTime,
    pub is_binary: bool,
    pub tag: String,
    pub text: String,
}

impl LogRecord {
    /// Create a text record stamped with the current time
    pub fn new(producer_name: impl Into<String>, tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            producer_name: producer_name.into(),
            timestamp: LogTime::now(),
            is_binary: false,
            tag: tag.into(),
            text: text.into(),
        }
    }

    /// Mark the payload as binary
    pub fn binary(mut self, is_binary: bool) -> Self {
        self.is_binary = is_binary;
        self
    }
}

/// Result codes of the central log service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    Ok,
    BadName,
    AlreadyExists,
    BadCallback,
    InternalError,
    NotExists,
    FilterAlreadyExists,
    FilterNotExists,
    /// Local failure: the service could not be reached or answered garbage
    Failure,
}

impl StatusCode {
    pub fn is_ok(&self) -> bool {
        matches!(self, StatusCode::Ok)
    }

    /// Decode a wire value; anything unknown is a generic failure
    pub fn from_wire(code: i32) -> Self {
        match code {
            0 => StatusCode::Ok,
            1 => StatusCode::BadName,
            2 => StatusCode::AlreadyExists,
            3 => StatusCode::BadCallback,
            4 => StatusCode::InternalError,
            5 => StatusCode::NotExists,
            6 => StatusCode::FilterAlreadyExists,
            7 => StatusCode::FilterNotExists,
            _ => StatusCode::Failure,
        }
    }

    pub fn to_wire(self) -> i32 {
        match self {
            StatusCode::Ok => 0,
            StatusCode::BadName => 1,
            StatusCode::AlreadyExists => 2,
            StatusCode::BadCallback => 3,
            StatusCode::InternalError => 4,
            StatusCode::NotExists => 5,
            StatusCode::FilterAlreadyExists => 6,
            StatusCode::FilterNotExists => 7,
            StatusCode::Failure => -1,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatusCode::Ok => "ok",
            StatusCode::BadName => "bad name",
            StatusCode::AlreadyExists => "already exists",
            StatusCode::BadCallback => "bad callback",
            StatusCode::InternalError => "internal error",
            StatusCode::NotExists => "does not exist",
            StatusCode::FilterAlreadyExists => "filter already exists",
            StatusCode::FilterNotExists => "filter does not exist",
            StatusCode::Failure => "failure",
        };
        f.write_str(s)
    }
}

/// Registration state of a producer or tool session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Message filter installed by a tool on the central service
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Filter {
    pub name: String,
    pub tags: Vec<String>,
    pub components: Vec<String>,
}
