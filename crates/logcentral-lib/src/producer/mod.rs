//! Producer client runtime
//!
//! This module provides:
//! - `ConnectionManager`: registration lifecycle, `log` and `is_loggable`
//! - `MessageBuffer`: pending records, drained whole by the flush task
//! - `FlushTask` / `HeartbeatTask`: the two background activities of a session
//! - `TagFilter`: tags the central service wants to receive

mod buffer;
mod filter;
mod flush;
mod heartbeat;
mod manager;


pub use buffer::{BufferStats, MessageBuffer};
pub use filter::{TagFilter, WILDCARD_TAG};
pub use flush::{FlushOutcome, FlushTask};
pub use heartbeat::HeartbeatTask;
pub use manager::{local_hostname, ConnectionManager, ConnectionManagerBuilder, ProducerRole};
