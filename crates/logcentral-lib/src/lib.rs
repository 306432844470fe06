//! Client runtime for the LogCentral log-collection service
//!
//! This crate provides the core functionality for:
//! - Producers: buffering log records and publishing them in the background,
//!   with heartbeats and a tag filter pushed by the service
//! - Tools: receiving the records matching their filters
//! - The session lifecycle shared by both
//! - A gRPC transport for the service contract
//! - Health checks and observability

pub mod config;
pub mod error;
pub mod health;
pub mod lifecycle;
pub mod models;
pub mod observability;
pub mod producer;
pub mod proto;
pub mod remote;
pub mod tool;
pub mod transport;

pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{ClientError, RemoteError};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use lifecycle::Connection;
pub use models::*;
pub use observability::{ClientMetrics, StructuredLogger};
pub use producer::ConnectionManager;
pub use remote::{MessageReceiver, ProducerCallback, RemoteEndpoint, ToolEndpoint};
pub use tool::ToolClient;
pub use transport::{GrpcConfig, GrpcEndpoint};
