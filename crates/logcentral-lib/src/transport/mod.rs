//! Transports implementing the central service contract

mod convert;
mod grpc;
mod stream;

pub use grpc::{apply_filter_update, GrpcConfig, GrpcConfigBuilder, GrpcEndpoint, TlsConfig};
pub use stream::ReopenBackoff;
