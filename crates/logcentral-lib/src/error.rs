//! Error types for the LogCentral client runtime

use crate::models::StatusCode;
use std::time::Duration;

/// Failure to complete a call on the central service
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Remote call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Central service unavailable: {0}")]
    Unavailable(String),

    #[error("RPC failed: {0}")]
    Rpc(#[from] tonic::Status),

    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("TLS configuration error: {0}")]
    Tls(String),
}

/// Errors surfaced by the connection lifecycle and the tool API
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Registration rejected by central service: {0}")]
    Rejected(StatusCode),

    #[error("Registration failed: {0}")]
    Register(#[source] RemoteError),

    #[error("Unregister reported {0}; local session was closed anyway")]
    UnregisterRejected(StatusCode),

    #[error("Unregister failed: {0}; local session was closed anyway")]
    Unregister(#[source] RemoteError),

    #[error("Not connected")]
    NotConnected,

    #[error("Request rejected by central service: {0}")]
    RequestRejected(StatusCode),

    #[error("Request failed: {0}")]
    Request(#[source] RemoteError),
}

impl ClientError {
    /// Collapse the error into the service status code it corresponds to
    pub fn status(&self) -> StatusCode {
        match self {
            ClientError::Rejected(code)
            | ClientError::UnregisterRejected(code)
            | ClientError::RequestRejected(code) => *code,
            ClientError::Register(_)
            | ClientError::Unregister(_)
            | ClientError::NotConnected
            | ClientError::Request(_) => StatusCode::Failure,
        }
    }
}
