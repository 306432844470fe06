//! Subcommand implementations

pub mod catalog;
pub mod watch;

use crate::cli::Settings;
use anyhow::Result;
use logcentral_lib::{GrpcEndpoint, ToolClient};
use std::sync::Arc;

/// Tool client over gRPC plus the stream of records pushed to it
pub fn tool_client(
    settings: &Settings,
) -> Result<(ToolClient, tokio::sync::mpsc::UnboundedReceiver<logcentral_lib::LogRecord>)> {
    let endpoint = Arc::new(GrpcEndpoint::new(settings.grpc_config()?));
    Ok(ToolClient::new(endpoint, settings.name.clone()))
}
