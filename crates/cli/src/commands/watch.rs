//! Streaming records from the central service

use anyhow::{Context, Result};
use logcentral_lib::{Connection, Filter, LogRecord, ToolClient};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, warn};

use crate::output::{print_info, print_record, print_success, OutputFormat};

/// What to ask the service for
#[derive(Debug, Clone, PartialEq)]
pub struct WatchOptions {
    pub filter: Filter,
    pub limit: Option<usize>,
}

impl WatchOptions {
    pub fn new(
        filter_name: impl Into<String>,
        tags: Vec<String>,
        components: Vec<String>,
        limit: Option<usize>,
    ) -> Self {
        let clean = |values: Vec<String>| -> Vec<String> {
            values
                .into_iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect()
        };
        Self {
            filter: Filter {
                name: filter_name.into(),
                tags: clean(tags),
                components: clean(components),
            },
            limit,
        }
    }
}

/// Print records until Ctrl-C, the limit, or the end of the stream
pub async fn watch(
    client: &ToolClient,
    mut records: UnboundedReceiver<LogRecord>,
    options: WatchOptions,
    format: OutputFormat,
) -> Result<()> {
    client
        .connect("watch")
        .await
        .context("Failed to connect to central service")?;

    let result = stream(client, &mut records, &options, format).await;

    if let Err(e) = client.disconnect("user exit").await {
        warn!(error = %e, "Disconnect failed");
    }
    result
}

async fn stream(
    client: &ToolClient,
    records: &mut UnboundedReceiver<LogRecord>,
    options: &WatchOptions,
    format: OutputFormat,
) -> Result<()> {
    client
        .add_filter(&options.filter)
        .await
        .context("Failed to install filter")?;
    print_success(&format!(
        "Watching as {} (tags: {}, components: {})",
        client.name(),
        describe(&options.filter.tags),
        describe(&options.filter.components)
    ));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut received = 0usize;
    loop {
        if options.limit.is_some_and(|limit| received >= limit) {
            break;
        }
        tokio::select! {
            _ = &mut ctrl_c => {
                debug!("Interrupted");
                break;
            }
            record = records.recv() => match record {
                Some(record) => {
                    print_record(&record, format);
                    received += 1;
                }
                None => break,
            },
        }
    }

    print_info(&format!("{} records received", received));
    Ok(())
}

fn describe(values: &[String]) -> String {
    if values.is_empty() {
        "all".to_string()
    } else {
        values.join(",")
    }
}
