//! Listing what the central service knows about

use anyhow::{Context, Result};
use logcentral_lib::ToolClient;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_table, OutputFormat};

#[derive(Debug, Tabled, Serialize)]
pub struct TagRow {
    #[tabled(rename = "Tag")]
    pub tag: String,
}

#[derive(Debug, Tabled, Serialize)]
pub struct ComponentRow {
    #[tabled(rename = "Component")]
    pub component: String,
}

fn sorted(mut names: Vec<String>) -> Vec<String> {
    names.sort();
    names.dedup();
    names
}

pub fn tag_rows(tags: Vec<String>) -> Vec<TagRow> {
    sorted(tags).into_iter().map(|tag| TagRow { tag }).collect()
}

pub fn component_rows(components: Vec<String>) -> Vec<ComponentRow> {
    sorted(components)
        .into_iter()
        .map(|component| ComponentRow { component })
        .collect()
}

/// List defined tags
pub async fn show_tags(client: &ToolClient, format: OutputFormat) -> Result<()> {
    let tags = client
        .defined_tags()
        .await
        .context("Failed to list tags")?;
    print_table(&tag_rows(tags), format);
    Ok(())
}

/// List defined components
pub async fn show_components(client: &ToolClient, format: OutputFormat) -> Result<()> {
    let components = client
        .defined_components()
        .await
        .context("Failed to list components")?;
    print_table(&component_rows(components), format);
    Ok(())
}
