//! `statusgen projects`

use super::{jira_client, OutputFormat};
use crate::config::StatusConfig;
use crate::error::Result;
use colored::Colorize;
use tabled::Table;

/// Handle projects command
pub async fn handle_projects(config: &StatusConfig, format: OutputFormat) -> Result<()> {
    let client = jira_client(config)?;
    let projects = client.discover_projects().await?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&projects)?);
        return Ok(());
    }

    if projects.is_empty() {
        println!("{}", "No accessible projects found".yellow());
        return Ok(());
    }
    let count = projects.len();
    println!("{}", Table::new(projects));
    println!("\n{} project(s)", count);
    Ok(())
}
