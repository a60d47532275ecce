//! The status command.

use anyhow::Result;
use colored::Colorize;

use congress_graph::collect_statistics;

use super::ConnectionArgs;
use crate::config::FileConfig;
use crate::output;

/// Show node and relationship counts for the managed labels.
pub async fn execute(connection: &ConnectionArgs, file: &FileConfig) -> Result<()> {
    let client = super::connect(connection, file).await?;

    println!("{}", "Congress Graph Status".bold());
    println!("{}", "─".repeat(40));
    let stats = collect_statistics(&client).await?;
    output::print_statistics(&stats);
    println!("{}", "─".repeat(40));

    Ok(())
}
