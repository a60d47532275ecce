//! CLI command definitions and handlers.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use congress_graph::{GraphClient, GraphConfig};

use crate::config::FileConfig;

pub mod status;
pub mod sync;

/// Sync congress session, committee and person records into Neo4j
#[derive(Parser)]
#[command(name = "congress-sync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML config file (overridden by environment and flags)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub sync: sync::SyncArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Neo4j connection settings.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Neo4j bolt URI
    #[arg(long, env = "NEO4J_URI", global = true)]
    pub uri: Option<String>,

    /// Neo4j user
    #[arg(long, env = "NEO4J_USERNAME", global = true)]
    pub user: Option<String>,

    /// Neo4j password
    #[arg(long, env = "NEO4J_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Neo4j database name
    #[arg(long, env = "NEO4J_DATABASE", global = true)]
    pub database: Option<String>,

    /// Seconds to wait for the initial connection
    #[arg(long, default_value_t = 10, global = true)]
    pub connect_timeout: u64,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show node and relationship counts
    Status,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let file = FileConfig::load(self.config.as_deref())?;

        match self.command {
            Some(Commands::Status) => status::execute(&self.connection, &file).await,
            None => sync::execute(self.sync, &self.connection, &file).await,
        }
    }
}

/// Resolve the connection layers and connect, bounded by `--connect-timeout`.
pub async fn connect(args: &ConnectionArgs, file: &FileConfig) -> Result<GraphClient> {
    let config: GraphConfig = crate::config::resolve_connection(&file.neo4j, args)?;
    tracing::info!(uri = %config.uri, database = %config.database, "Connecting to Neo4j");

    let timeout = Duration::from_secs(args.connect_timeout);
    let client = tokio::time::timeout(timeout, GraphClient::connect(&config))
        .await
        .with_context(|| {
            format!(
                "Timed out after {}s connecting to Neo4j at {}",
                args.connect_timeout, config.uri
            )
        })??;

    tracing::info!(uri = %config.uri, "Connected to Neo4j");
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_sync() {
        let cli = Cli::try_parse_from([
            "congress-sync",
            "--data-dir",
            "records",
            "--batch-size",
            "10",
            "--clear",
            "--yes",
        ])
        .unwrap();

        assert!(cli.command.is_none());
        assert_eq!(cli.sync.data_dir, Some(PathBuf::from("records")));
        assert_eq!(cli.sync.batch_size, Some(10));
        assert!(cli.sync.clear);
        assert!(cli.sync.yes);
        assert!(!cli.sync.dry_run);
    }

    #[test]
    fn test_status_accepts_connection_flags() {
        let cli = Cli::try_parse_from([
            "congress-sync",
            "status",
            "--uri",
            "bolt://db:7687",
            "--connect-timeout",
            "3",
        ])
        .unwrap();

        assert!(matches!(cli.command, Some(Commands::Status)));
        assert_eq!(cli.connection.uri.as_deref(), Some("bolt://db:7687"));
        assert_eq!(cli.connection.connect_timeout, 3);
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        assert!(Cli::try_parse_from(["congress-sync", "--batch-size", "0"]).is_err());
    }
}
