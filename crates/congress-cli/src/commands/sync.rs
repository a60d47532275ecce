//! The sync command: optional wipe, then a full run.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use dialoguer::Confirm;
use tracing::info;

use congress_core::{DirectoryLoader, DEFAULT_BATCH_SIZE};
use congress_graph::{
    managed_node_count, run_full_sync, wipe_managed_nodes, GraphStore, MemoryGraph, SyncOptions,
};

use super::ConnectionArgs;
use crate::config::FileConfig;
use crate::output;

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Root holding congress/, committee/ and person/ [default: data]
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Records per committee/person batch [default: 50]
    #[arg(long, value_parser = parse_batch_size)]
    pub batch_size: Option<usize>,

    /// Delete all Congress, Committee and Person nodes before syncing
    #[arg(long)]
    pub clear: bool,

    /// Skip the confirmation prompt for --clear
    #[arg(long)]
    pub yes: bool,

    /// Sync into an in-memory graph without connecting to Neo4j
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_batch_size(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("batch size must be at least 1".to_string()),
        Ok(size) => Ok(size),
        Err(e) => Err(e.to_string()),
    }
}

pub async fn execute(args: SyncArgs, connection: &ConnectionArgs, file: &FileConfig) -> Result<()> {
    let data_dir = args
        .data_dir
        .clone()
        .or_else(|| file.data_dir.clone())
        .unwrap_or_else(|| PathBuf::from("data"));
    let options = SyncOptions {
        batch_size: args.batch_size.or(file.batch_size).unwrap_or(DEFAULT_BATCH_SIZE),
    };

    let loader = DirectoryLoader::open(&data_dir)
        .with_context(|| format!("Cannot sync from {}", data_dir.display()))?;

    if args.dry_run {
        if !args.json {
            println!("{}", "Dry run: syncing into an in-memory graph".yellow());
        }
        let graph = MemoryGraph::new();
        return run(&graph, &loader, options, &args, prompt_wipe).await;
    }

    let client = super::connect(connection, file).await?;
    run(&client, &loader, options, &args, prompt_wipe).await
}

async fn run<S: GraphStore + ?Sized>(
    store: &S,
    loader: &DirectoryLoader,
    options: SyncOptions,
    args: &SyncArgs,
    confirm: impl FnOnce(usize) -> Result<bool>,
) -> Result<()> {
    if args.clear {
        clear(store, args.yes, confirm).await?;
    }

    if !args.json {
        println!(
            "{} {}",
            "Syncing from".bold(),
            loader.root().display().to_string().cyan()
        );
    }

    let report = run_full_sync(store, loader, options).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::print_report(&report);
    }
    Ok(())
}

/// Wipe managed nodes unless the user declines. Either way the sync goes on.
///
/// `confirm` receives the number of nodes about to be deleted and is not
/// called when `skip_prompt` is set or there is nothing to delete.
async fn clear<S: GraphStore + ?Sized>(
    store: &S,
    skip_prompt: bool,
    confirm: impl FnOnce(usize) -> Result<bool>,
) -> Result<()> {
    let existing = managed_node_count(store).await?;
    if existing == 0 {
        println!("{}", "Nothing to clear.".dimmed());
        return Ok(());
    }

    if !skip_prompt && !confirm(existing)? {
        info!(existing, "Clear operation cancelled");
        println!("{}", "Clear cancelled; syncing without wiping.".dimmed());
        return Ok(());
    }

    let deleted = wipe_managed_nodes(store).await?;
    println!("  {} Deleted {} nodes", "✓".green(), deleted);
    Ok(())
}

fn prompt_wipe(existing: usize) -> Result<bool> {
    println!(
        "{} {} Congress, Committee and Person nodes and their relationships",
        "This will permanently delete".red().bold(),
        existing.to_string().bold()
    );
    let confirmed = Confirm::new()
        .with_prompt("Continue?")
        .default(false)
        .interact()?;
    Ok(confirmed)
}
