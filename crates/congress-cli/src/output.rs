//! Terminal output formatting.

use colored::{ColoredString, Colorize};

use congress_graph::sync::{Outcome, PassReport};
use congress_graph::{GraphStatistics, SyncReport};

/// Print node, relationship and term counts.
pub fn print_statistics(stats: &GraphStatistics) {
    println!("{}", "Nodes".bold());
    for (label, count) in &stats.nodes {
        println!("  {:<14} {}", label.as_str(), count.to_string().cyan());
    }
    println!("{}", "Relationships".bold());
    for (edge_type, count) in &stats.edges {
        println!("  {:<14} {}", edge_type.as_str(), count.to_string().cyan());
    }
    println!("{}", "Terms served".bold());
    println!("  {:<14} {}", "senator", stats.senator_terms.to_string().cyan());
    println!(
        "  {:<14} {}",
        "representative",
        stats.representative_terms.to_string().cyan()
    );
}

/// Print the end-of-run summary.
pub fn print_report(report: &SyncReport) {
    println!();
    println!(
        "{} {}",
        "Sync complete".green().bold(),
        format!("(run {})", report.run_id).dimmed()
    );
    println!("{}", "─".repeat(60));

    println!(
        "{:<12} {:>8} {:>8} {:>8} {:>8} {:>10}",
        "Pass", "Loaded", "Nodes", "Edges", "Failed", "Time"
    );
    for pass in &report.passes {
        print_pass(pass);
    }

    if !report.indexes.warnings.is_empty() {
        println!();
        println!("{}", "Index warnings".yellow().bold());
        for warning in &report.indexes.warnings {
            println!("  {} {}", "!".yellow(), warning);
        }
    }

    let rejected: Vec<_> = report.passes.iter().flat_map(|p| &p.rejected).collect();
    if !rejected.is_empty() {
        println!();
        println!("{} ({})", "Rejected documents".red().bold(), rejected.len());
        for record in rejected {
            println!("  {} {}: {}", "✗".red(), record.source, record.reason.dimmed());
        }
    }

    let failed: Vec<_> = report
        .passes
        .iter()
        .flat_map(|p| p.failed_batches().map(move |b| (p.label, b)))
        .collect();
    if !failed.is_empty() {
        println!();
        println!("{} ({})", "Failed batches".red().bold(), failed.len());
        for (label, batch) in failed {
            println!(
                "  {} {} batch {} ({} items): {}",
                "✗".red(),
                label,
                batch.batch,
                batch.size,
                outcome_text(&batch.outcome)
            );
        }
    }

    let unresolved = report.unresolved_references();
    if unresolved > 0 {
        println!();
        println!(
            "{} {} session references had no matching session",
            "!".yellow(),
            unresolved.to_string().bold()
        );
    }

    if let Some(stats) = &report.statistics {
        println!();
        print_statistics(stats);
    }
    println!("{}", "─".repeat(60));
}

fn print_pass(pass: &PassReport) {
    let failed = pass.failed_batches().count();
    println!(
        "{:<12} {:>8} {:>8} {:>8} {:>8} {:>10}",
        pass.label.as_str(),
        pass.records_loaded,
        pass.nodes_written(),
        pass.edges_submitted(),
        failed_count(failed),
        format!("{}ms", pass.elapsed_ms)
    );
}

fn failed_count(failed: usize) -> ColoredString {
    if failed == 0 {
        "0".normal()
    } else {
        failed.to_string().red()
    }
}

fn outcome_text(outcome: &Outcome) -> ColoredString {
    match outcome {
        Outcome::Applied => "applied".green(),
        Outcome::Skipped(reason) => format!("skipped: {}", reason).yellow(),
        Outcome::Failed(reason) => reason.red(),
    }
}
