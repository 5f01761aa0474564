//! Run command - full truncate-and-reload of every curated table.

use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

use colored::Colorize;
use medallion::{BatchResult, BatchStatus, LoadResult};
use tracing::warn;

use super::load_config;
use crate::cli::SourceArgs;

pub fn run(
    source: SourceArgs,
    curated_dir: Option<PathBuf>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&source, curated_dir)?;
    let mut orchestrator = config.orchestrator()?;

    // Ctrl-C stops at the next table boundary; the table in flight finishes.
    let stop = orchestrator.stop_handle();
    ctrlc::set_handler(move || {
        warn!("stop requested, finishing current table");
        stop.store(true, Ordering::SeqCst);
    })?;

    let (result, failure) = match orchestrator.run_full_load() {
        Ok(result) => (result, None),
        Err(e) => (e.partial, Some(e.error)),
    };

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&result, &config.raw_dir, &config.curated_dir);
    }

    if let Some(error) = failure {
        return Err(error.into());
    }
    if result.status == BatchStatus::Stopped {
        return Err("load stopped before all tables completed".into());
    }
    Ok(())
}

fn print_report(result: &BatchResult, raw_dir: &Path, curated_dir: &Path) {
    println!(
        "{} {} {} {}",
        "Full load".cyan().bold(),
        raw_dir.display().to_string().white(),
        "->".dimmed(),
        curated_dir.display().to_string().white()
    );
    println!();

    for load in &result.loads {
        print_load(load);
    }
    println!();

    let status = match result.status {
        BatchStatus::Completed => "completed".green().bold(),
        BatchStatus::Failed => "failed".red().bold(),
        BatchStatus::Stopped => "stopped".yellow().bold(),
    };
    println!(
        "{} {} tables, {} rows in {} ms",
        status,
        result.loads.iter().filter(|l| l.is_success()).count(),
        result.rows_loaded().to_string().white().bold(),
        result.duration_ms
    );
}

fn print_load(load: &LoadResult) {
    if load.is_success() {
        let dropped = load.null_key_rows + load.duplicate_rows;
        let dropped = if dropped > 0 {
            format!(" ({} dropped)", dropped).yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "  {} {:<28} {:>8} rows{} {:>6} ms",
            "✓".green(),
            load.target,
            load.rows_loaded,
            dropped,
            load.duration_ms
        );
    } else {
        let message = load
            .error
            .as_ref()
            .map(|e| format!("{}: {}", e.kind, e.message))
            .unwrap_or_default();
        println!("  {} {:<28} {}", "✗".red(), load.target, message.red());
    }
}
