//! Check command - dry-run transform of every table.

use colored::Colorize;

use super::load_config;
use crate::cli::SourceArgs;

pub fn run(source: SourceArgs, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&source, None)?;
    let orchestrator = config.orchestrator()?;
    let checks = orchestrator.dry_run()?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&checks)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Checked".cyan().bold(),
        config.raw_dir.display().to_string().white()
    );
    println!();
    println!(
        "  {:<20} {:>8} {:>8} {:>10} {:>8}",
        "table", "raw", "null key", "duplicate", "output"
    );
    for check in &checks {
        println!(
            "  {:<20} {:>8} {:>8} {:>10} {:>8}",
            check.table,
            check.stats.raw_rows,
            check.stats.null_key_rows,
            check.stats.duplicate_rows,
            check.stats.output_rows.to_string().green()
        );
    }
    Ok(())
}
