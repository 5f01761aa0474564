//! Tables command - describe the rule set of every table.

use colored::Colorize;
use medallion::RuleContext;
use medallion::rules::{RuleSetSummary, standard_rule_sets};

pub fn run(json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let summaries: Vec<RuleSetSummary> = standard_rule_sets(&RuleContext::default())?
        .iter()
        .map(|r| r.summary())
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for summary in &summaries {
        println!(
            "{} {} {}",
            summary.source.cyan().bold(),
            "->".dimmed(),
            summary.target.white().bold()
        );
        println!("  Rows: {}", summary.row_policy);
        println!("  Requires: {}", summary.required_columns.join(", ").dimmed());
        for column in &summary.columns {
            println!(
                "    {:<18} {:<10} {}",
                column.name,
                column.column_type.to_string().blue(),
                column.rule.dimmed()
            );
        }
        println!();
    }
    Ok(())
}
