//! CLI argument definitions using clap.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Medallion: bronze-to-silver loader for CRM and ERP extracts
#[derive(Parser)]
#[command(name = "medallion")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Where to read from and write to. Flags override the config file.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Pipeline config file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory of raw <table>.csv extracts
    #[arg(long, value_name = "DIR")]
    pub raw_dir: Option<PathBuf>,

    /// Load date for plausibility rules, YYYY-MM-DD (default: today)
    #[arg(long, value_name = "DATE")]
    pub as_of: Option<NaiveDate>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Truncate and reload every curated table
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// Directory curated tables are written to
        #[arg(long, value_name = "DIR")]
        curated_dir: Option<PathBuf>,

        /// Print the batch result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the rule set of every table
    Tables {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Transform every table without writing anything
    Check {
        #[command(flatten)]
        source: SourceArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
