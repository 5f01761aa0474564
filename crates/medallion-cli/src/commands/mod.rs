//! CLI command implementations.

pub mod check;
pub mod run;
pub mod tables;

use std::path::PathBuf;

use medallion::PipelineConfig;

use crate::cli::SourceArgs;

/// Config file (if any) with command-line overrides applied.
fn load_config(
    source: &SourceArgs,
    curated_dir: Option<PathBuf>,
) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    let mut config = match &source.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = &source.raw_dir {
        config.raw_dir = dir.clone();
    }
    if let Some(dir) = curated_dir {
        config.curated_dir = dir;
    }
    if source.as_of.is_some() {
        config.as_of = source.as_of;
    }
    Ok(config)
}
