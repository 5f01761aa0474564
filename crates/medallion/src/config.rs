//! Pipeline configuration.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::curated::CsvCuratedStore;
use crate::error::{MedallionError, Result};
use crate::input::{CsvRawStore, ParserConfig};
use crate::orchestrator::BatchOrchestrator;
use crate::rules::{RuleContext, RuleSet, rule_set_for, standard_rule_sets};

/// Configuration for a directory-backed full load.
///
/// Every field has a default, so an empty TOML file is a valid config:
///
/// ```toml
/// raw_dir = "data/bronze"
/// curated_dir = "data/silver"
/// delimiter = ","
/// as_of = "2024-06-30"
/// tables = ["crm_cust_info", "crm_prd_info"]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directory holding `<table>.csv` raw extracts.
    pub raw_dir: PathBuf,
    /// Directory curated tables are published to.
    pub curated_dir: PathBuf,
    /// Field delimiter of the raw extracts (None = auto-detect).
    pub delimiter: Option<String>,
    /// Load date used by plausibility rules (None = today, UTC).
    pub as_of: Option<NaiveDate>,
    /// Tables to load, in order (None = all, standard order).
    pub tables: Option<Vec<String>>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("bronze"),
            curated_dir: PathBuf::from("silver"),
            delimiter: None,
            as_of: None,
            tables: None,
        }
    }
}

impl PipelineConfig {
    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| MedallionError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!(path = %path.display(), "loaded pipeline config");
        Self::from_toml(&text)
    }

    /// Effective load date.
    pub fn as_of_date(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }

    pub fn rule_context(&self) -> RuleContext {
        RuleContext::new(self.as_of_date())
    }

    /// Parser settings for the raw extracts.
    pub fn parser_config(&self) -> Result<ParserConfig> {
        let delimiter = match self.delimiter.as_deref() {
            None => None,
            Some(d) => Some(parse_delimiter(d)?),
        };
        Ok(ParserConfig {
            delimiter,
            ..ParserConfig::default()
        })
    }

    /// Rule sets to run, honoring the `tables` selection.
    pub fn rule_sets(&self) -> Result<Vec<RuleSet>> {
        let ctx = self.rule_context();
        let Some(tables) = &self.tables else {
            return standard_rule_sets(&ctx);
        };

        let mut seen = Vec::with_capacity(tables.len());
        let mut rule_sets = Vec::with_capacity(tables.len());
        for table in tables {
            if seen.contains(&table.as_str()) {
                return Err(MedallionError::Config(format!(
                    "table '{}' listed more than once",
                    table
                )));
            }
            seen.push(table.as_str());
            let rules = rule_set_for(table, &ctx)
                .ok_or_else(|| MedallionError::Config(format!("unknown table '{}'", table)))??;
            rule_sets.push(rules);
        }
        Ok(rule_sets)
    }

    /// Orchestrator reading and writing the configured directories.
    pub fn orchestrator(&self) -> Result<BatchOrchestrator<CsvRawStore, CsvCuratedStore>> {
        let raw = CsvRawStore::with_config(&self.raw_dir, self.parser_config()?);
        let curated = CsvCuratedStore::new(&self.curated_dir);
        Ok(BatchOrchestrator::new(raw, curated, self.rule_sets()?))
    }
}

fn parse_delimiter(text: &str) -> Result<u8> {
    match text {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        "comma" => Ok(b','),
        "semicolon" => Ok(b';'),
        "pipe" => Ok(b'|'),
        s if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        other => Err(MedallionError::Config(format!(
            "delimiter must be a single ASCII character, got '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{CRM_PRD_INFO, ERP_LOC_A101, TABLE_ORDER};

    #[test]
    fn test_empty_toml_is_default() {
        let config = PipelineConfig::from_toml("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.rule_sets().unwrap().len(), TABLE_ORDER.len());
    }

    #[test]
    fn test_full_toml() {
        let config = PipelineConfig::from_toml(
            r#"
            raw_dir = "in"
            curated_dir = "out"
            delimiter = "tab"
            as_of = "2024-06-30"
            tables = ["erp_loc_a101", "crm_prd_info"]
            "#,
        )
        .unwrap();

        assert_eq!(config.raw_dir, PathBuf::from("in"));
        assert_eq!(config.as_of_date(), NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
        assert_eq!(config.parser_config().unwrap().delimiter, Some(b'\t'));

        let sources: Vec<String> = config
            .rule_sets()
            .unwrap()
            .iter()
            .map(|r| r.source().to_string())
            .collect();
        assert_eq!(sources, vec![ERP_LOC_A101, CRM_PRD_INFO]);
    }

    #[test]
    fn test_unknown_table_rejected() {
        let config = PipelineConfig {
            tables: Some(vec!["crm_orders".into()]),
            ..PipelineConfig::default()
        };
        assert!(matches!(config.rule_sets(), Err(MedallionError::Config(_))));
    }

    #[test]
    fn test_duplicate_table_rejected() {
        let config = PipelineConfig {
            tables: Some(vec![ERP_LOC_A101.into(), ERP_LOC_A101.into()]),
            ..PipelineConfig::default()
        };
        assert!(config.rule_sets().is_err());
    }

    #[test]
    fn test_bad_delimiter() {
        let config = PipelineConfig {
            delimiter: Some(";;".into()),
            ..PipelineConfig::default()
        };
        assert!(config.parser_config().is_err());
        assert_eq!(parse_delimiter("|").unwrap(), b'|');
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(PipelineConfig::from_toml("raw = \"x\"").is_err());
    }
}
