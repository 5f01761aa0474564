//! Transformation engine that applies a rule set to a raw snapshot.

use std::collections::HashMap;

use indexmap::IndexMap;
use indexmap::map::Entry;
use tracing::debug;

use crate::curated::{CuratedRecord, CuratedTable};
use crate::error::{MedallionError, Result};
use crate::input::RawTable;
use crate::rules::{ColumnRule, RowPolicy, RuleSet, dates::day_before};
use crate::schema::Value;

use super::operations::{TransformOutcome, TransformStats};

/// Applies rule sets to raw snapshots.
///
/// The engine is stateless: the same snapshot and rule set always produce the
/// same rows in the same order.
pub struct TransformEngine;

impl TransformEngine {
    /// Create a new transform engine.
    pub fn new() -> Self {
        Self
    }

    /// Produce the complete curated table for `raw` under `rules`.
    ///
    /// Row selection runs first, then row rules, then derived columns. The
    /// surviving rows keep their raw order. Only operational problems are
    /// errors: a raw extract missing columns, or a rule producing a value its
    /// column does not accept.
    pub fn transform(&self, rules: &RuleSet, raw: &RawTable) -> Result<TransformOutcome> {
        rules.validate_source(raw)?;

        let mut stats = TransformStats {
            raw_rows: raw.row_count(),
            ..TransformStats::default()
        };

        let selected = self.select_rows(rules.policy(), raw, &mut stats);

        let width = rules.schema().width();
        let mut rows: Vec<Vec<Value>> = Vec::with_capacity(selected.len());
        for &idx in &selected {
            let Some(record) = raw.record(idx) else {
                continue;
            };
            let mut values = Vec::with_capacity(width);
            for (_, rule) in rules.rules() {
                values.push(match rule {
                    ColumnRule::Row(f) => f(&record),
                    ColumnRule::DerivedEnd { .. } => Value::Null,
                });
            }
            rows.push(values);
        }

        for (position, (name, rule)) in rules.rules().enumerate() {
            if let ColumnRule::DerivedEnd {
                partition_by,
                order_by,
            } = rule
            {
                let (Some(part_idx), Some(order_idx)) = (
                    rules.schema().position(partition_by),
                    rules.schema().position(order_by),
                ) else {
                    return Err(MedallionError::schema_mismatch(
                        rules.source(),
                        format!("derived column '{}' references unknown columns", name),
                    ));
                };
                self.fill_derived_end(&mut rows, position, part_idx, order_idx);
            }
        }

        let records = rows
            .into_iter()
            .map(|values| self.check_row(rules, values))
            .collect::<Result<Vec<_>>>()?;

        stats.output_rows = records.len();
        debug!(
            table = rules.source(),
            raw_rows = stats.raw_rows,
            null_key_rows = stats.null_key_rows,
            duplicate_rows = stats.duplicate_rows,
            output_rows = stats.output_rows,
            "transformed"
        );

        Ok(TransformOutcome {
            table: CuratedTable::new(rules.schema().clone(), records),
            stats,
        })
    }

    /// Indices of the raw rows that survive the row policy, in raw order.
    fn select_rows(
        &self,
        policy: &RowPolicy,
        raw: &RawTable,
        stats: &mut TransformStats,
    ) -> Vec<usize> {
        match policy {
            RowPolicy::KeepAll => (0..raw.row_count()).collect(),
            RowPolicy::LatestPerKey { key, order_by, .. } => {
                // key -> (ordering value, raw index) of the current winner
                let mut winners: IndexMap<Value, (Value, usize)> = IndexMap::new();
                for (idx, record) in raw.records().enumerate() {
                    let k = key(&record);
                    if k.is_null() {
                        stats.null_key_rows += 1;
                        continue;
                    }
                    let o = order_by(&record);
                    match winners.entry(k) {
                        Entry::Occupied(mut current) => {
                            stats.duplicate_rows += 1;
                            // Ties go to the later raw row.
                            if o >= current.get().0 {
                                current.insert((o, idx));
                            }
                        }
                        Entry::Vacant(slot) => {
                            slot.insert((o, idx));
                        }
                    }
                }
                let mut selected: Vec<usize> = winners.values().map(|(_, idx)| *idx).collect();
                selected.sort_unstable();
                selected
            }
        }
    }

    /// Close each row's range the day before the next start in its partition.
    fn fill_derived_end(
        &self,
        rows: &mut [Vec<Value>],
        target: usize,
        partition: usize,
        order: usize,
    ) {
        let mut groups: HashMap<Value, Vec<usize>> = HashMap::new();
        for (idx, row) in rows.iter().enumerate() {
            groups.entry(row[partition].clone()).or_default().push(idx);
        }

        for members in groups.values_mut() {
            // Stable: equal starts keep raw order.
            members.sort_by(|a, b| rows[*a][order].cmp(&rows[*b][order]));
            for pair in members.windows(2) {
                let next_start = rows[pair[1]][order].as_date();
                rows[pair[0]][target] = Value::from_date(day_before(next_start));
            }
            if let Some(&last) = members.last() {
                rows[last][target] = Value::Null;
            }
        }
    }

    /// Check a row against the schema; a violation is a rule defect.
    fn check_row(&self, rules: &RuleSet, values: Vec<Value>) -> Result<CuratedRecord> {
        for (column, value) in rules.schema().columns.iter().zip(values.iter()) {
            column
                .check(value)
                .map_err(|msg| MedallionError::schema_mismatch(rules.source(), msg))?;
        }
        Ok(CuratedRecord::new(values))
    }
}

impl Default for TransformEngine {
    fn default() -> Self {
        Self::new()
    }
}
