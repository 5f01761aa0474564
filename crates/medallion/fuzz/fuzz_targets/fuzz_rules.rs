//! Fuzz target for the table rule sets.
//!
//! Every rule is total: arbitrary field values must transform without error.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use medallion::input::RawTable;
use medallion::rules::{RuleContext, standard_rule_sets};
use medallion::TransformEngine;

#[derive(Debug, Arbitrary)]
struct Input {
    table: u8,
    rows: Vec<Vec<String>>,
}

fuzz_target!(|input: Input| {
    let Ok(rule_sets) = standard_rule_sets(&RuleContext::default()) else {
        return;
    };
    let rules = &rule_sets[usize::from(input.table) % rule_sets.len()];
    let headers = rules.required_columns().to_vec();
    let rows = input
        .rows
        .into_iter()
        .take(200)
        .map(|mut r| {
            r.resize(headers.len(), String::new());
            r
        })
        .collect();
    let raw = RawTable::new(rules.source(), headers, rows);

    if let Err(e) = TransformEngine::new().transform(rules, &raw) {
        panic!("rule set {} rejected well-shaped input: {}", rules.source(), e);
    }
});
