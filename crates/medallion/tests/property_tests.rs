//! Property-based tests for the rule sets and the transformation engine.
//!
//! These verify that:
//! 1. **Totality**: no raw value can make a rule fail or panic
//! 2. **Determinism**: the same snapshot always yields the same curated table
//! 3. **Cardinality**: the engine never produces more rows than it read
//!
//! ```bash
//! PROPTEST_CASES=10000 cargo test -p medallion --test property_tests
//! ```

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;

use medallion::input::RawTable;
use medallion::rules::dates::{parse_date, parse_yyyymmdd};
use medallion::rules::{NOT_AVAILABLE, RuleContext, SalesLine, standard_rule_sets};
use medallion::{RuleSet, TransformEngine};

// =============================================================================
// Test Strategies
// =============================================================================

/// Field values a messy extract might hold.
fn raw_field() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[ ]{1,3}",
        "-?[0-9]{1,10}",
        "[0-9]{8}",
        "(19|20)[0-9]{2}-[01][0-9]-[0-3][0-9]",
        "[A-Za-z]{1,3}",
        "[A-Za-z0-9 _\\-]{0,20}",
        "[a-zA-Z0-9_\\-\\.\\s/]{0,40}",
    ]
}

fn rule_sets() -> Vec<RuleSet> {
    let ctx = RuleContext::new(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
    standard_rule_sets(&ctx).unwrap()
}

/// Snapshot shaped for `rules`, with `rows` random rows.
fn snapshot(rules: &RuleSet, rows: Vec<Vec<String>>) -> RawTable {
    let headers = rules.required_columns().to_vec();
    let width = headers.len();
    let rows = rows
        .into_iter()
        .map(|mut r| {
            r.resize(width, String::new());
            r
        })
        .collect();
    RawTable::new(rules.source(), headers, rows)
}

fn raw_rows() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec(raw_field(), 9), 0..30)
}

// =============================================================================
// Engine properties
// =============================================================================

proptest! {
    /// Every table transforms any well-shaped snapshot without error.
    #[test]
    fn rules_are_total(rows in raw_rows()) {
        let engine = TransformEngine::new();
        for rules in rule_sets() {
            let raw = snapshot(&rules, rows.clone());
            let outcome = engine.transform(&rules, &raw);
            prop_assert!(outcome.is_ok(), "{}: {:?}", rules.source(), outcome.err());
        }
    }

    #[test]
    fn output_never_exceeds_input(rows in raw_rows()) {
        let engine = TransformEngine::new();
        for rules in rule_sets() {
            let raw = snapshot(&rules, rows.clone());
            let outcome = engine.transform(&rules, &raw).unwrap();
            prop_assert!(outcome.stats.output_rows <= raw.row_count());
            prop_assert_eq!(
                outcome.stats.output_rows + outcome.stats.dropped(),
                outcome.stats.raw_rows
            );
            prop_assert_eq!(outcome.table.row_count(), outcome.stats.output_rows);
        }
    }

    #[test]
    fn transform_is_deterministic(rows in raw_rows()) {
        let engine = TransformEngine::new();
        for rules in rule_sets() {
            let raw = snapshot(&rules, rows.clone());
            let first = engine.transform(&rules, &raw).unwrap().table.to_snapshot();
            let second = engine.transform(&rules, &raw).unwrap().table.to_snapshot();
            prop_assert_eq!(first.fingerprint(), second.fingerprint());
        }
    }

    /// Customer keys are unique and never null after deduplication.
    #[test]
    fn customer_keys_unique(rows in raw_rows()) {
        let rules = rule_sets().into_iter().next().unwrap();
        let raw = snapshot(&rules, rows);
        let table = TransformEngine::new().transform(&rules, &raw).unwrap().table;

        let keys = table.column("cst_id");
        prop_assert!(keys.iter().all(|k| !k.is_null()));
        let distinct: HashSet<_> = keys.iter().collect();
        prop_assert_eq!(distinct.len(), keys.len());
    }

    /// Coded columns only ever hold a label or the sentinel.
    #[test]
    fn categorical_columns_closed(rows in raw_rows()) {
        let rules = rule_sets().into_iter().next().unwrap();
        let raw = snapshot(&rules, rows);
        let table = TransformEngine::new().transform(&rules, &raw).unwrap().table;

        for value in table.column("cst_gndr") {
            let label = value.as_text().unwrap_or_default();
            prop_assert!(["Female", "Male", NOT_AVAILABLE].contains(&label));
        }
        for value in table.column("cst_marital_status") {
            let label = value.as_text().unwrap_or_default();
            prop_assert!(["Single", "Married", NOT_AVAILABLE].contains(&label));
        }
    }
}

// =============================================================================
// Rule properties
// =============================================================================

proptest! {
    #[test]
    fn encoded_date_never_panics(n in any::<i64>()) {
        let _ = parse_yyyymmdd(Some(n));
    }

    #[test]
    fn encoded_date_roundtrip(y in 1900i32..2100, m in 1u32..=12, d in 1u32..=28) {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        let encoded = i64::from(date.year()) * 10_000 + i64::from(m) * 100 + i64::from(d);
        prop_assert_eq!(parse_yyyymmdd(Some(encoded)), Some(date));
        prop_assert_eq!(parse_date(Some(encoded.to_string().as_str())), Some(date));
    }

    #[test]
    fn short_or_nonpositive_encoded_dates_are_null(n in -10_000_000i64..10_000_000) {
        prop_assert_eq!(parse_yyyymmdd(Some(n)), None);
    }

    #[test]
    fn parse_date_never_panics(s in "\\PC{0,30}") {
        let _ = parse_date(Some(s.as_str()));
    }

    /// With a positive quantity and price the repaired line is consistent.
    #[test]
    fn repair_is_consistent(
        sales in prop::option::of(-1_000_000i64..1_000_000),
        quantity in 1i64..1_000,
        price in 1i64..100_000,
    ) {
        let repaired = SalesLine { sales, quantity: Some(quantity), price: Some(price) }.repair();
        prop_assert_eq!(repaired.price, Some(price));
        prop_assert_eq!(repaired.sales, Some(quantity * price));
    }

    #[test]
    fn repair_never_panics(
        sales in prop::option::of(any::<i64>()),
        quantity in prop::option::of(any::<i64>()),
        price in prop::option::of(any::<i64>()),
    ) {
        let _ = SalesLine { sales, quantity, price }.repair();
    }
}
