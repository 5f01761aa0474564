//! Core type definitions for curated schemas and values.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Declared type of a curated column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Business or surrogate identifier, stored as text or integer.
    Identifier,
    /// Free or categorical text.
    Text,
    /// Calendar date (no time component).
    Date,
    /// Whole number.
    Integer,
}

impl ColumnType {
    /// Whether `value` is a legal non-null value of this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (ColumnType::Identifier, Value::Text(_) | Value::Integer(_)) => true,
            (ColumnType::Text, Value::Text(_)) => true,
            (ColumnType::Date, Value::Date(_)) => true,
            (ColumnType::Integer, Value::Integer(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ColumnType::Identifier => "identifier",
            ColumnType::Text => "text",
            ColumnType::Date => "date",
            ColumnType::Integer => "integer",
        };
        f.write_str(label)
    }
}

/// A constraint on curated column values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Constraint {
    /// Values must not be null.
    NotNull,
    /// Values must be in a closed vocabulary.
    SetMembership { values: Vec<String> },
}

impl Constraint {
    /// Closed vocabulary from static labels.
    pub fn vocabulary(values: &[&str]) -> Self {
        Constraint::SetMembership {
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// Check a value, returning a description of the violation.
    pub fn check(&self, value: &Value) -> std::result::Result<(), String> {
        match (self, value) {
            (Constraint::NotNull, Value::Null) => Err("null in a not-null column".to_string()),
            (Constraint::SetMembership { values }, Value::Text(s)) if !values.contains(s) => {
                Err(format!("'{}' is outside the column vocabulary", s))
            }
            (Constraint::SetMembership { .. }, Value::Null) => {
                Err("null in a closed-vocabulary column".to_string())
            }
            _ => Ok(()),
        }
    }
}

/// A single curated value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
    Date(NaiveDate),
}

impl Value {
    /// Text value from anything string-like.
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Lift an optional integer.
    pub fn from_int(n: Option<i64>) -> Self {
        n.map_or(Value::Null, Value::Integer)
    }

    /// Lift an optional date.
    pub fn from_date(d: Option<NaiveDate>) -> Self {
        d.map_or(Value::Null, Value::Date)
    }

    /// Lift optional text.
    pub fn from_text(s: Option<String>) -> Self {
        s.map_or(Value::Null, Value::Text)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Rendering used in curated extracts: null is the empty string.
    pub fn render(&self) -> String {
        match self {
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Integer(_) => 1,
            Value::Text(_) => 2,
            Value::Date(_) => 3,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Nulls sort first, then by variant, then by value.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
