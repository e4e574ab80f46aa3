//! Per-field coercion from CSV text into SQLite values.

use rusqlite::types::Value;

use crate::db::{ColumnType, TableSpec};

pub const DEFAULT_BOOLEAN_COLUMNS: &[&str] = &["Explicit"];

/// Column-wise conversion plan for one table.
#[derive(Debug, Clone)]
pub struct RowTransform {
    rules: Vec<Rule>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Rule {
    Verbatim,
    YesNo,
    Integer,
    Real,
}

impl RowTransform {
    /// Every field bound as the text that was read.
    pub fn verbatim(spec: &TableSpec) -> Self {
        Self {
            rules: vec![Rule::Verbatim; spec.columns.len()],
        }
    }

    /// Boolean columns map yes/no; the rest coerce per their declared type.
    pub fn typed(spec: &TableSpec, boolean_columns: &[String]) -> Self {
        let rules = spec
            .columns
            .iter()
            .map(|c| {
                if boolean_columns.iter().any(|b| *b == c.name) {
                    Rule::YesNo
                } else {
                    match c.data_type {
                        ColumnType::Text => Rule::Verbatim,
                        ColumnType::Integer => Rule::Integer,
                        ColumnType::Real => Rule::Real,
                        ColumnType::Boolean => Rule::YesNo,
                    }
                }
            })
            .collect();
        Self { rules }
    }

    pub fn width(&self) -> usize {
        self.rules.len()
    }

    pub fn apply<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> Vec<Value> {
        self.rules
            .iter()
            .zip(fields)
            .map(|(rule, field)| rule.apply(field))
            .collect()
    }
}

impl Rule {
    fn apply(self, field: &str) -> Value {
        match self {
            Rule::Verbatim => text(field),
            Rule::YesNo => match parse_yes_no(field) {
                Some(b) => Value::Integer(b as i64),
                None => text(field),
            },
            Rule::Integer => field
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .unwrap_or_else(|_| text(field)),
            // SQLite stores NaN as NULL, so non-finite numbers stay text.
            Rule::Real => field
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map_or_else(|| text(field), Value::Real),
        }
    }
}

fn text(field: &str) -> Value {
    Value::Text(field.to_string())
}

/// "yes"/"no" in any case; anything else is left alone.
pub fn parse_yes_no(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("yes") {
        Some(true)
    } else if value.eq_ignore_ascii_case("no") {
        Some(false)
    } else {
        None
    }
}
