//! Column rules
//!
//! Each rule pairs a predicate on the lower-cased column name with a
//! coercion. `RULES` is ordered and a column receives every rule it matches,
//! so a column named `dropoff_datetime_id` is parsed as a timestamp and then
//! coerced to Int64 (ending all-null, as timestamps are not numeric).

use super::coerce;
use arrow::array::ArrayRef;
use tracing::debug;

/// Target type of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// `Timestamp(Microsecond, None)`
    Timestamp,
    /// Nullable Int64
    Integer,
    /// Nullable Boolean from yes/no strings
    Flag,
}

/// A (predicate, coercion) pair
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    name: &'static str,
    matches: fn(&str) -> bool,
    coercion: Coercion,
}

/// Rules in application order
pub static RULES: [Rule; 3] = [
    Rule {
        name: "datetime",
        matches: is_datetime_column,
        coercion: Coercion::Timestamp,
    },
    Rule {
        name: "integer",
        matches: is_integer_column,
        coercion: Coercion::Integer,
    },
    Rule {
        name: "flag",
        matches: is_flag_column,
        coercion: Coercion::Flag,
    },
];

impl Rule {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn coercion(&self) -> Coercion {
        self.coercion
    }

    /// Whether this rule applies to a lower-cased column name
    pub fn matches(&self, column: &str) -> bool {
        (self.matches)(column)
    }

    /// Coerce a column; never fails, unconvertible values become null
    pub fn apply(&self, column: &str, array: &ArrayRef) -> ArrayRef {
        match self.coercion {
            Coercion::Timestamp => coerce::to_timestamp(array),
            Coercion::Integer => coerce::to_int64(array),
            Coercion::Flag => {
                let (flags, unrecognized) = coerce::to_flag(array);
                if unrecognized > 0 {
                    debug!(
                        column,
                        unrecognized, "Flag values other than y/yes/n/no set to null"
                    );
                }
                flags
            }
        }
    }
}

/// Rules matching a lower-cased column name, in application order
pub fn matching_rules(column: &str) -> impl Iterator<Item = &'static Rule> + '_ {
    RULES.iter().filter(move |rule| rule.matches(column))
}

fn is_datetime_column(column: &str) -> bool {
    column.contains("datetime")
}

fn is_integer_column(column: &str) -> bool {
    column.ends_with("id") || column.ends_with("_type") || column.ends_with("_count")
}

fn is_flag_column(column: &str) -> bool {
    column.ends_with("_flag")
}
