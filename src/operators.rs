//! The operator catalog: which comparison operators each field type accepts,
//! and how each operator compares an actual field value against a literal.
//!
//! Every comparison is total. Operands that cannot be coerced for an operator
//! make the comparison `false` rather than raising an error.

use crate::ast::FieldValue;
use crate::form::{FieldFamily, FieldType};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Master macro defining the operator enum together with its wire names.
macro_rules! define_operators {
    ( $( ($variant:ident, $name:literal) ),* $(,)? ) => {
        /// A comparison operator used by a [`crate::form::Condition`].
        ///
        /// Names that are not part of the catalog are kept as `Unrecognized`
        /// so that loading a form never fails on them; they compare `false`.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum Operator {
            $( $variant, )*
            Unrecognized(String),
        }

        impl Operator {
            pub fn from_name(name: &str) -> Self {
                match name {
                    $( $name => Operator::$variant, )*
                    other => Operator::Unrecognized(other.to_string()),
                }
            }

            pub fn name(&self) -> &str {
                match self {
                    $( Operator::$variant => $name, )*
                    Operator::Unrecognized(name) => name.as_str(),
                }
            }
        }
    };
}

define_operators! {
    (Equals, "equals"),
    (NotEquals, "not_equals"),
    (Contains, "contains"),
    (NotContains, "not_contains"),
    (GreaterThan, "greater_than"),
    (LessThan, "less_than"),
    (GreaterThanOrEqual, "greater_than_or_equal"),
    (LessThanOrEqual, "less_than_or_equal"),
    (IsEmpty, "is_empty"),
    (IsNotEmpty, "is_not_empty"),
    (In, "in"),
    (NotIn, "not_in"),
    (After, "after"),
    (Before, "before"),
}

impl From<String> for Operator {
    fn from(name: String) -> Self {
        Operator::from_name(&name)
    }
}

impl From<Operator> for String {
    fn from(operator: Operator) -> Self {
        operator.name().to_string()
    }
}

static DEFAULT_OPERATORS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::Contains,
    Operator::NotContains,
    Operator::GreaterThan,
    Operator::LessThan,
    Operator::GreaterThanOrEqual,
    Operator::LessThanOrEqual,
    Operator::IsEmpty,
    Operator::IsNotEmpty,
    Operator::In,
    Operator::NotIn,
];

static TEXT_OPERATORS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::Contains,
    Operator::NotContains,
    Operator::IsEmpty,
    Operator::IsNotEmpty,
];

static NUMERIC_OPERATORS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::GreaterThan,
    Operator::LessThan,
    Operator::GreaterThanOrEqual,
    Operator::LessThanOrEqual,
    Operator::IsEmpty,
    Operator::IsNotEmpty,
    Operator::In,
    Operator::NotIn,
];

static DATE_OPERATORS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::After,
    Operator::Before,
    Operator::IsEmpty,
    Operator::IsNotEmpty,
];

static CHOICE_OPERATORS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::In,
    Operator::NotIn,
    Operator::IsEmpty,
    Operator::IsNotEmpty,
];

static MULTI_CHOICE_OPERATORS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::Contains,
    Operator::NotContains,
    Operator::In,
    Operator::NotIn,
    Operator::IsEmpty,
    Operator::IsNotEmpty,
];

static BOOLEAN_OPERATORS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::IsEmpty,
    Operator::IsNotEmpty,
];

/// Returns the operators a condition may use against a field of the given type.
pub fn operators_for(field_type: &FieldType) -> &'static [Operator] {
    match field_type.family() {
        FieldFamily::Text => TEXT_OPERATORS,
        FieldFamily::Numeric => NUMERIC_OPERATORS,
        FieldFamily::Date => DATE_OPERATORS,
        FieldFamily::Choice => CHOICE_OPERATORS,
        FieldFamily::MultiChoice => MULTI_CHOICE_OPERATORS,
        FieldFamily::Boolean => BOOLEAN_OPERATORS,
        FieldFamily::Other => DEFAULT_OPERATORS,
    }
}

pub fn supports(field_type: &FieldType, operator: &Operator) -> bool {
    operators_for(field_type).contains(operator)
}

/// Compares `actual` against the literal `expected` using `operator`.
pub fn compare(operator: &Operator, actual: &FieldValue, expected: &FieldValue) -> bool {
    match operator {
        Operator::Equals => values_equal(actual, expected),
        Operator::NotEquals => !values_equal(actual, expected),
        Operator::Contains => contains(actual, expected),
        Operator::NotContains => !contains(actual, expected),
        Operator::GreaterThan => compare_numbers(actual, expected, |a, b| a > b),
        Operator::LessThan => compare_numbers(actual, expected, |a, b| a < b),
        Operator::GreaterThanOrEqual => compare_numbers(actual, expected, |a, b| a >= b),
        Operator::LessThanOrEqual => compare_numbers(actual, expected, |a, b| a <= b),
        Operator::IsEmpty => actual.is_empty(),
        Operator::IsNotEmpty => !actual.is_empty(),
        Operator::In => is_member(actual, expected),
        Operator::NotIn => !is_member(actual, expected),
        Operator::After => compare_temporal(actual, expected) == Some(Ordering::Greater),
        Operator::Before => compare_temporal(actual, expected) == Some(Ordering::Less),
        Operator::Unrecognized(_) => false,
    }
}

/// Looks up an operator by its wire name and compares.
/// Unknown names compare `false`.
pub fn compare_by_name(name: &str, actual: &FieldValue, expected: &FieldValue) -> bool {
    compare(&Operator::from_name(name), actual, expected)
}

fn values_equal(actual: &FieldValue, expected: &FieldValue) -> bool {
    match (actual, expected) {
        (FieldValue::List(items), FieldValue::List(wanted)) => {
            items.len() == wanted.len()
                && items
                    .iter()
                    .all(|item| wanted.iter().any(|w| values_equal(item, w)))
        }
        (FieldValue::List(items), _) => items.iter().any(|item| values_equal(item, expected)),
        (FieldValue::Bool(b), _) => *b == expected.is_truthy(),
        _ => match (actual.as_number(), expected.as_number()) {
            (Some(a), Some(b)) => a == b,
            _ => actual.to_string().trim() == expected.to_string().trim(),
        },
    }
}

fn contains(actual: &FieldValue, expected: &FieldValue) -> bool {
    match actual {
        FieldValue::List(items) => items.iter().any(|item| values_equal(item, expected)),
        _ => actual.to_string().contains(&expected.to_string()),
    }
}

fn is_member(actual: &FieldValue, expected: &FieldValue) -> bool {
    let candidates: Vec<FieldValue> = match expected {
        FieldValue::List(items) => items.clone(),
        other => other
            .to_string()
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(FieldValue::from)
            .collect(),
    };

    let matches = |value: &FieldValue| candidates.iter().any(|c| values_equal(value, c));
    match actual {
        FieldValue::List(items) => items.iter().any(matches),
        FieldValue::Null => false,
        other => matches(other),
    }
}

fn compare_numbers<F>(actual: &FieldValue, expected: &FieldValue, f: F) -> bool
where
    F: Fn(f64, f64) -> bool,
{
    match (actual.as_number(), expected.as_number()) {
        (Some(a), Some(b)) => f(a, b),
        _ => false,
    }
}

#[derive(Debug)]
enum Temporal {
    DateTime(NaiveDateTime),
    Time(NaiveTime),
}

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

fn parse_temporal(value: &FieldValue) -> Option<Temporal> {
    let FieldValue::Text(raw) = value else {
        return None;
    };
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(Temporal::DateTime(dt.naive_utc()));
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Temporal::DateTime(dt));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(Temporal::DateTime);
    }
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
        .map(Temporal::Time)
}

fn compare_temporal(actual: &FieldValue, expected: &FieldValue) -> Option<Ordering> {
    match (parse_temporal(actual)?, parse_temporal(expected)?) {
        (Temporal::DateTime(a), Temporal::DateTime(b)) => Some(a.cmp(&b)),
        (Temporal::Time(a), Temporal::Time(b)) => Some(a.cmp(&b)),
        _ => None,
    }
}
