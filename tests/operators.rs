//! Tests for the operator catalog and its coercion rules.
use katachi::operators::{Operator, compare, compare_by_name, operators_for, supports};
use katachi::prelude::*;

fn text(s: &str) -> FieldValue {
    FieldValue::Text(s.to_string())
}

#[test]
fn test_numeric_comparison_coerces_strings() {
    assert!(compare_by_name("greater_than", &text("7"), &text("3")));
    assert!(!compare_by_name("greater_than", &text("abc"), &text("3")));
    assert!(!compare_by_name("less_than", &text("abc"), &text("3")));
    assert!(compare_by_name("less_than_or_equal", &FieldValue::Number(3.0), &text("3")));
    assert!(compare_by_name("greater_than_or_equal", &text(" 10 "), &FieldValue::Number(9.5)));
    assert!(!compare_by_name("greater_than", &FieldValue::Null, &FieldValue::Number(0.0)));
}

#[test]
fn test_equality_across_representations() {
    assert!(compare_by_name("equals", &FieldValue::Number(5.0), &text("5.0")));
    assert!(compare_by_name("equals", &text("US"), &text("US")));
    assert!(compare_by_name("not_equals", &text("US"), &text("DE")));
    assert!(compare_by_name("equals", &FieldValue::Bool(true), &text("true")));
    assert!(compare_by_name("equals", &FieldValue::Bool(false), &FieldValue::Null));
    // A list equals a value when it contains it.
    assert!(compare_by_name("equals", &FieldValue::from(vec!["a", "b"]), &text("b")));
}

#[test]
fn test_contains_operates_on_strings_and_lists() {
    assert!(compare_by_name("contains", &text("hello world"), &text("world")));
    assert!(compare_by_name("not_contains", &text("hello"), &text("world")));
    assert!(compare_by_name("contains", &FieldValue::from(vec!["red", "blue"]), &text("blue")));
    assert!(!compare_by_name("contains", &FieldValue::from(vec!["red"]), &text("re")));
    assert!(compare_by_name("contains", &FieldValue::Number(1234.0), &text("23")));
}

#[test]
fn test_membership_splits_on_commas() {
    assert!(compare_by_name("in", &text("DE"), &text("US, DE,FR")));
    assert!(!compare_by_name("in", &text("IT"), &text("US,DE,FR")));
    assert!(compare_by_name("not_in", &text("IT"), &text("US,DE,FR")));
    assert!(compare_by_name("in", &FieldValue::Number(2.0), &text("1,2,3")));
    assert!(compare_by_name("in", &FieldValue::from(vec!["x", "DE"]), &text("US,DE")));
    assert!(compare_by_name("in", &text("b"), &FieldValue::from(vec!["a", "b"])));
    assert!(!compare_by_name("in", &FieldValue::Null, &text("")));
}

#[test]
fn test_emptiness_ignores_expected() {
    for empty in [FieldValue::Null, text(""), FieldValue::List(Vec::new())] {
        assert!(compare_by_name("is_empty", &empty, &text("anything")));
        assert!(!compare_by_name("is_not_empty", &empty, &FieldValue::Null));
    }
    assert!(compare_by_name("is_not_empty", &FieldValue::Number(0.0), &FieldValue::Null));
    assert!(compare_by_name("is_not_empty", &FieldValue::Bool(false), &FieldValue::Null));
}

#[test]
fn test_temporal_comparisons() {
    assert!(compare_by_name("after", &text("2024-03-01"), &text("2024-02-29")));
    assert!(compare_by_name("before", &text("2024-03-01 08:00"), &text("2024-03-01T09:30:00")));
    assert!(compare_by_name("after", &text("2024-03-01T10:00:00+02:00"), &text("2024-03-01 07:59:59")));
    assert!(compare_by_name("before", &text("08:15"), &text("17:00:00")));
    // Dates and times of day do not compare with each other.
    assert!(!compare_by_name("after", &text("2024-03-01"), &text("08:00")));
    assert!(!compare_by_name("before", &text("not a date"), &text("2024-03-01")));
}

#[test]
fn test_unknown_operator_is_false() {
    let operator = Operator::from_name("matches_regex");
    assert_eq!(operator, Operator::Unrecognized("matches_regex".to_string()));
    assert_eq!(operator.name(), "matches_regex");
    assert!(!compare(&operator, &text("a"), &text("a")));
}

#[test]
fn test_operator_names_round_trip() {
    for name in ["equals", "not_in", "greater_than_or_equal", "is_not_empty", "before"] {
        assert_eq!(Operator::from_name(name).name(), name);
    }
    let json = serde_json::to_string(&Operator::GreaterThan).unwrap();
    assert_eq!(json, "\"greater_than\"");
}

#[test]
fn test_operator_sets_per_type() {
    let text_ops = operators_for(&FieldType::Text);
    assert!(text_ops.contains(&Operator::Contains));
    assert!(!text_ops.contains(&Operator::GreaterThan));

    assert!(supports(&FieldType::Date, &Operator::After));
    assert!(supports(&FieldType::DateTime, &Operator::Before));
    assert!(!supports(&FieldType::Number, &Operator::After));
    assert!(supports(&FieldType::Calculation, &Operator::GreaterThan));
    assert!(supports(&FieldType::CheckboxList, &Operator::Contains));
    assert!(supports(&FieldType::Switch, &Operator::Equals));
    assert!(!supports(&FieldType::Switch, &Operator::In));

    // Types without a dedicated set fall back to the default set.
    let custom = FieldType::from_tag("signature");
    assert_eq!(custom, FieldType::Custom("signature".to_string()));
    assert!(supports(&custom, &Operator::In));
    assert!(!supports(&custom, &Operator::After));
    assert!(!supports(&FieldType::Text, &Operator::Unrecognized("x".to_string())));
}
