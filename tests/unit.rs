//! Unit tests for values, configuration and the typed form model.
use katachi::prelude::*;

#[cfg(test)]
mod value_tests {
    use super::*;

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(FieldValue::Number(2.5).as_number(), Some(2.5));
        assert_eq!(FieldValue::from(" 7 ").as_number(), Some(7.0));
        assert_eq!(FieldValue::from("seven").as_number(), None);
        assert_eq!(FieldValue::from("inf").as_number(), None);
        assert_eq!(FieldValue::Bool(true).as_number(), None);
        assert_eq!(FieldValue::Bool(true).as_operand(), 1.0);
        assert_eq!(FieldValue::from(vec![1.0]).as_operand(), 0.0);
    }

    #[test]
    fn test_emptiness_and_truthiness() {
        assert!(FieldValue::Null.is_empty());
        assert!(FieldValue::from("").is_empty());
        assert!(!FieldValue::from(" ").is_empty());
        assert!(!FieldValue::Number(0.0).is_empty());

        assert!(FieldValue::from("yes").is_truthy());
        assert!(!FieldValue::from("off").is_truthy());
        assert!(!FieldValue::from("0").is_truthy());
        assert!(!FieldValue::Number(0.0).is_truthy());
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldValue::Number(30.0).to_string(), "30");
        assert_eq!(FieldValue::Number(-0.25).to_string(), "-0.25");
        assert_eq!(FieldValue::Null.to_string(), "");
        assert_eq!(FieldValue::from(vec!["a", "b"]).to_string(), "a,b");
    }

    #[test]
    fn test_json_conversion() {
        let json = serde_json::json!({ "x": 1 });
        assert_eq!(FieldValue::from_json(&json), FieldValue::Null);
        let json = serde_json::json!([1.5, "two", true, null]);
        let value = FieldValue::from_json(&json);
        assert_eq!(
            value,
            FieldValue::List(vec![
                FieldValue::Number(1.5),
                FieldValue::from("two"),
                FieldValue::Bool(true),
                FieldValue::Null,
            ])
        );
        assert_eq!(value.to_json(), json);
        assert_eq!(FieldValue::Number(f64::NAN).to_json(), serde_json::Value::Null);
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn test_limits_defaults() {
        let limits = EngineLimits::default();
        assert_eq!(limits.max_formula_tokens, 512);
        assert_eq!(limits.max_formula_depth, 64);
        assert_eq!(limits.max_conditions, 256);
    }

    #[test]
    fn test_limits_from_partial_json() {
        let limits = EngineLimits::from_json(r#"{ "max_conditions": 8 }"#).unwrap();
        assert_eq!(limits.max_conditions, 8);
        assert_eq!(limits.max_formula_depth, 64);
        assert!(EngineLimits::from_json("\"fast\"").is_err());
    }
}

#[cfg(test)]
mod model_tests {
    use super::*;

    #[test]
    fn test_type_tags() {
        assert_eq!(FieldType::from_tag("checkbox-list"), FieldType::CheckboxList);
        assert_eq!(FieldType::from_tag("toggle"), FieldType::Switch);
        assert_eq!(FieldType::from_tag("calculated"), FieldType::Calculation);
        assert_eq!(FieldType::CheckboxList.tag(), "checkbox_list");
        assert_eq!(FieldType::Custom("rich".to_string()).tag(), "rich");
    }

    #[test]
    fn test_default_values() {
        assert_eq!(FieldType::CheckboxList.default_value(), FieldValue::List(Vec::new()));
        assert_eq!(FieldType::Switch.default_value(), FieldValue::Bool(false));
        assert_eq!(FieldType::Text.default_value(), FieldValue::Null);
    }

    #[test]
    fn test_policies_and_actions() {
        assert_eq!(MatchPolicy::from_name("ANY"), Some(MatchPolicy::Any));
        assert_eq!(MatchPolicy::from_name("and"), Some(MatchPolicy::All));
        assert_eq!(MatchPolicy::from_name("most"), None);
        assert!(MatchPolicy::All.reduce([true, true]));
        assert!(!MatchPolicy::Any.reduce([false, false]));
        assert_eq!(Action::from_name("Hide"), Some(Action::Hide));
        assert_eq!(DisplayAs::from_name("percent"), Some(DisplayAs::Percentage));
    }

    #[test]
    fn test_condition_counts() {
        let logic = ConditionalLogicSpec::advanced(
            Action::Show,
            MatchPolicy::Any,
            vec![
                RuleGroup {
                    policy: MatchPolicy::All,
                    conditions: vec![Condition::new(1, "equals", 1.0), Condition::new(2, "is_empty", "")],
                },
                RuleGroup {
                    policy: MatchPolicy::All,
                    conditions: vec![Condition::new(3, "in", "a,b")],
                },
            ],
        )
        .with_validation(ConditionalValidation {
            rule: "required".to_string(),
            policy: MatchPolicy::All,
            conditions: vec![Condition::new(4, "equals", true)],
        });

        assert_eq!(logic.condition_count(), 4);
        let targets: Vec<FieldId> = logic.all_conditions().map(|c| c.target_field_id).collect();
        assert_eq!(targets, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_calculated_shorthand() {
        let field = FieldDefinition::calculated(9, "total", "{a} + {b}");
        assert!(field.is_calculated());
        let options = field.calculation().unwrap();
        assert_eq!(options.formula, "{a} + {b}");
        assert_eq!(options.decimal_places, 2);
        assert_eq!(options.thousands_separator, ",");
        assert!(FieldDefinition::new(1, "a", FieldType::Number).calculation().is_none());
    }
}
