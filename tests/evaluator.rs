//! Tests for recalculation passes over compiled forms.
mod common;
use common::*;
use katachi::prelude::*;

fn order_values(price: f64, quantity: f64, country: &str) -> ahash::AHashMap<FieldId, FieldValue> {
    snapshot([
        (PRICE, FieldValue::Number(price)),
        (QUANTITY, FieldValue::Number(quantity)),
        (TAX_RATE, FieldValue::Number(10.0)),
        (COUNTRY, FieldValue::from(country)),
    ])
}

#[test]
fn test_chained_calculation() {
    let evaluator = order_evaluator();
    let pass = evaluator.recalculate(&order_values(10.0, 3.0, "US"));

    assert_eq!(pass.value("subtotal"), Some(&FieldValue::Number(30.0)));
    assert_eq!(pass.value("total"), Some(&FieldValue::Number(33.0)));
    assert_eq!(pass.snapshot.get(&SUBTOTAL), Some(&FieldValue::from("30.00")));
    assert_eq!(pass.snapshot.get(&TOTAL), Some(&FieldValue::from("$33.00")));
    assert_eq!(
        pass.formula_results.get(&TOTAL),
        Some(&FormulaResult {
            raw: Some(33.0),
            formatted: "$33.00".to_string()
        })
    );
    assert!(pass.diagnostics.is_empty());
}

#[test]
fn test_recalculation_is_deterministic() {
    let evaluator = order_evaluator();
    let values = order_values(1000.0, 3.0, "US");

    let first = evaluator.recalculate(&values);
    let second = evaluator.recalculate(&values);
    assert_eq!(first.snapshot, second.snapshot);
    assert_eq!(first.by_name, second.by_name);
    assert_eq!(first.visible, second.visible);
    assert_eq!(first.rules, second.rules);
    assert_eq!(first.snapshot.get(&TOTAL), Some(&FieldValue::from("$3,300.00")));
}

#[test]
fn test_conditions_see_fresh_calculated_values() {
    let evaluator = order_evaluator();

    let small = evaluator.recalculate(&order_values(10.0, 3.0, "US"));
    assert!(!small.is_visible(VIP_NOTE));

    let large = evaluator.recalculate(&order_values(50.0, 3.0, "US"));
    assert_eq!(large.snapshot.get(&TOTAL), Some(&FieldValue::from("$165.00")));
    assert!(large.is_visible(VIP_NOTE));
}

#[test]
fn test_hidden_fields_have_no_rules() {
    let evaluator = order_evaluator();
    let pass = evaluator.recalculate(&order_values(10.0, 3.0, "DE"));

    assert!(!pass.is_visible(STATE));
    assert!(pass.rules_for(STATE).is_none());

    // Required but hidden.
    let form = FormDefinition::new(vec![
        FieldDefinition::new(1, "toggle", FieldType::Switch),
        FieldDefinition::new(2, "details", FieldType::Text)
            .required()
            .with_logic(ConditionalLogicSpec::show_when(
                MatchPolicy::All,
                vec![Condition::new(1, "equals", true)],
            )),
    ]);
    let evaluator = Evaluator::new(compile(form));
    let off = evaluator.recalculate(&snapshot([(1, FieldValue::Bool(false))]));
    assert!(!off.is_visible(2));
    assert!(off.rules_for(2).is_none());

    let on = evaluator.recalculate(&snapshot([(1, FieldValue::Bool(true))]));
    assert_eq!(on.rules_for(2), Some(&["required".to_string(), "string".to_string()][..]));
}

#[test]
fn test_conditional_validation_is_additive() {
    let evaluator = order_evaluator();
    let pass = evaluator.recalculate(&order_values(10.0, 3.0, "US"));

    assert!(pass.is_visible(STATE));
    let rules = pass.rules_for(STATE).unwrap();
    assert!(rules.contains(&"string".to_string()));
    assert!(rules.contains(&"required".to_string()));
    assert_eq!(rules, ["string".to_string(), "required".to_string()]);
}

#[test]
fn test_rules_are_deduplicated() {
    let form = FormDefinition::new(vec![
        FieldDefinition::new(1, "email", FieldType::Email)
            .required()
            .with_logic(ConditionalLogicSpec::default().with_validation(ConditionalValidation {
                rule: "required".to_string(),
                policy: MatchPolicy::All,
                conditions: vec![Condition::new(1, "is_empty", FieldValue::Null)],
            })),
    ]);
    let pass = Evaluator::new(compile(form)).recalculate(&snapshot([]));
    assert_eq!(
        pass.rules_for(1),
        Some(&["required".to_string(), "string".to_string(), "email".to_string()][..])
    );
}

#[test]
fn test_base_rules_per_type() {
    let form = FormDefinition::new(vec![
        FieldDefinition::new(1, "price", FieldType::Number)
            .required()
            .with_options(FieldOptions::Numeric {
                min: Some(0.0),
                max: Some(99.5),
                step: None,
            }),
        FieldDefinition::new(2, "tags", FieldType::CheckboxList)
            .required()
            .with_options(FieldOptions::Choices {
                choices: vec!["a".to_string(), "b".to_string()],
                multiple: true,
            }),
        FieldDefinition::new(3, "terms", FieldType::Checkbox).required(),
        FieldDefinition::new(4, "newsletter", FieldType::Switch),
        FieldDefinition::new(5, "size", FieldType::Select).with_options(FieldOptions::Choices {
            choices: vec!["S".to_string(), "M".to_string()],
            multiple: false,
        }),
        FieldDefinition::new(6, "bio", FieldType::Textarea).with_options(FieldOptions::Text {
            min_length: Some(10),
            max_length: None,
        }),
        FieldDefinition::new(7, "starts", FieldType::Time),
    ]);
    let pass = Evaluator::new(compile(form)).recalculate(&snapshot([]));

    let rules = |id: FieldId| pass.rules_for(id).unwrap().join("|");
    assert_eq!(rules(1), "required|numeric|min:0|max:99.5");
    assert_eq!(rules(2), "required|array|min:1|in:a,b");
    assert_eq!(rules(3), "accepted");
    assert_eq!(rules(4), "boolean");
    assert_eq!(rules(5), "in:S,M");
    assert_eq!(rules(6), "string|min:10");
    assert_eq!(rules(7), "date_format:H:i");
}

#[test]
fn test_failed_formula_keeps_previous_display_value() {
    let form = FormDefinition::new(vec![
        FieldDefinition::new(1, "amount", FieldType::Number),
        FieldDefinition::new(2, "parts", FieldType::Number),
        FieldDefinition::calculated(3, "share", "{amount} / {parts}"),
        FieldDefinition::calculated(4, "doubled", "{share} * 2"),
    ]);
    let evaluator = Evaluator::new(compile(form));
    let pass = evaluator.recalculate(&snapshot([
        (1, FieldValue::Number(10.0)),
        (2, FieldValue::Number(0.0)),
        (3, FieldValue::from("5.00")),
    ]));

    assert_eq!(
        pass.formula_results.get(&3),
        Some(&FormulaResult {
            raw: None,
            formatted: "5.00".to_string()
        })
    );
    assert_eq!(pass.snapshot.get(&3), Some(&FieldValue::from("5.00")));
    // The previous value, reduced to a number, still feeds later formulas.
    assert_eq!(pass.value("share"), Some(&FieldValue::Number(5.0)));
    assert_eq!(pass.snapshot.get(&4), Some(&FieldValue::from("10.00")));
    assert_eq!(
        pass.diagnostics,
        vec![Diagnostic::FormulaFailed {
            field: "share".to_string(),
            error: FormulaError::DivisionByZero,
        }]
    );
}

#[test]
fn test_cycle_members_read_seed_values() {
    let form = FormDefinition::new(vec![
        FieldDefinition::calculated(1, "a", "{b} + 1"),
        FieldDefinition::calculated(2, "b", "{a} + 1"),
    ]);
    let evaluator = Evaluator::new(compile(form));

    let fresh = evaluator.recalculate(&snapshot([]));
    assert_eq!(fresh.value("a"), Some(&FieldValue::Number(1.0)));
    assert_eq!(fresh.value("b"), Some(&FieldValue::Number(2.0)));

    // `a` is forced first and reads the previous display value of `b`.
    let again = evaluator.recalculate(&fresh.snapshot);
    assert_eq!(again.value("a"), Some(&FieldValue::Number(3.0)));
    assert_eq!(again.value("b"), Some(&FieldValue::Number(4.0)));
}

#[test]
fn test_field_reading_a_cycle_runs_after_it() {
    // `c` is declared first but is not part of the a/b cycle.
    let form = FormDefinition::new(vec![
        FieldDefinition::calculated(1, "c", "{a} + 1"),
        FieldDefinition::calculated(2, "a", "{b} + {x}"),
        FieldDefinition::calculated(3, "b", "{a}"),
        FieldDefinition::new(4, "x", FieldType::Number),
    ]);
    let evaluator = Evaluator::new(compile(form));
    assert_eq!(
        evaluator.compiled().diagnostics,
        vec![Diagnostic::DependencyCycle {
            fields: vec!["a".to_string(), "b".to_string()]
        }]
    );

    let pass = evaluator.recalculate(&snapshot([(4, FieldValue::Number(5.0))]));
    assert_eq!(pass.value("a"), Some(&FieldValue::Number(5.0)));
    assert_eq!(pass.value("b"), Some(&FieldValue::Number(5.0)));
    assert_eq!(pass.value("c"), Some(&FieldValue::Number(6.0)));
    assert_eq!(pass.snapshot.get(&1), Some(&FieldValue::from("6.00")));
}

#[test]
fn test_unparseable_formula_never_aborts_the_pass() {
    let form = FormDefinition::new(vec![
        FieldDefinition::new(1, "x", FieldType::Number),
        FieldDefinition::calculated(2, "bad", "{x} +* 2"),
        FieldDefinition::calculated(3, "good", "{x} + 2"),
    ]);
    let evaluator = Evaluator::new(compile(form));
    let pass = evaluator.recalculate(&snapshot([(1, FieldValue::Number(1.0))]));

    assert_eq!(pass.formula_results[&2].raw, None);
    assert_eq!(pass.formula_results[&2].formatted, "");
    assert_eq!(pass.value("bad"), Some(&FieldValue::Null));
    assert_eq!(pass.value("good"), Some(&FieldValue::Number(3.0)));
    // Reported once, at compile time.
    assert!(pass.diagnostics.is_empty());
    assert_eq!(evaluator.compiled().diagnostics.len(), 1);
}

#[test]
fn test_explain_visibility_and_rules() {
    let evaluator = order_evaluator();
    let pass = evaluator.recalculate(&order_values(10.0, 3.0, "US"));

    let reason = evaluator.explain(STATE, &pass).unwrap();
    assert_eq!(
        reason,
        "Visible: country (was \"US\") equals \"US\"\nRule 'required' applies: country (was \"US\") equals \"US\""
    );
    let vip = evaluator.explain(VIP_NOTE, &pass).unwrap();
    assert_eq!(vip, "Hidden: total (was 33) greater_than 100");

    assert!(evaluator.explain(PRICE, &pass).is_none());
    assert!(evaluator.explain(999, &pass).is_none());
}

struct StrictRules;

impl FieldTypeRegistry for StrictRules {
    fn base_rules(&self, field: &FieldDefinition) -> Vec<String> {
        vec![format!("type:{}", field.field_type.tag())]
    }
}

#[test]
fn test_custom_registry() {
    let evaluator = Evaluator::with_registry(compile(create_order_form()), Box::new(StrictRules));
    let pass = evaluator.recalculate(&order_values(10.0, 3.0, "US"));

    assert_eq!(pass.rules_for(PRICE), Some(&["type:number".to_string()][..]));
    assert_eq!(
        pass.rules_for(STATE),
        Some(&["type:text".to_string(), "required".to_string()][..])
    );
}

#[test]
fn test_one_shot_recalculate() {
    let form = create_order_form();
    let pass = recalculate(&form.fields, &order_values(10.0, 3.0, "US")).unwrap();
    assert_eq!(pass.snapshot.get(&TOTAL), Some(&FieldValue::from("$33.00")));
    assert!(pass.is_visible(STATE));

    let mut fields = form.fields;
    fields.push(FieldDefinition::new(PRICE, "again", FieldType::Text));
    assert!(matches!(
        recalculate(&fields, &snapshot([])),
        Err(DefinitionError::DuplicateId(PRICE))
    ));
}

#[test]
fn test_evaluator_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Evaluator>();
    assert_send_sync::<CompiledForm>();

    let evaluator = std::sync::Arc::new(order_evaluator());
    let handles: Vec<_> = (1..=4)
        .map(|quantity| {
            let evaluator = evaluator.clone();
            std::thread::spawn(move || {
                let pass = evaluator.recalculate(&order_values(10.0, quantity as f64, "US"));
                pass.formula_results[&SUBTOTAL].raw
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec![Some(10.0), Some(20.0), Some(30.0), Some(40.0)]);
}
