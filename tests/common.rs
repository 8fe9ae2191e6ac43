//! Common test utilities for building form definitions and snapshots.
use ahash::AHashMap;
use katachi::prelude::*;

#[allow(dead_code)]
pub const PRICE: FieldId = 1;
#[allow(dead_code)]
pub const QUANTITY: FieldId = 2;
#[allow(dead_code)]
pub const TOTAL: FieldId = 3;
#[allow(dead_code)]
pub const SUBTOTAL: FieldId = 4;
#[allow(dead_code)]
pub const TAX_RATE: FieldId = 5;
#[allow(dead_code)]
pub const COUNTRY: FieldId = 6;
#[allow(dead_code)]
pub const STATE: FieldId = 7;
#[allow(dead_code)]
pub const VIP_NOTE: FieldId = 8;

/// Creates an order form exercising chained formulas, visibility and
/// conditional validation.
///
/// `total` is declared before `subtotal`, which it reads:
/// - `subtotal = {price} * {quantity}`
/// - `total = {subtotal} * (1 + {tax_rate} / 100)`, shown as currency with `$`
/// - `state` is shown, and required, when `country` equals `"US"`
/// - `vip_note` is shown when `total > 100`
#[allow(dead_code)]
pub fn create_order_form() -> FormDefinition {
    let us_only = || vec![Condition::new(COUNTRY, "equals", "US")];

    FormDefinition::new(vec![
        FieldDefinition::new(PRICE, "price", FieldType::Number).required(),
        FieldDefinition::new(QUANTITY, "quantity", FieldType::Number),
        FieldDefinition::new(TOTAL, "total", FieldType::Calculation).with_options(
            FieldOptions::Calculation(CalculationOptions {
                formula: "{subtotal} * (1 + {tax_rate} / 100)".to_string(),
                display_as: DisplayAs::Currency,
                prefix: "$".to_string(),
                ..CalculationOptions::default()
            }),
        ),
        FieldDefinition::calculated(SUBTOTAL, "subtotal", "{price} * {quantity}"),
        FieldDefinition::new(TAX_RATE, "tax_rate", FieldType::Number),
        FieldDefinition::new(COUNTRY, "country", FieldType::Select).with_options(
            FieldOptions::Choices {
                choices: vec!["US".to_string(), "DE".to_string(), "FR".to_string()],
                multiple: false,
            },
        ),
        FieldDefinition::new(STATE, "state", FieldType::Text).with_logic(
            ConditionalLogicSpec::show_when(MatchPolicy::All, us_only()).with_validation(
                ConditionalValidation {
                    rule: "required".to_string(),
                    policy: MatchPolicy::All,
                    conditions: us_only(),
                },
            ),
        ),
        FieldDefinition::new(VIP_NOTE, "vip_note", FieldType::Textarea).with_logic(
            ConditionalLogicSpec::show_when(
                MatchPolicy::All,
                vec![Condition::new(TOTAL, "greater_than", 100.0)],
            ),
        ),
    ])
}

/// Compiles a form with default limits, panicking on structural errors.
#[allow(dead_code)]
pub fn compile(form: FormDefinition) -> CompiledForm {
    Compiler::builder(form)
        .build()
        .compile()
        .expect("Failed to compile form")
}

#[allow(dead_code)]
pub fn order_evaluator() -> Evaluator {
    Evaluator::new(compile(create_order_form()))
}

/// Builds a raw snapshot from `(id, value)` pairs.
#[allow(dead_code)]
pub fn snapshot<const N: usize>(values: [(FieldId, FieldValue); N]) -> AHashMap<FieldId, FieldValue> {
    values.into_iter().collect()
}

/// A by-name snapshot for formula and condition tests.
#[allow(dead_code)]
pub fn by_name<const N: usize>(values: [(&str, FieldValue); N]) -> AHashMap<String, FieldValue> {
    values
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

/// The order form in the bundled JSON format.
#[allow(dead_code)]
pub const ORDER_FORM_JSON: &str = r#"{
    "fields": [
        { "id": 1, "name": "price", "type": "number", "isRequired": true, "options": { "min": 0 } },
        { "id": 2, "name": "quantity", "type": "number" },
        {
            "id": 3, "name": "total", "type": "calculation",
            "options": {
                "formula": "{subtotal} * (1 + {tax_rate} / 100)",
                "decimalPlaces": 2, "displayAs": "currency", "prefix": "$"
            }
        },
        { "id": 4, "name": "subtotal", "type": "calculation", "options": { "formula": "{price} * {quantity}" } },
        { "id": 5, "name": "tax_rate", "type": "number" },
        { "id": 6, "name": "country", "type": "select", "options": { "choices": ["US", { "value": "DE", "label": "Germany" }, "FR"] } },
        {
            "id": 7, "name": "state", "type": "text",
            "conditionalLogic": {
                "action": "show", "match": "all",
                "conditions": [{ "targetFieldId": 6, "operator": "equals", "value": "US" }],
                "conditionalValidation": [
                    { "rule": "required", "match": "all", "conditions": [{ "targetFieldId": 6, "operator": "equals", "value": "US" }] }
                ]
            }
        },
        {
            "id": 8, "name": "vip_note", "type": "textarea",
            "conditionalLogic": {
                "action": "show", "groupsMatch": "any",
                "ruleGroups": [
                    { "match": "all", "conditions": [{ "targetFieldId": 3, "operator": "greater_than", "value": 100 }] },
                    { "match": "all", "conditions": [] }
                ]
            }
        }
    ]
}"#;
