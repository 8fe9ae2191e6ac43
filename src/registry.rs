//! Base validation rules per field type.
//!
//! The engine does not own validation semantics. It asks a registry for the
//! rules a field type always carries and appends the conditional ones.

use crate::ast::FieldValue;
use crate::form::{FieldDefinition, FieldOptions, FieldType};

/// Supplies the base validation rules of a field, independent of any condition.
pub trait FieldTypeRegistry: Send + Sync {
    fn base_rules(&self, field: &FieldDefinition) -> Vec<String>;
}

/// The bundled registry covering the built-in field types.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFieldTypes;

impl FieldTypeRegistry for DefaultFieldTypes {
    fn base_rules(&self, field: &FieldDefinition) -> Vec<String> {
        let mut rules: Vec<String> = Vec::new();

        match field.field_type {
            // Required means "at least one selected".
            FieldType::CheckboxList => {
                if field.required {
                    rules.extend(["required", "array", "min:1"].map(String::from));
                } else {
                    rules.push("array".to_string());
                }
                if let FieldOptions::Choices { choices, .. } = &field.options {
                    if !choices.is_empty() {
                        rules.push(format!("in:{}", choices.join(",")));
                    }
                }
                return rules;
            }
            // Required means "must be on".
            FieldType::Checkbox | FieldType::Switch => {
                rules.push(if field.required { "accepted" } else { "boolean" }.to_string());
                return rules;
            }
            _ => {}
        }

        if field.required {
            rules.push("required".to_string());
        }

        match &field.field_type {
            FieldType::Text
            | FieldType::Textarea
            | FieldType::Password
            | FieldType::Phone
            | FieldType::Hidden => rules.push("string".to_string()),
            FieldType::Email => rules.extend(["string", "email"].map(String::from)),
            FieldType::Url => rules.extend(["string", "url"].map(String::from)),
            FieldType::Number | FieldType::Range | FieldType::Rating => {
                rules.push("numeric".to_string())
            }
            FieldType::Date | FieldType::DateTime => rules.push("date".to_string()),
            FieldType::Time => rules.push("date_format:H:i".to_string()),
            FieldType::File => rules.push("file".to_string()),
            FieldType::Select
            | FieldType::Radio
            | FieldType::CheckboxList
            | FieldType::Checkbox
            | FieldType::Switch
            | FieldType::Calculation
            | FieldType::Custom(_) => {}
        }

        match &field.options {
            FieldOptions::Text {
                min_length,
                max_length,
            } => {
                rules.extend(min_length.map(|n| format!("min:{}", n)));
                rules.extend(max_length.map(|n| format!("max:{}", n)));
            }
            FieldOptions::Numeric { min, max, .. } => {
                rules.extend(min.map(|n| format!("min:{}", FieldValue::Number(n))));
                rules.extend(max.map(|n| format!("max:{}", FieldValue::Number(n))));
            }
            FieldOptions::Choices { choices, multiple } => {
                if *multiple {
                    rules.push("array".to_string());
                }
                if !choices.is_empty() {
                    rules.push(format!("in:{}", choices.join(",")));
                }
            }
            FieldOptions::None | FieldOptions::Calculation(_) => {}
        }

        rules
    }
}
