//! The JSON form document format and its conversion into a [`FormDefinition`].
//!
//! Keys are accepted in snake_case and camelCase:
//!
//! ```json
//! {
//!   "fields": [
//!     { "id": 1, "name": "price", "type": "number", "required": true },
//!     { "id": 2, "name": "quantity", "type": "number" },
//!     {
//!       "id": 3, "name": "total", "type": "calculation",
//!       "options": { "formula": "{price} * {quantity}", "displayAs": "currency", "prefix": "$" },
//!       "conditionalLogic": {
//!         "action": "show", "match": "all",
//!         "conditions": [{ "targetFieldId": 1, "operator": "greater_than", "value": 0 }]
//!       }
//!     }
//!   ]
//! }
//! ```

use crate::ast::{FieldId, FieldValue};
use crate::error::FormConversionError;
use crate::form::{
    Action, CalculationOptions, Condition, ConditionTree, ConditionalLogicSpec,
    ConditionalValidation, DisplayAs, FieldDefinition, FieldFamily, FieldOptions, FieldType,
    FormDefinition, IntoForm, MatchPolicy, RuleGroup, VisibilityLogic,
};
use crate::operators::Operator;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RawForm {
    pub fields: Vec<RawField>,
}

#[derive(Debug, Deserialize)]
pub struct RawField {
    pub id: FieldId,
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "type", alias = "typeTag", alias = "type_tag")]
    pub type_tag: String,
    #[serde(default, alias = "isRequired", alias = "is_required")]
    pub required: bool,
    #[serde(default)]
    pub options: Option<RawOptions>,
    #[serde(default, alias = "conditionalLogic")]
    pub conditional_logic: Option<RawConditionalLogic>,
}

/// Every option any field type understands. Which ones are read depends on the type.
#[derive(Debug, Default, Deserialize)]
pub struct RawOptions {
    pub formula: Option<String>,
    #[serde(alias = "decimalPlaces")]
    pub decimal_places: Option<u32>,
    #[serde(alias = "displayAs")]
    pub display_as: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    #[serde(alias = "thousandsSeparator")]
    pub thousands_separator: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    #[serde(alias = "minLength")]
    pub min_length: Option<u32>,
    #[serde(alias = "maxLength")]
    pub max_length: Option<u32>,
    pub choices: Option<Vec<RawChoice>>,
    pub multiple: Option<bool>,
}

/// A choice is either a bare value or a `{ "value": ..., "label": ... }` object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawChoice {
    Plain(String),
    Labelled {
        value: String,
        #[serde(default)]
        label: Option<String>,
    },
}

impl RawChoice {
    pub fn value(&self) -> &str {
        match self {
            RawChoice::Plain(value) | RawChoice::Labelled { value, .. } => value.as_str(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawConditionalLogic {
    #[serde(default)]
    pub action: Option<String>,
    /// `simple` or `advanced`. Inferred from the populated keys when absent.
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default, rename = "match", alias = "logic")]
    pub policy: Option<String>,
    #[serde(default)]
    pub conditions: Vec<RawCondition>,
    #[serde(default, alias = "ruleGroups")]
    pub rule_groups: Vec<RawRuleGroup>,
    #[serde(default, alias = "groupsMatch")]
    pub groups_match: Option<String>,
    #[serde(default, alias = "conditionalValidation")]
    pub conditional_validation: Vec<RawValidation>,
}

#[derive(Debug, Deserialize)]
pub struct RawCondition {
    #[serde(alias = "targetFieldId", alias = "fieldId", alias = "field_id")]
    pub target_field_id: FieldId,
    pub operator: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct RawRuleGroup {
    #[serde(default, rename = "match", alias = "logic")]
    pub policy: Option<String>,
    #[serde(default)]
    pub conditions: Vec<RawCondition>,
}

#[derive(Debug, Deserialize)]
pub struct RawValidation {
    pub rule: String,
    #[serde(default, rename = "match", alias = "logic")]
    pub policy: Option<String>,
    #[serde(default)]
    pub conditions: Vec<RawCondition>,
}

impl RawForm {
    pub fn from_json(json: &str) -> Result<Self, FormConversionError> {
        serde_json::from_str(json).map_err(|e| FormConversionError::JsonParseError(e.to_string()))
    }
}

impl IntoForm for RawForm {
    fn into_form(self) -> Result<FormDefinition, FormConversionError> {
        let fields = self
            .fields
            .into_iter()
            .map(RawField::into_field)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FormDefinition::new(fields))
    }
}

impl RawField {
    fn into_field(self) -> Result<FieldDefinition, FormConversionError> {
        let field_type = FieldType::from_tag(&self.type_tag);
        let options = convert_options(
            &self.name,
            &field_type,
            self.options.unwrap_or_default(),
        )?;
        let conditional_logic = self
            .conditional_logic
            .map(|logic| convert_logic(&self.name, logic))
            .transpose()?;

        Ok(FieldDefinition {
            id: self.id,
            name: self.name,
            label: self.label,
            field_type,
            required: self.required,
            options,
            conditional_logic,
        })
    }
}

fn convert_options(
    field: &str,
    field_type: &FieldType,
    raw: RawOptions,
) -> Result<FieldOptions, FormConversionError> {
    let invalid = |message: String| FormConversionError::InvalidOptions {
        field: field.to_string(),
        message,
    };

    if *field_type == FieldType::Calculation {
        let formula = raw
            .formula
            .ok_or_else(|| invalid("calculated field has no formula".to_string()))?;
        let defaults = CalculationOptions::default();
        let display_as = match raw.display_as.as_deref() {
            None => defaults.display_as,
            Some(name) => DisplayAs::from_name(name)
                .ok_or_else(|| invalid(format!("unknown display mode '{}'", name)))?,
        };
        return Ok(FieldOptions::Calculation(CalculationOptions {
            formula,
            decimal_places: raw.decimal_places.unwrap_or(defaults.decimal_places),
            display_as,
            prefix: raw.prefix.unwrap_or(defaults.prefix),
            suffix: raw.suffix.unwrap_or(defaults.suffix),
            thousands_separator: raw
                .thousands_separator
                .unwrap_or(defaults.thousands_separator),
        }));
    }

    let options = match field_type.family() {
        FieldFamily::Numeric if raw.min.is_some() || raw.max.is_some() || raw.step.is_some() => {
            if let (Some(min), Some(max)) = (raw.min, raw.max) {
                if min > max {
                    return Err(invalid(format!("min {} is greater than max {}", min, max)));
                }
            }
            FieldOptions::Numeric {
                min: raw.min,
                max: raw.max,
                step: raw.step,
            }
        }
        FieldFamily::Text if raw.min_length.is_some() || raw.max_length.is_some() => {
            FieldOptions::Text {
                min_length: raw.min_length,
                max_length: raw.max_length,
            }
        }
        family @ (FieldFamily::Choice | FieldFamily::MultiChoice) => FieldOptions::Choices {
            choices: raw
                .choices
                .unwrap_or_default()
                .iter()
                .map(|c| c.value().to_string())
                .collect(),
            multiple: raw.multiple.unwrap_or(family == FieldFamily::MultiChoice),
        },
        _ => FieldOptions::None,
    };
    Ok(options)
}

fn convert_logic(
    field: &str,
    raw: RawConditionalLogic,
) -> Result<ConditionalLogicSpec, FormConversionError> {
    let advanced = match raw.mode.as_deref() {
        Some("simple") => false,
        Some("advanced") => true,
        Some(other) => {
            return Err(FormConversionError::UnknownLogicMode {
                field: field.to_string(),
                mode: other.to_string(),
            });
        }
        None if !raw.conditions.is_empty() && !raw.rule_groups.is_empty() => {
            return Err(FormConversionError::AmbiguousLogic {
                field: field.to_string(),
            });
        }
        None => !raw.rule_groups.is_empty(),
    };

    let declares_visibility = raw.action.is_some()
        || raw.mode.is_some()
        || !raw.conditions.is_empty()
        || !raw.rule_groups.is_empty();

    let visibility = if declares_visibility {
        let action = match raw.action.as_deref() {
            None => Action::default(),
            Some(name) => Action::from_name(name).ok_or_else(|| {
                FormConversionError::ValidationError(format!(
                    "Field '{}' has unknown action '{}'",
                    field, name
                ))
            })?,
        };
        let tree = if advanced {
            let groups = raw
                .rule_groups
                .into_iter()
                .map(|group| {
                    Ok(RuleGroup {
                        policy: convert_policy(field, group.policy.as_deref())?,
                        conditions: convert_conditions(group.conditions),
                    })
                })
                .collect::<Result<Vec<_>, FormConversionError>>()?;
            ConditionTree::Advanced {
                groups_policy: convert_policy(field, raw.groups_match.as_deref())?,
                groups,
            }
        } else {
            ConditionTree::Simple {
                policy: convert_policy(field, raw.policy.as_deref())?,
                conditions: convert_conditions(raw.conditions),
            }
        };
        Some(VisibilityLogic { action, tree })
    } else {
        None
    };

    let conditional_validation = raw
        .conditional_validation
        .into_iter()
        .map(|entry| {
            Ok(ConditionalValidation {
                rule: entry.rule,
                policy: convert_policy(field, entry.policy.as_deref())?,
                conditions: convert_conditions(entry.conditions),
            })
        })
        .collect::<Result<Vec<_>, FormConversionError>>()?;

    Ok(ConditionalLogicSpec {
        visibility,
        conditional_validation,
    })
}

fn convert_policy(field: &str, name: Option<&str>) -> Result<MatchPolicy, FormConversionError> {
    match name {
        None => Ok(MatchPolicy::default()),
        Some(name) => MatchPolicy::from_name(name).ok_or_else(|| {
            FormConversionError::ValidationError(format!(
                "Field '{}' has unknown match policy '{}'",
                field, name
            ))
        }),
    }
}

// Unknown operator names are kept; they evaluate to false.
fn convert_conditions(raw: Vec<RawCondition>) -> Vec<Condition> {
    raw.into_iter()
        .map(|c| Condition {
            target_field_id: c.target_field_id,
            operator: Operator::from_name(&c.operator),
            value: FieldValue::from_json(&c.value),
        })
        .collect()
}
