use super::logic::ConditionalLogicSpec;
use crate::ast::{FieldId, FieldValue};
use crate::error::DefinitionError;
use crate::formula::is_identifier_char;
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// The complete, canonical definition of a form, ready for compilation.
/// This is the target structure for any custom data model conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    pub fields: Vec<FieldDefinition>,
}

impl FormDefinition {
    pub fn new(fields: Vec<FieldDefinition>) -> Self {
        Self { fields }
    }

    /// Rejects structurally invalid forms: duplicate ids or names, empty names,
    /// and calculated fields without calculation options.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        let mut ids = AHashSet::new();
        let mut names = AHashSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(DefinitionError::EmptyName(field.id));
            }
            if !field.name.chars().all(is_identifier_char) {
                return Err(DefinitionError::InvalidName(field.name.clone()));
            }
            if !ids.insert(field.id) {
                return Err(DefinitionError::DuplicateId(field.id));
            }
            if !names.insert(field.name.as_str()) {
                return Err(DefinitionError::DuplicateName(field.name.clone()));
            }
            if field.field_type == FieldType::Calculation && field.calculation().is_none() {
                return Err(DefinitionError::MissingCalculation(field.name.clone()));
            }
        }
        Ok(())
    }

    pub fn field(&self, id: FieldId) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.id == id)
    }
}

/// Defines a single form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: FieldId,
    pub name: String,
    pub label: Option<String>,
    pub field_type: FieldType,
    pub required: bool,
    pub options: FieldOptions,
    pub conditional_logic: Option<ConditionalLogicSpec>,
}

impl FieldDefinition {
    pub fn new(id: FieldId, name: &str, field_type: FieldType) -> Self {
        Self {
            id,
            name: name.to_string(),
            label: None,
            field_type,
            required: false,
            options: FieldOptions::None,
            conditional_logic: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_options(mut self, options: FieldOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_logic(mut self, logic: ConditionalLogicSpec) -> Self {
        self.conditional_logic = Some(logic);
        self
    }

    /// Shorthand for a calculated field with default display options.
    pub fn calculated(id: FieldId, name: &str, formula: &str) -> Self {
        Self::new(id, name, FieldType::Calculation).with_options(FieldOptions::Calculation(
            CalculationOptions {
                formula: formula.to_string(),
                ..CalculationOptions::default()
            },
        ))
    }

    pub fn calculation(&self) -> Option<&CalculationOptions> {
        match &self.options {
            FieldOptions::Calculation(options) => Some(options),
            _ => None,
        }
    }

    pub fn is_calculated(&self) -> bool {
        self.field_type == FieldType::Calculation
    }
}

/// The type tag of a field. Unknown tags are preserved as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Text,
    Textarea,
    Email,
    Url,
    Phone,
    Password,
    Hidden,
    Number,
    Range,
    Rating,
    Select,
    Radio,
    Checkbox,
    CheckboxList,
    Switch,
    Date,
    Time,
    DateTime,
    File,
    Calculation,
    Custom(String),
}

/// Broad behavioural family of a field type, used to pick operator sets and rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFamily {
    Text,
    Numeric,
    Date,
    Choice,
    MultiChoice,
    Boolean,
    Other,
}

impl FieldType {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "text" => FieldType::Text,
            "textarea" => FieldType::Textarea,
            "email" => FieldType::Email,
            "url" => FieldType::Url,
            "phone" | "tel" => FieldType::Phone,
            "password" => FieldType::Password,
            "hidden" => FieldType::Hidden,
            "number" => FieldType::Number,
            "range" | "slider" => FieldType::Range,
            "rating" => FieldType::Rating,
            "select" => FieldType::Select,
            "radio" => FieldType::Radio,
            "checkbox" => FieldType::Checkbox,
            "checkbox_list" | "checkbox-list" | "checkbox_group" => FieldType::CheckboxList,
            "switch" | "toggle" => FieldType::Switch,
            "date" => FieldType::Date,
            "time" => FieldType::Time,
            "datetime" | "date_time" => FieldType::DateTime,
            "file" => FieldType::File,
            "calculation" | "calculated" => FieldType::Calculation,
            other => FieldType::Custom(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Email => "email",
            FieldType::Url => "url",
            FieldType::Phone => "phone",
            FieldType::Password => "password",
            FieldType::Hidden => "hidden",
            FieldType::Number => "number",
            FieldType::Range => "range",
            FieldType::Rating => "rating",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::CheckboxList => "checkbox_list",
            FieldType::Switch => "switch",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::DateTime => "datetime",
            FieldType::File => "file",
            FieldType::Calculation => "calculation",
            FieldType::Custom(tag) => tag.as_str(),
        }
    }

    pub fn family(&self) -> FieldFamily {
        match self {
            FieldType::Text
            | FieldType::Textarea
            | FieldType::Email
            | FieldType::Url
            | FieldType::Phone
            | FieldType::Password
            | FieldType::Hidden => FieldFamily::Text,
            FieldType::Number | FieldType::Range | FieldType::Rating | FieldType::Calculation => {
                FieldFamily::Numeric
            }
            FieldType::Date | FieldType::Time | FieldType::DateTime => FieldFamily::Date,
            FieldType::Select | FieldType::Radio => FieldFamily::Choice,
            FieldType::CheckboxList => FieldFamily::MultiChoice,
            FieldType::Checkbox | FieldType::Switch => FieldFamily::Boolean,
            FieldType::File | FieldType::Custom(_) => FieldFamily::Other,
        }
    }

    /// The value a field holds before the user has touched it.
    pub fn default_value(&self) -> FieldValue {
        match self {
            FieldType::CheckboxList => FieldValue::List(Vec::new()),
            FieldType::Checkbox | FieldType::Switch => FieldValue::Bool(false),
            _ => FieldValue::Null,
        }
    }
}

/// Type-specific configuration of a field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum FieldOptions {
    #[default]
    None,
    Text {
        min_length: Option<u32>,
        max_length: Option<u32>,
    },
    Numeric {
        min: Option<f64>,
        max: Option<f64>,
        step: Option<f64>,
    },
    Choices {
        choices: Vec<String>,
        multiple: bool,
    },
    Calculation(CalculationOptions),
}

/// How a calculated value is rendered for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayAs {
    #[default]
    Number,
    Percentage,
    Currency,
}

impl DisplayAs {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "number" | "plain" => Some(DisplayAs::Number),
            "percentage" | "percent" => Some(DisplayAs::Percentage),
            "currency" | "money" => Some(DisplayAs::Currency),
            _ => None,
        }
    }
}

/// Formula source and display parameters of a calculated field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationOptions {
    pub formula: String,
    pub decimal_places: u32,
    pub display_as: DisplayAs,
    pub prefix: String,
    pub suffix: String,
    pub thousands_separator: String,
}

impl Default for CalculationOptions {
    fn default() -> Self {
        Self {
            formula: String::new(),
            decimal_places: 2,
            display_as: DisplayAs::Number,
            prefix: String::new(),
            suffix: String::new(),
            thousands_separator: ",".to_string(),
        }
    }
}
