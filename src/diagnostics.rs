use crate::ast::FieldId;
use crate::error::FormulaError;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-fatal report about misconfigured form content.
///
/// The engine keeps going in every one of these cases. It is up to the caller
/// to surface them to whoever designs the form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Diagnostic {
    FormulaParse {
        field: String,
        error: FormulaError,
    },
    FormulaFailed {
        field: String,
        error: FormulaError,
    },
    UnknownReference {
        field: String,
        name: String,
    },
    DependencyCycle {
        fields: Vec<String>,
    },
    DanglingTarget {
        field: String,
        target_field_id: FieldId,
    },
    UnsupportedOperator {
        field: String,
        target: String,
        operator: String,
    },
    SelfReference {
        field: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::FormulaParse { field, error } => {
                write!(f, "Formula of '{}' cannot be parsed: {}", field, error)
            }
            Diagnostic::FormulaFailed { field, error } => {
                write!(f, "Formula of '{}' failed: {}", field, error)
            }
            Diagnostic::UnknownReference { field, name } => write!(
                f,
                "Formula of '{}' references unknown field '{{{}}}', which counts as 0",
                field, name
            ),
            Diagnostic::DependencyCycle { fields } => write!(
                f,
                "Calculated fields depend on each other in a cycle: {}",
                fields.iter().join(", ")
            ),
            Diagnostic::DanglingTarget {
                field,
                target_field_id,
            } => write!(
                f,
                "Field '{}' has a condition on missing field #{}, which is always false",
                field, target_field_id
            ),
            Diagnostic::UnsupportedOperator {
                field,
                target,
                operator,
            } => write!(
                f,
                "Field '{}' uses operator '{}' which field '{}' does not support",
                field, operator, target
            ),
            Diagnostic::SelfReference { field } => {
                write!(f, "Conditions of field '{}' depend on the field itself", field)
            }
        }
    }
}
