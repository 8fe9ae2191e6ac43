use crate::ast::FieldId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while tokenizing, parsing or evaluating a formula.
///
/// These never abort a recalculation pass. They surface through
/// [`crate::formula::try_evaluate`] and as diagnostics on a pass.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FormulaError {
    #[error("Formula is empty")]
    Empty,

    #[error("Unexpected character '{found}' at offset {offset}")]
    UnexpectedCharacter { found: char, offset: usize },

    #[error("Invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("Placeholder starting at offset {offset} is not closed or contains invalid characters")]
    InvalidPlaceholder { offset: usize },

    #[error("Unexpected token '{found}' at position {position}")]
    UnexpectedToken { found: String, position: usize },

    #[error("Formula ended unexpectedly")]
    UnexpectedEnd,

    #[error("Formula exceeds the limit of {limit} tokens")]
    TooManyTokens { limit: usize },

    #[error("Formula nesting exceeds the depth limit of {limit}")]
    DepthExceeded { limit: usize },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Formula produced a non-finite result")]
    NonFinite,
}

/// Errors raised when a form definition is structurally invalid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DefinitionError {
    #[error("Field id {0} is used by more than one field")]
    DuplicateId(FieldId),

    #[error("Field name '{0}' is used by more than one field")]
    DuplicateName(String),

    #[error("Field '{0}' has an empty name")]
    EmptyName(FieldId),

    #[error("Field name '{0}' may only contain ASCII letters, digits and underscores")]
    InvalidName(String),

    #[error("Calculated field '{0}' has no calculation options")]
    MissingCalculation(String),

    #[error("Field '{field}' has {count} conditions, exceeding the limit of {limit}")]
    TooManyConditions {
        field: String,
        count: usize,
        limit: usize,
    },
}

/// Errors that can occur when converting a custom user format into a Katachi `FormDefinition`.
#[derive(Error, Debug, Clone)]
pub enum FormConversionError {
    #[error("Failed to parse form JSON: {0}")]
    JsonParseError(String),

    #[error("Field '{field}' declares both simple conditions and rule groups")]
    AmbiguousLogic { field: String },

    #[error("Field '{field}' has an unknown logic mode '{mode}'")]
    UnknownLogicMode { field: String, mode: String },

    #[error("Field '{field}' has invalid options: {message}")]
    InvalidOptions { field: String, message: String },

    #[error("Invalid custom data: {0}")]
    ValidationError(String),
}

/// Errors that can occur while saving or loading compiled form artifacts.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization failed: {0}")]
    Encode(String),

    #[error("Deserialization failed: {0}")]
    Decode(String),

    #[error("Artifact is inconsistent: {0}")]
    Inconsistent(String),
}
