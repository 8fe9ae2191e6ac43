//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the katachi crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use katachi::prelude::*;
//! use katachi::data::{RawForm, SnapshotFile};
//!
//! # fn run_example() -> Result<()> {
//! let form_json = std::fs::read_to_string("path/to/form.json")?;
//! let form = RawForm::from_json(&form_json)?.into_form()?;
//!
//! let compiled = Compiler::builder(form).build().compile()?;
//! let evaluator = Evaluator::new(compiled);
//!
//! let snapshot = SnapshotFile::from_file("path/to/snapshot.json")?;
//! let pass = evaluator.recalculate(&snapshot.to_snapshot());
//! println!("Visible fields: {:?}", pass.visible);
//! # Ok(())
//! # }
//! ```

// Core compilation and evaluation
pub use crate::compiler::Compiler;
pub use crate::evaluator::{Evaluator, Recalculation, recalculate};

// Values, formulas and traces
pub use crate::ast::{Expression, FieldId, FieldValue, LogicTrace};
pub use crate::formula::FormulaResult;

// Form model
pub use crate::form::{
    Action, CalculationOptions, CompiledForm, Condition, ConditionTree, ConditionalLogicSpec,
    ConditionalValidation, DisplayAs, FieldDefinition, FieldOptions, FieldType, FormDefinition,
    IntoForm, MatchPolicy, RuleGroup,
};

// Configuration and collaborators
pub use crate::config::EngineLimits;
pub use crate::diagnostics::Diagnostic;
pub use crate::registry::{DefaultFieldTypes, FieldTypeRegistry};

// Error types
pub use crate::error::{ArtifactError, DefinitionError, FormConversionError, FormulaError};

// Trace formatting
pub use crate::trace::TraceFormatter;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
