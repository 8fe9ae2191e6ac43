//! The formula evaluator for calculated fields.
//!
//! Formulas are a restricted arithmetic grammar: decimal literals, `{name}`
//! placeholders, `+ - * /`, unary minus and parentheses. Source text is
//! tokenized and parsed into an [`Expression`] and then evaluated explicitly;
//! nothing is ever handed to a general-purpose interpreter.

use crate::ast::{Expression, FieldValue};
use crate::config::EngineLimits;
use crate::error::FormulaError;
use ahash::AHashMap;

mod dependencies;
mod display;
mod engine;
mod lexer;
mod parser;

pub use dependencies::extract_names;
pub(crate) use lexer::is_identifier_char;
pub use display::{MAX_DECIMAL_PLACES, format, format_with, parse_display, round_to};

use engine::FormulaEngine;
use parser::Parser;

/// The outcome of one calculated field in a pass.
#[derive(Debug, Clone, PartialEq)]
pub struct FormulaResult {
    /// `None` when the formula failed; it then feeds nothing into later formulas.
    pub raw: Option<f64>,
    /// The display value handed back to the renderer.
    pub formatted: String,
}

/// Parses formula source into an expression tree within the given limits.
pub fn parse(source: &str, limits: &EngineLimits) -> Result<Expression, FormulaError> {
    let tokens = lexer::tokenize(source, limits.max_formula_tokens)?;
    Parser::new(&tokens, limits.max_formula_depth).parse()
}

/// Evaluates an already parsed formula and rounds it to `decimal_places`.
pub fn evaluate_expression(
    expr: &Expression,
    by_name: &AHashMap<String, FieldValue>,
    decimal_places: u32,
) -> Result<f64, FormulaError> {
    FormulaEngine::new(by_name)
        .evaluate(expr)
        .map(|value| round_to(value, decimal_places))
}

/// Parses and evaluates formula source, reporting why it failed.
pub fn try_evaluate(
    source: &str,
    by_name: &AHashMap<String, FieldValue>,
    decimal_places: u32,
) -> Result<f64, FormulaError> {
    let expr = parse(source, &EngineLimits::default())?;
    evaluate_expression(&expr, by_name, decimal_places)
}

/// Parses and evaluates formula source. Unparseable formulas, division by zero
/// and non-finite results all yield `None`.
pub fn evaluate(
    source: &str,
    by_name: &AHashMap<String, FieldValue>,
    decimal_places: u32,
) -> Option<f64> {
    try_evaluate(source, by_name, decimal_places).ok()
}
