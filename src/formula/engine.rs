use crate::ast::{Expression, FieldValue};
use crate::error::FormulaError;
use ahash::AHashMap;

/// The core recursive engine for evaluating a parsed formula against a by-name snapshot.
pub(crate) struct FormulaEngine<'a> {
    by_name: &'a AHashMap<String, FieldValue>,
}

impl<'a> FormulaEngine<'a> {
    pub(crate) fn new(by_name: &'a AHashMap<String, FieldValue>) -> Self {
        Self { by_name }
    }

    pub(crate) fn evaluate(&self, expr: &Expression) -> Result<f64, FormulaError> {
        let value = self.evaluate_recursive(expr)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(FormulaError::NonFinite)
        }
    }

    fn evaluate_recursive(&self, expr: &Expression) -> Result<f64, FormulaError> {
        match expr {
            Expression::Add(l, r) => self.eval_binary(l, r, |a, b| Ok(a + b)),
            Expression::Subtract(l, r) => self.eval_binary(l, r, |a, b| Ok(a - b)),
            Expression::Multiply(l, r) => self.eval_binary(l, r, |a, b| Ok(a * b)),
            Expression::Divide(l, r) => self.eval_binary(l, r, |a, b| {
                if b == 0.0 {
                    Err(FormulaError::DivisionByZero)
                } else {
                    Ok(a / b)
                }
            }),
            Expression::Negate(v) => Ok(-self.evaluate_recursive(v)?),
            Expression::Literal(n) => Ok(*n),
            Expression::Placeholder(name) => Ok(self
                .by_name
                .get(name)
                .map_or(0.0, FieldValue::as_operand)),
        }
    }

    fn eval_binary<F>(&self, l: &Expression, r: &Expression, f: F) -> Result<f64, FormulaError>
    where
        F: Fn(f64, f64) -> Result<f64, FormulaError>,
    {
        let left = self.evaluate_recursive(l)?;
        let right = self.evaluate_recursive(r)?;
        f(left, right)
    }
}
