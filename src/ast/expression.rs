use serde::{Deserialize, Serialize};
use std::fmt;

/// The Abstract Syntax Tree of a parsed formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    // Arithmetic
    Add(Box<Expression>, Box<Expression>),
    Subtract(Box<Expression>, Box<Expression>),
    Multiply(Box<Expression>, Box<Expression>),
    Divide(Box<Expression>, Box<Expression>),
    Negate(Box<Expression>),

    // Leaf nodes
    Literal(f64),
    Placeholder(String),
}

impl Expression {
    pub fn node_count(&self) -> usize {
        match self {
            Expression::Add(l, r)
            | Expression::Subtract(l, r)
            | Expression::Multiply(l, r)
            | Expression::Divide(l, r) => 1 + l.node_count() + r.node_count(),
            Expression::Negate(v) => 1 + v.node_count(),
            Expression::Literal(_) | Expression::Placeholder(_) => 1,
        }
    }
}

/// A wrapper to display a formula as an indented tree.
pub struct DisplayExpression<'a> {
    pub expr: &'a Expression,
}

impl<'a> fmt::Display for DisplayExpression<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_as_tree(self.expr, f, "", true)
    }
}

impl<'a> DisplayExpression<'a> {
    fn fmt_as_tree(
        &self,
        expr: &Expression,
        f: &mut fmt::Formatter<'_>,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let node_marker = if is_last { "└── " } else { "├── " };
        write!(f, "{}{}", prefix, node_marker)?;

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });

        match expr {
            Expression::Literal(n) => writeln!(f, "Literal: {}", n)?,
            Expression::Placeholder(name) => writeln!(f, "Field: {{{}}}", name)?,
            Expression::Negate(v) => {
                writeln!(f, "Negate (-)")?;
                self.fmt_as_tree(v, f, &child_prefix, true)?;
            }
            Expression::Add(l, r) => self.fmt_binary(f, "Add (+)", l, r, &child_prefix)?,
            Expression::Subtract(l, r) => {
                self.fmt_binary(f, "Subtract (-)", l, r, &child_prefix)?
            }
            Expression::Multiply(l, r) => {
                self.fmt_binary(f, "Multiply (*)", l, r, &child_prefix)?
            }
            Expression::Divide(l, r) => self.fmt_binary(f, "Divide (/)", l, r, &child_prefix)?,
        }
        Ok(())
    }

    fn fmt_binary(
        &self,
        f: &mut fmt::Formatter<'_>,
        name: &str,
        l: &Expression,
        r: &Expression,
        prefix: &str,
    ) -> fmt::Result {
        writeln!(f, "{}", name)?;
        self.fmt_as_tree(l, f, prefix, false)?;
        self.fmt_as_tree(r, f, prefix, true)?;
        Ok(())
    }
}
