use crate::ast::{FieldValue, LogicTrace};
use itertools::Itertools;

/// Formats condition traces into human-readable strings
pub struct TraceFormatter;

impl TraceFormatter {
    /// Format a logic trace into a human-readable explanation.
    pub fn format_trace(trace: &LogicTrace) -> String {
        // Start the recursive formatting with the lowest possible parent precedence.
        Self::format_recursive(trace, 0)
    }

    /// Recursively formats the trace, adding parentheses only when necessary.
    fn format_recursive(trace: &LogicTrace, parent_precedence: u8) -> String {
        let current_precedence = trace.precedence();
        let needs_parens = current_precedence < parent_precedence;

        let body = match trace {
            LogicTrace::Group {
                policy, children, ..
            } => {
                let separator = format!(" {} ", policy.symbol());
                // A single child needs no grouping of its own.
                let child_precedence = if children.len() == 1 {
                    parent_precedence
                } else {
                    current_precedence
                };
                children
                    .iter()
                    .map(|child| Self::format_recursive(child, child_precedence))
                    .join(&separator)
            }
            LogicTrace::Negated { child, .. } => {
                format!("NOT {}", Self::format_recursive(child, u8::MAX))
            }
            LogicTrace::Condition {
                target,
                operator,
                expected,
                actual,
                ..
            } => {
                let seen = match actual {
                    Some(value) => format!("(was {})", Self::format_value(value)),
                    None => "(no such field)".to_string(),
                };
                if operator == "is_empty" || operator == "is_not_empty" {
                    format!("{} {} {}", target, seen, operator)
                } else {
                    format!(
                        "{} {} {} {}",
                        target,
                        seen,
                        operator,
                        Self::format_value(expected)
                    )
                }
            }
            LogicTrace::Inert => "always".to_string(),
        };

        if needs_parens && !matches!(trace, LogicTrace::Group { children, .. } if children.len() == 1)
        {
            format!("({})", body)
        } else {
            body
        }
    }

    /// Format a value for display.
    fn format_value(value: &FieldValue) -> String {
        match value {
            FieldValue::Null => "empty".to_string(),
            FieldValue::Text(s) => format!("\"{}\"", s),
            FieldValue::List(items) => {
                format!("[{}]", items.iter().map(Self::format_value).join(", "))
            }
            other => other.to_string(),
        }
    }
}
