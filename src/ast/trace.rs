use super::FieldValue;
use crate::form::MatchPolicy;

/// A record of how a condition tree was evaluated, including the values it saw.
#[derive(Debug, Clone, PartialEq)]
pub enum LogicTrace {
    Condition {
        target: String,
        operator: String,
        expected: FieldValue,
        /// `None` when the target field does not exist.
        actual: Option<FieldValue>,
        outcome: bool,
    },
    Group {
        policy: MatchPolicy,
        children: Vec<LogicTrace>,
        outcome: bool,
    },
    Negated {
        child: Box<LogicTrace>,
        outcome: bool,
    },
    /// A tree without conditions. It has no effect on the field.
    Inert,
}

impl LogicTrace {
    pub fn outcome(&self) -> bool {
        match self {
            LogicTrace::Condition { outcome, .. }
            | LogicTrace::Group { outcome, .. }
            | LogicTrace::Negated { outcome, .. } => *outcome,
            LogicTrace::Inert => true,
        }
    }

    pub fn precedence(&self) -> u8 {
        match self {
            LogicTrace::Group { policy, .. } => match policy {
                MatchPolicy::Any => 1,
                MatchPolicy::All => 2,
            },
            LogicTrace::Negated { .. } => 3,
            LogicTrace::Condition { .. } | LogicTrace::Inert => 4,
        }
    }
}
