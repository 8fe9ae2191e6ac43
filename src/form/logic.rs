use crate::ast::{FieldId, FieldValue};
use crate::operators::Operator;
use serde::{Deserialize, Serialize};

/// How a list of boolean results is reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchPolicy {
    #[default]
    All,
    Any,
}

impl MatchPolicy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "all" | "and" => Some(MatchPolicy::All),
            "any" | "or" => Some(MatchPolicy::Any),
            _ => None,
        }
    }

    /// Reduces the results. Callers handle the empty case themselves.
    pub fn reduce<I: IntoIterator<Item = bool>>(self, results: I) -> bool {
        let mut results = results.into_iter();
        match self {
            MatchPolicy::All => results.all(|r| r),
            MatchPolicy::Any => results.any(|r| r),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            MatchPolicy::All => "AND",
            MatchPolicy::Any => "OR",
        }
    }
}

/// Whether a true condition tree shows or hides its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Action {
    #[default]
    Show,
    Hide,
}

impl Action {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "show" => Some(Action::Show),
            "hide" => Some(Action::Hide),
            _ => None,
        }
    }
}

/// An atomic comparison between another field's value and a literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub target_field_id: FieldId,
    pub operator: Operator,
    pub value: FieldValue,
}

impl Condition {
    pub fn new(target_field_id: FieldId, operator: &str, value: impl Into<FieldValue>) -> Self {
        Self {
            target_field_id,
            operator: Operator::from_name(operator),
            value: value.into(),
        }
    }
}

/// A set of conditions combined under a single match policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleGroup {
    pub policy: MatchPolicy,
    pub conditions: Vec<Condition>,
}

/// A boolean condition tree. Simple and advanced shapes are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConditionTree {
    Simple {
        policy: MatchPolicy,
        conditions: Vec<Condition>,
    },
    Advanced {
        groups_policy: MatchPolicy,
        groups: Vec<RuleGroup>,
    },
}

impl ConditionTree {
    pub fn condition_count(&self) -> usize {
        match self {
            ConditionTree::Simple { conditions, .. } => conditions.len(),
            ConditionTree::Advanced { groups, .. } => {
                groups.iter().map(|g| g.conditions.len()).sum()
            }
        }
    }

    pub fn conditions(&self) -> Box<dyn Iterator<Item = &Condition> + '_> {
        match self {
            ConditionTree::Simple { conditions, .. } => Box::new(conditions.iter()),
            ConditionTree::Advanced { groups, .. } => {
                Box::new(groups.iter().flat_map(|g| g.conditions.iter()))
            }
        }
    }
}

/// Visibility rules of a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityLogic {
    pub action: Action,
    pub tree: ConditionTree,
}

/// "When these conditions hold, additionally require `rule` on this field."
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalValidation {
    pub rule: String,
    pub policy: MatchPolicy,
    pub conditions: Vec<Condition>,
}

/// Conditional behaviour owned by exactly one field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConditionalLogicSpec {
    pub visibility: Option<VisibilityLogic>,
    pub conditional_validation: Vec<ConditionalValidation>,
}

impl ConditionalLogicSpec {
    pub fn show_when(policy: MatchPolicy, conditions: Vec<Condition>) -> Self {
        Self::simple(Action::Show, policy, conditions)
    }

    pub fn hide_when(policy: MatchPolicy, conditions: Vec<Condition>) -> Self {
        Self::simple(Action::Hide, policy, conditions)
    }

    pub fn simple(action: Action, policy: MatchPolicy, conditions: Vec<Condition>) -> Self {
        Self {
            visibility: Some(VisibilityLogic {
                action,
                tree: ConditionTree::Simple { policy, conditions },
            }),
            conditional_validation: Vec::new(),
        }
    }

    pub fn advanced(action: Action, groups_policy: MatchPolicy, groups: Vec<RuleGroup>) -> Self {
        Self {
            visibility: Some(VisibilityLogic {
                action,
                tree: ConditionTree::Advanced {
                    groups_policy,
                    groups,
                },
            }),
            conditional_validation: Vec::new(),
        }
    }

    pub fn with_validation(mut self, validation: ConditionalValidation) -> Self {
        self.conditional_validation.push(validation);
        self
    }

    /// Total number of conditions across visibility and validation entries.
    pub fn condition_count(&self) -> usize {
        let visibility = self
            .visibility
            .as_ref()
            .map_or(0, |v| v.tree.condition_count());
        let validation: usize = self
            .conditional_validation
            .iter()
            .map(|v| v.conditions.len())
            .sum();
        visibility + validation
    }

    pub fn all_conditions(&self) -> impl Iterator<Item = &Condition> {
        self.visibility
            .iter()
            .flat_map(|v| v.tree.conditions())
            .chain(
                self.conditional_validation
                    .iter()
                    .flat_map(|v| v.conditions.iter()),
            )
    }
}
