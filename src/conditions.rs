//! Evaluation of conditional logic: visibility and conditional validation.

use crate::ast::{FieldId, FieldValue, LogicTrace};
use crate::form::{Action, Condition, ConditionTree, FieldDefinition, MatchPolicy};
use crate::operators;
use ahash::AHashMap;
use std::borrow::Cow;

/// Evaluates condition trees against a by-name snapshot.
///
/// Conditions reference their target by field id. The id is resolved through
/// the field list to the target field, whose name is the key into the
/// snapshot. Ids that resolve to no field make their condition `false`.
pub struct ConditionEvaluator<'a> {
    fields: &'a [FieldDefinition],
    index: Cow<'a, AHashMap<FieldId, usize>>,
    by_name: &'a AHashMap<String, FieldValue>,
}

impl<'a> ConditionEvaluator<'a> {
    pub fn new(fields: &'a [FieldDefinition], by_name: &'a AHashMap<String, FieldValue>) -> Self {
        let index = fields.iter().enumerate().map(|(i, f)| (f.id, i)).collect();
        Self {
            fields,
            index: Cow::Owned(index),
            by_name,
        }
    }

    /// Reuses an id-to-position index built ahead of time by the compiler.
    pub fn with_index(
        fields: &'a [FieldDefinition],
        index: &'a AHashMap<FieldId, usize>,
        by_name: &'a AHashMap<String, FieldValue>,
    ) -> Self {
        Self {
            fields,
            index: Cow::Borrowed(index),
            by_name,
        }
    }

    /// Whether the field is visible. Fields without visibility logic always are.
    pub fn should_show(&self, field: &FieldDefinition) -> bool {
        self.trace_visibility(field).outcome()
    }

    /// The validation rules whose conditions currently hold, in declaration order.
    pub fn extra_validation_rules(&self, field: &FieldDefinition) -> Vec<String> {
        let Some(logic) = &field.conditional_logic else {
            return Vec::new();
        };

        let mut rules: Vec<String> = Vec::new();
        for entry in &logic.conditional_validation {
            if entry.conditions.is_empty() || rules.contains(&entry.rule) {
                continue;
            }
            if self.trace_group(entry.policy, &entry.conditions).outcome() {
                rules.push(entry.rule.clone());
            }
        }
        rules
    }

    /// How the visibility of the field was decided, or `None` when it has no
    /// effective visibility logic.
    pub fn explain(&self, field: &FieldDefinition) -> Option<LogicTrace> {
        match self.trace_visibility(field) {
            LogicTrace::Inert => None,
            trace => Some(trace),
        }
    }

    pub fn trace_visibility(&self, field: &FieldDefinition) -> LogicTrace {
        let Some(visibility) = field
            .conditional_logic
            .as_ref()
            .and_then(|logic| logic.visibility.as_ref())
        else {
            return LogicTrace::Inert;
        };
        if visibility.tree.condition_count() == 0 {
            return LogicTrace::Inert;
        }

        let tree = self.trace_tree(&visibility.tree);
        match visibility.action {
            Action::Show => tree,
            Action::Hide => LogicTrace::Negated {
                outcome: !tree.outcome(),
                child: Box::new(tree),
            },
        }
    }

    /// Traces every conditional validation entry of the field as `(rule, trace)`.
    pub fn trace_validation(&self, field: &FieldDefinition) -> Vec<(String, LogicTrace)> {
        field
            .conditional_logic
            .iter()
            .flat_map(|logic| logic.conditional_validation.iter())
            .map(|entry| {
                let trace = if entry.conditions.is_empty() {
                    LogicTrace::Inert
                } else {
                    self.trace_group(entry.policy, &entry.conditions)
                };
                (entry.rule.clone(), trace)
            })
            .collect()
    }

    fn trace_tree(&self, tree: &ConditionTree) -> LogicTrace {
        match tree {
            ConditionTree::Simple { policy, conditions } => self.trace_group(*policy, conditions),
            ConditionTree::Advanced {
                groups_policy,
                groups,
            } => {
                // Empty groups take no part in the outer reduction.
                let children: Vec<LogicTrace> = groups
                    .iter()
                    .filter(|group| !group.conditions.is_empty())
                    .map(|group| self.trace_group(group.policy, &group.conditions))
                    .collect();
                let outcome = groups_policy.reduce(children.iter().map(LogicTrace::outcome));
                LogicTrace::Group {
                    policy: *groups_policy,
                    children,
                    outcome,
                }
            }
        }
    }

    fn trace_group(&self, policy: MatchPolicy, conditions: &[Condition]) -> LogicTrace {
        let children: Vec<LogicTrace> = conditions
            .iter()
            .map(|condition| self.trace_condition(condition))
            .collect();
        let outcome = policy.reduce(children.iter().map(LogicTrace::outcome));
        LogicTrace::Group {
            policy,
            children,
            outcome,
        }
    }

    fn trace_condition(&self, condition: &Condition) -> LogicTrace {
        let target = self
            .index
            .get(&condition.target_field_id)
            .and_then(|&position| self.fields.get(position));

        match target {
            None => LogicTrace::Condition {
                target: format!("#{}", condition.target_field_id),
                operator: condition.operator.name().to_string(),
                expected: condition.value.clone(),
                actual: None,
                outcome: false,
            },
            Some(target) => {
                let actual = self
                    .by_name
                    .get(&target.name)
                    .cloned()
                    .unwrap_or_else(|| target.field_type.default_value());
                let outcome = operators::supports(&target.field_type, &condition.operator)
                    && operators::compare(&condition.operator, &actual, &condition.value);
                LogicTrace::Condition {
                    target: target.name.clone(),
                    operator: condition.operator.name().to_string(),
                    expected: condition.value.clone(),
                    actual: Some(actual),
                    outcome,
                }
            }
        }
    }
}
