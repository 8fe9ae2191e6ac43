use crate::ast::{FieldId, FieldValue, LogicTrace};
use crate::compiler::Compiler;
use crate::conditions::ConditionEvaluator;
use crate::diagnostics::Diagnostic;
use crate::error::DefinitionError;
use crate::form::{CalculationOptions, CompiledForm, FieldDefinition, FormDefinition};
use crate::formula::{self, FormulaResult};
use crate::registry::{DefaultFieldTypes, FieldTypeRegistry};
use crate::trace::TraceFormatter;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;

/// The outcome of one recalculation pass.
#[derive(Debug, Clone, Default)]
pub struct Recalculation {
    /// The input snapshot with every successfully calculated field replaced by
    /// its formatted display value.
    pub snapshot: AHashMap<FieldId, FieldValue>,
    /// Values by field name after the pass. Calculated fields hold raw numbers.
    pub by_name: AHashMap<String, FieldValue>,
    /// Ids of the fields that are currently visible.
    pub visible: AHashSet<FieldId>,
    /// Validation rules per visible field. Hidden fields have no entry.
    pub rules: AHashMap<FieldId, Vec<String>>,
    pub formula_results: AHashMap<FieldId, FormulaResult>,
    /// Formulas that failed during this pass.
    pub diagnostics: Vec<Diagnostic>,
}

impl Recalculation {
    pub fn is_visible(&self, id: FieldId) -> bool {
        self.visible.contains(&id)
    }

    /// `None` means the field is hidden: not validated and not submitted.
    pub fn rules_for(&self, id: FieldId) -> Option<&[String]> {
        self.rules.get(&id).map(Vec::as_slice)
    }

    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.by_name.get(name)
    }
}

/// Runs recalculation passes over a compiled form.
///
/// An `Evaluator` is immutable once built. It can be shared between sessions
/// and threads, and every pass is a pure function of the snapshot it is given.
pub struct Evaluator {
    compiled: CompiledForm,
    registry: Box<dyn FieldTypeRegistry>,
}

impl Evaluator {
    /// Creates an evaluator that takes base rules from [`DefaultFieldTypes`].
    pub fn new(compiled: CompiledForm) -> Self {
        Self::with_registry(compiled, Box::new(DefaultFieldTypes))
    }

    pub fn with_registry(compiled: CompiledForm, registry: Box<dyn FieldTypeRegistry>) -> Self {
        Self { compiled, registry }
    }

    pub fn compiled(&self) -> &CompiledForm {
        &self.compiled
    }

    /// Recomputes calculated values, visibility and validation rules for the
    /// raw snapshot. Call this after every change to a field value.
    pub fn recalculate(&self, raw: &AHashMap<FieldId, FieldValue>) -> Recalculation {
        let fields = self.compiled.fields();
        let mut snapshot = raw.clone();
        let mut by_name = self.seed(raw);
        let mut formula_results = AHashMap::with_capacity(self.compiled.calculations.len());
        let mut diagnostics = Vec::new();

        // 1. Calculated fields, in dependency order
        for calculation in &self.compiled.calculations {
            let Some(field) = fields.get(calculation.field_index) else {
                log::debug!("Skipping calculation at unknown position {}", calculation.field_index);
                continue;
            };
            let Some(options) = field.calculation() else {
                continue;
            };

            let outcome = match &calculation.expression {
                Ok(expr) => formula::evaluate_expression(expr, &by_name, options.decimal_places),
                Err(error) => Err(error.clone()),
            };

            match outcome {
                Ok(value) => {
                    let formatted = formula::format_with(value, options);
                    by_name.insert(field.name.clone(), FieldValue::Number(value));
                    snapshot.insert(field.id, FieldValue::Text(formatted.clone()));
                    formula_results.insert(
                        field.id,
                        FormulaResult {
                            raw: Some(value),
                            formatted,
                        },
                    );
                }
                Err(error) => {
                    let previous = raw.get(&field.id).map(ToString::to_string);
                    formula_results.insert(
                        field.id,
                        FormulaResult {
                            raw: None,
                            formatted: previous.unwrap_or_default(),
                        },
                    );
                    // Parse failures were already reported when compiling.
                    if calculation.expression.is_ok() {
                        log::debug!("Formula of '{}' failed: {}", field.name, error);
                        diagnostics.push(Diagnostic::FormulaFailed {
                            field: field.name.clone(),
                            error,
                        });
                    }
                }
            }
        }

        // 2. Visibility against the updated values
        let conditions = ConditionEvaluator::with_index(fields, &self.compiled.index, &by_name);
        let visible: AHashSet<FieldId> = fields
            .iter()
            .filter(|field| conditions.should_show(field))
            .map(|field| field.id)
            .collect();

        // 3. Rules for visible fields only
        let rules: AHashMap<FieldId, Vec<String>> = fields
            .iter()
            .filter(|field| visible.contains(&field.id))
            .map(|field| (field.id, self.rules_of(field, &conditions)))
            .collect();

        log::debug!(
            "Recalculated {} fields: {} visible, {} formula failures",
            fields.len(),
            visible.len(),
            diagnostics.len()
        );

        Recalculation {
            snapshot,
            by_name,
            visible,
            rules,
            formula_results,
            diagnostics,
        }
    }

    /// Explains why the field is visible or hidden and which conditional
    /// rules apply, using the values of a finished pass.
    pub fn explain(&self, field_id: FieldId, pass: &Recalculation) -> Option<String> {
        let field = self.compiled.field(field_id)?;
        let conditions =
            ConditionEvaluator::with_index(self.compiled.fields(), &self.compiled.index, &pass.by_name);

        let mut lines = Vec::new();
        if let Some(trace) = conditions.explain(field) {
            let verdict = if trace.outcome() { "Visible" } else { "Hidden" };
            lines.push(format!(
                "{}: {}",
                verdict,
                TraceFormatter::format_trace(&trace)
            ));
        }
        for (rule, trace) in conditions.trace_validation(field) {
            if matches!(trace, LogicTrace::Inert) {
                continue;
            }
            let verdict = if trace.outcome() { "applies" } else { "does not apply" };
            lines.push(format!(
                "Rule '{}' {}: {}",
                rule,
                verdict,
                TraceFormatter::format_trace(&trace)
            ));
        }

        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }

    /// Initial by-name values. Calculated fields start from their previous
    /// display value reduced back to a number.
    fn seed(&self, raw: &AHashMap<FieldId, FieldValue>) -> AHashMap<String, FieldValue> {
        self.compiled
            .fields()
            .iter()
            .map(|field| {
                let value = match (field.calculation(), raw.get(&field.id)) {
                    (Some(options), Some(previous)) => seed_calculated(previous, options),
                    (Some(_), None) => FieldValue::Null,
                    (None, Some(value)) => value.clone(),
                    (None, None) => field.field_type.default_value(),
                };
                (field.name.clone(), value)
            })
            .collect()
    }

    fn rules_of(&self, field: &FieldDefinition, conditions: &ConditionEvaluator) -> Vec<String> {
        self.registry
            .base_rules(field)
            .into_iter()
            .chain(conditions.extra_validation_rules(field))
            .unique()
            .collect()
    }
}

fn seed_calculated(previous: &FieldValue, options: &CalculationOptions) -> FieldValue {
    match previous {
        FieldValue::Text(display) => formula::parse_display(display, options)
            .map_or_else(|| previous.clone(), FieldValue::Number),
        other => other.clone(),
    }
}

/// Compiles the fields and runs a single pass over them.
///
/// Compile diagnostics come first in the returned diagnostics. Prefer
/// [`Compiler`] and [`Evaluator`] when the same form is recalculated often.
pub fn recalculate(
    fields: &[FieldDefinition],
    raw: &AHashMap<FieldId, FieldValue>,
) -> Result<Recalculation, DefinitionError> {
    let compiled = Compiler::builder(FormDefinition::new(fields.to_vec()))
        .build()
        .compile()?;
    let mut compile_diagnostics = compiled.diagnostics.clone();
    let mut pass = Evaluator::new(compiled).recalculate(raw);
    compile_diagnostics.append(&mut pass.diagnostics);
    pass.diagnostics = compile_diagnostics;
    Ok(pass)
}
