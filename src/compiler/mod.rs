//! Turns a [`FormDefinition`] into a [`CompiledForm`].
//!
//! Compilation rejects structurally broken forms and otherwise never fails:
//! bad formulas, dangling condition targets and dependency cycles become
//! [`Diagnostic`]s that travel with the compiled form.

use crate::ast::FieldId;
use crate::config::EngineLimits;
use crate::diagnostics::Diagnostic;
use crate::error::DefinitionError;
use crate::form::{CompiledCalculation, CompiledForm, FieldDefinition, FormDefinition};
use crate::formula;
use crate::operators;
use ahash::{AHashMap, AHashSet};
use std::collections::BTreeSet;

#[cfg(feature = "debug-tools")]
use {crate::ast::DisplayExpression, std::fs};

mod ordering;

use ordering::DependencyGraph;

pub struct Compiler {
    form: FormDefinition,
    limits: EngineLimits,
}

pub struct CompilerBuilder {
    form: FormDefinition,
    limits: EngineLimits,
}

impl CompilerBuilder {
    pub fn new(form: FormDefinition) -> Self {
        Self {
            form,
            limits: EngineLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: EngineLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn build(self) -> Compiler {
        Compiler {
            form: self.form,
            limits: self.limits,
        }
    }
}

impl Compiler {
    pub fn builder(form: FormDefinition) -> CompilerBuilder {
        CompilerBuilder::new(form)
    }

    pub fn compile(self) -> Result<CompiledForm, DefinitionError> {
        self.form.validate()?;
        self.check_condition_limits()?;

        let index: AHashMap<FieldId, usize> = self
            .form
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.id, i))
            .collect();

        let mut diagnostics = Vec::new();
        let calculations = self.parse_calculations(&mut diagnostics);

        // 1. Order the calculated fields by their dependencies
        let names: Vec<&str> = calculations
            .iter()
            .map(|c| self.form.fields[c.field_index].name.as_str())
            .collect();
        let dependencies: Vec<&BTreeSet<String>> =
            calculations.iter().map(|c| &c.dependencies).collect();
        let graph = DependencyGraph::new(&names, &dependencies);

        let cycle = graph.cycle_members();
        if !cycle.is_empty() {
            let diagnostic = Diagnostic::DependencyCycle {
                fields: cycle.iter().map(|&i| names[i].to_string()).collect(),
            };
            log::warn!("{}", diagnostic);
            diagnostics.push(diagnostic);
        }

        // 2. Check every condition against the field it targets
        let positions: AHashMap<&str, usize> =
            names.iter().enumerate().map(|(i, n)| (*n, i)).collect();
        for field in &self.form.fields {
            let found = self.check_conditions(field, &index, &graph, &positions, &dependencies);
            for diagnostic in found {
                log::warn!("{}", diagnostic);
                diagnostics.push(diagnostic);
            }
        }

        let order = graph.evaluation_order();
        let mut slots: Vec<Option<CompiledCalculation>> =
            calculations.into_iter().map(Some).collect();
        let calculations: Vec<CompiledCalculation> =
            order.iter().filter_map(|&i| slots[i].take()).collect();

        log::debug!(
            "Compiled form with {} fields, {} calculated, {} diagnostics",
            self.form.fields.len(),
            calculations.len(),
            diagnostics.len()
        );

        Ok(CompiledForm {
            form: self.form,
            limits: self.limits,
            calculations,
            index,
            diagnostics,
        })
    }

    fn check_condition_limits(&self) -> Result<(), DefinitionError> {
        for field in &self.form.fields {
            let count = field
                .conditional_logic
                .as_ref()
                .map_or(0, |logic| logic.condition_count());
            if count > self.limits.max_conditions {
                return Err(DefinitionError::TooManyConditions {
                    field: field.name.clone(),
                    count,
                    limit: self.limits.max_conditions,
                });
            }
        }
        Ok(())
    }

    /// Parses every formula, in definition order.
    fn parse_calculations(&self, diagnostics: &mut Vec<Diagnostic>) -> Vec<CompiledCalculation> {
        let known: AHashSet<&str> = self.form.fields.iter().map(|f| f.name.as_str()).collect();

        let mut calculations = Vec::new();
        for (field_index, field) in self.form.fields.iter().enumerate() {
            let Some(options) = field.calculation() else {
                continue;
            };

            let dependencies = formula::extract_names(&options.formula);
            for name in dependencies.iter().filter(|n| !known.contains(n.as_str())) {
                let diagnostic = Diagnostic::UnknownReference {
                    field: field.name.clone(),
                    name: name.clone(),
                };
                log::warn!("{}", diagnostic);
                diagnostics.push(diagnostic);
            }

            let expression = formula::parse(&options.formula, &self.limits);
            match &expression {
                Ok(expr) => {
                    log::debug!(
                        "Parsed formula of '{}' into {} nodes",
                        field.name,
                        expr.node_count()
                    );
                    #[cfg(feature = "debug-tools")]
                    self.write_ast_file(&field.name, expr);
                }
                Err(error) => {
                    let diagnostic = Diagnostic::FormulaParse {
                        field: field.name.clone(),
                        error: error.clone(),
                    };
                    log::warn!("{}", diagnostic);
                    diagnostics.push(diagnostic);
                }
            }

            calculations.push(CompiledCalculation {
                field_index,
                dependencies,
                expression,
            });
        }
        calculations
    }

    fn check_conditions(
        &self,
        field: &FieldDefinition,
        index: &AHashMap<FieldId, usize>,
        graph: &DependencyGraph,
        positions: &AHashMap<&str, usize>,
        dependencies: &[&BTreeSet<String>],
    ) -> Vec<Diagnostic> {
        let Some(logic) = &field.conditional_logic else {
            return Vec::new();
        };

        let mut diagnostics = Vec::new();
        let mut self_reference = false;
        for condition in logic.all_conditions() {
            let Some(target) = index
                .get(&condition.target_field_id)
                .map(|&i| &self.form.fields[i])
            else {
                diagnostics.push(Diagnostic::DanglingTarget {
                    field: field.name.clone(),
                    target_field_id: condition.target_field_id,
                });
                continue;
            };

            if !operators::supports(&target.field_type, &condition.operator) {
                diagnostics.push(Diagnostic::UnsupportedOperator {
                    field: field.name.clone(),
                    target: target.name.clone(),
                    operator: condition.operator.name().to_string(),
                });
            }

            self_reference |= target.id == field.id
                || positions
                    .get(target.name.as_str())
                    .is_some_and(|&p| reads_field(graph, dependencies, p, &field.name));
        }

        if self_reference {
            diagnostics.push(Diagnostic::SelfReference {
                field: field.name.clone(),
            });
        }
        diagnostics
    }

    #[cfg(feature = "debug-tools")]
    fn write_ast_file(&self, field_name: &str, expr: &crate::ast::Expression) {
        let sanitized: String = field_name
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        let path = format!("tmp/formula_{}_ast.txt", sanitized);
        let display = DisplayExpression { expr };
        let written = fs::create_dir_all("tmp").and_then(|_| fs::write(&path, display.to_string()));
        if let Err(e) = written {
            log::warn!("Could not write debug file '{}': {}", path, e);
        }
    }
}

/// Whether the calculation at `position` reads `name`, directly or through
/// other calculations.
fn reads_field(
    graph: &DependencyGraph,
    dependencies: &[&BTreeSet<String>],
    position: usize,
    name: &str,
) -> bool {
    std::iter::once(position)
        .chain(graph.reachable_from(position))
        .any(|p| dependencies[p].contains(name))
}
