//! # Katachi - Dynamic Form Evaluation Engine
//!
//! **Katachi** recomputes the dynamic state of a form every time one of its
//! values changes: calculated fields are evaluated from arithmetic formulas in
//! dependency order, visibility is decided from nested condition trees, and
//! the validation rules that apply to each visible field are collected.
//!
//! ## Core Workflow
//!
//! The engine is agnostic of the format field definitions are stored in. It
//! operates on a canonical [`form::FormDefinition`]. The primary workflow is:
//!
//! 1.  **Load Your Data**: Parse your field definitions into your own structs, or use the bundled [`data::RawForm`] JSON format.
//! 2.  **Convert to Katachi's Model**: Implement [`form::IntoForm`] for your structs to translate them into a `FormDefinition`.
//! 3.  **Compile**: Use `Compiler::builder` to validate the form, parse every formula once and order the calculated fields.
//! 4.  **Recalculate**: Create an `Evaluator` from the compiled form and call `recalculate` with the current values after every change.
//!
//! Misconfigured content (bad formulas, dangling condition targets, cycles
//! between calculated fields) never fails a pass. It is reported as
//! [`diagnostics::Diagnostic`]s instead.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use katachi::prelude::*;
//! use ahash::AHashMap;
//!
//! fn main() -> Result<()> {
//!     let form = FormDefinition::new(vec![
//!         FieldDefinition::new(1, "price", FieldType::Number),
//!         FieldDefinition::new(2, "quantity", FieldType::Number),
//!         FieldDefinition::calculated(3, "total", "{price} * {quantity}"),
//!         FieldDefinition::new(4, "discount_code", FieldType::Text).with_logic(
//!             ConditionalLogicSpec::show_when(
//!                 MatchPolicy::All,
//!                 vec![Condition::new(3, "greater_than", 100.0)],
//!             ),
//!         ),
//!     ]);
//!
//!     let compiled = Compiler::builder(form).build().compile()?;
//!     let evaluator = Evaluator::new(compiled);
//!
//!     let mut values = AHashMap::new();
//!     values.insert(1, FieldValue::Number(40.0));
//!     values.insert(2, FieldValue::Number(3.0));
//!
//!     let pass = evaluator.recalculate(&values);
//!     println!("total = {:?}", pass.snapshot.get(&3)); // "120.00"
//!     println!("discount code visible: {}", pass.is_visible(4));
//!     if let Some(reason) = evaluator.explain(4, &pass) {
//!         println!("-> {}", reason);
//!     }
//!     Ok(())
//! }
//! ```

pub mod ast;
pub mod compiler;
pub mod conditions;
pub mod config;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod evaluator;
pub mod form;
pub mod formula;
pub mod operators;
pub mod prelude;
pub mod registry;
pub mod trace;
