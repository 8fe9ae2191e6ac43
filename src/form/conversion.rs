use super::definition::FormDefinition;
use crate::error::FormConversionError;

/// A trait for custom data models that can be converted into a Katachi `FormDefinition`.
///
/// This is the extension point that keeps the engine agnostic of the storage
/// format used for field definitions. Implement it on your own structs to
/// translate them into typed field definitions. [`crate::data::RawForm`] is
/// the implementation for the bundled JSON format.
///
/// # Example
///
/// ```rust,no_run
/// use katachi::prelude::*;
/// use katachi::error::FormConversionError;
///
/// struct MyColumn { id: u64, name: String, kind: String }
/// struct MyTable { columns: Vec<MyColumn> }
///
/// impl IntoForm for MyTable {
///     fn into_form(self) -> std::result::Result<FormDefinition, FormConversionError> {
///         let fields = self
///             .columns
///             .into_iter()
///             .map(|c| FieldDefinition::new(c.id, &c.name, FieldType::from_tag(&c.kind)))
///             .collect();
///         Ok(FormDefinition::new(fields))
///     }
/// }
/// ```
pub trait IntoForm {
    /// Consumes the object and converts it into a Katachi form definition.
    fn into_form(self) -> Result<FormDefinition, FormConversionError>;
}
