use super::definition::{FieldDefinition, FormDefinition};
use crate::ast::{Expression, FieldId};
use crate::config::EngineLimits;
use crate::diagnostics::Diagnostic;
use crate::error::{ArtifactError, FormulaError};
use ahash::AHashMap;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::{Read, Write};

/// A calculated field with its formula parsed ahead of time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledCalculation {
    /// Position of the field in [`FormDefinition::fields`].
    pub field_index: usize,
    /// Every name the formula references, known fields or not.
    pub dependencies: BTreeSet<String>,
    /// The parsed formula, or why it could not be parsed.
    pub expression: Result<Expression, FormulaError>,
}

/// A form whose formulas are parsed and whose calculated fields are ordered,
/// ready for any number of recalculation passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledForm {
    pub form: FormDefinition,
    pub limits: EngineLimits,
    /// Calculated fields in evaluation order.
    pub calculations: Vec<CompiledCalculation>,
    /// Field id to position in `form.fields`.
    pub index: AHashMap<FieldId, usize>,
    /// Problems found while compiling. None of them prevent evaluation.
    pub diagnostics: Vec<Diagnostic>,
}

impl CompiledForm {
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.form.fields
    }

    pub fn field(&self, id: FieldId) -> Option<&FieldDefinition> {
        self.index
            .get(&id)
            .and_then(|&position| self.form.fields.get(position))
    }

    /// Serializes the compiled form using the bincode format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        encode_to_vec(self, standard()).map_err(|e| ArtifactError::Encode(e.to_string()))
    }

    /// Saves the compiled form to a file using the bincode format.
    pub fn save(&self, path: &str) -> Result<(), ArtifactError> {
        let bytes = self.to_bytes()?;
        let io_error = |source| ArtifactError::Io {
            path: path.to_string(),
            source,
        };
        let mut file = fs::File::create(path).map_err(io_error)?;
        file.write_all(&bytes).map_err(io_error)?;
        log::debug!("Saved compiled form ({} bytes) to '{}'", bytes.len(), path);
        Ok(())
    }

    /// Loads a compiled form from a file.
    pub fn from_file(path: &str) -> Result<Self, ArtifactError> {
        let io_error = |source| ArtifactError::Io {
            path: path.to_string(),
            source,
        };
        let mut file = fs::File::open(path).map_err(io_error)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(io_error)?;
        Self::from_bytes(&bytes)
    }

    /// Deserializes a compiled form from a byte slice.
    ///
    /// Artifacts whose indices disagree with their own field list are rejected.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let compiled: Self = decode_from_slice(bytes, standard())
            .map(|(form, _)| form) // bincode 2 returns a tuple (data, bytes_read)
            .map_err(|e| ArtifactError::Decode(e.to_string()))?;
        compiled.check_consistency()?;
        Ok(compiled)
    }

    fn check_consistency(&self) -> Result<(), ArtifactError> {
        let fields = self.fields();
        if self.index.len() != fields.len() {
            return Err(ArtifactError::Inconsistent(format!(
                "index covers {} fields but the form has {}",
                self.index.len(),
                fields.len()
            )));
        }
        for (&id, &position) in &self.index {
            if fields.get(position).map(|f| f.id) != Some(id) {
                return Err(ArtifactError::Inconsistent(format!(
                    "field id {} is indexed at position {}",
                    id, position
                )));
            }
        }

        let mut seen = BTreeSet::new();
        for calculation in &self.calculations {
            let position = calculation.field_index;
            match fields.get(position) {
                Some(field) if field.calculation().is_some() && seen.insert(position) => {}
                _ => {
                    return Err(ArtifactError::Inconsistent(format!(
                        "calculation points at position {}, which is not a distinct calculated field",
                        position
                    )));
                }
            }
        }
        Ok(())
    }
}
