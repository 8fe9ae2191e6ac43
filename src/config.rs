use serde::{Deserialize, Serialize};

/// Bounds on the work a single recalculation pass may do per field.
///
/// Formulas beyond the token or depth limits fail to parse, and forms whose
/// fields carry more conditions than `max_conditions` fail to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineLimits {
    pub max_formula_tokens: usize,
    pub max_formula_depth: usize,
    pub max_conditions: usize,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            max_formula_tokens: 512,
            max_formula_depth: 64,
            max_conditions: 256,
        }
    }
}

impl EngineLimits {
    /// Loads limits from a JSON document. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
