use crate::ast::{FieldId, FieldValue};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fs;

/// Raw field values keyed by field id, matching the snapshot JSON format:
///
/// ```json
/// { "1": 10, "2": 3, "5": "US", "7": ["a", "b"] }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(transparent)]
pub struct SnapshotFile {
    pub values: AHashMap<FieldId, serde_json::Value>,
}

impl SnapshotFile {
    /// Load a snapshot from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_snapshot(snapshot: &AHashMap<FieldId, FieldValue>) -> Self {
        let values = snapshot
            .iter()
            .map(|(id, value)| (*id, value.to_json()))
            .collect();
        Self { values }
    }

    /// The snapshot in the form the evaluator consumes.
    pub fn to_snapshot(&self) -> AHashMap<FieldId, FieldValue> {
        self.values
            .iter()
            .map(|(id, value)| (*id, FieldValue::from_json(value)))
            .collect()
    }

    /// Pretty JSON with ids in ascending order.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        let ordered: std::collections::BTreeMap<&FieldId, &serde_json::Value> =
            self.values.iter().collect();
        serde_json::to_string_pretty(&ordered)
    }
}
