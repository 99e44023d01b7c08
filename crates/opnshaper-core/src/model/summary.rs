// ── Search summaries ──

use serde::Serialize;
use serde_json::{Map, Value};

use super::EntityId;

/// One row from a list operation.
///
/// Only the columns shared by every entity are typed; the rest (bandwidth,
/// weight, sequence, ...) stay as the firewall rendered them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySummary {
    pub id: EntityId,
    pub enabled: bool,
    pub description: String,
    pub columns: Map<String, Value>,
}

impl EntitySummary {
    /// A display column as text, if present.
    pub fn column(&self, name: &str) -> Option<String> {
        self.columns.get(name).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}
