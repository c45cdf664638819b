use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{OrchestratorError, Result};

// The call schema of one external capability, as handed to the Brain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,

    // JSON Schema for the arguments; passed through untouched.
    #[serde(default = "empty_schema")]
    pub parameters: Value,
}

fn empty_schema() -> Value {
    serde_json::json!({ "type": "object", "properties": {} })
}

impl CapabilityDescriptor {
    /// Accepts either the OpenAI tool wrapper (`{"type":"function","function":{..}}`)
    /// or a bare function object.
    pub fn from_definition(definition: Value) -> Result<Self> {
        let function = match definition {
            Value::Object(mut map) if map.contains_key("function") => {
                map.remove("function").unwrap_or(Value::Null)
            }
            other => other,
        };
        serde_json::from_value(function)
            .map_err(|e| OrchestratorError::Execution(format!("unreadable capability definition: {e}")))
    }
}

/// Looks up capability schemas by name.
#[async_trait]
pub trait CapabilityRegistry: Send + Sync {
    /// Fails with `CapabilityNotFound` when the registry has no such name.
    async fn get_definition(&self, name: &str) -> Result<CapabilityDescriptor>;
}
