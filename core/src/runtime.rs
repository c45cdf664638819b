use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::{OrchestratorError, Result};

/// The model's chosen action: capability name plus its JSON-encoded arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub arguments: String,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Parse the argument payload. An empty payload means "no arguments".
    pub fn parsed_arguments(&self) -> Result<Value> {
        if self.arguments.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        serde_json::from_str(&self.arguments).map_err(OrchestratorError::MalformedArguments)
    }
}

/// Selects which linked credential set the execution service uses.
#[derive(Clone, PartialEq, Eq)]
pub struct LinkedAccount(String);

impl LinkedAccount {
    pub fn new(owner_id: impl Into<String>) -> Self {
        Self(owner_id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for LinkedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LinkedAccount(..)")
    }
}

/// Runs a capability on behalf of a linked account.
#[async_trait]
pub trait CapabilityExecutor: Send + Sync {
    async fn execute(&self, name: &str, arguments: Value, account: &LinkedAccount) -> Result<Value>;
}

/// Parse the call's arguments and hand it to the executor. Returns the raw result.
pub async fn execute_call(
    executor: &dyn CapabilityExecutor,
    call: &ToolCall,
    account: &LinkedAccount,
) -> Result<Value> {
    let arguments = call.parsed_arguments()?;
    info!("Handling function call: {}", call.name);
    executor.execute(&call.name, arguments, account).await
}
