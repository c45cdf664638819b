//! In-memory stand-ins for the external services.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{OrchestratorError, Result};
use crate::llm::ChatModel;
use crate::registry::{CapabilityDescriptor, CapabilityRegistry};
use crate::runtime::{CapabilityExecutor, LinkedAccount, ToolCall};

pub struct FakeRegistry {
    known: HashMap<String, CapabilityDescriptor>,
}

impl FakeRegistry {
    pub fn with(names: &[&str]) -> Self {
        let known = names
            .iter()
            .map(|name| {
                let descriptor = CapabilityDescriptor {
                    name: name.to_string(),
                    description: Some(format!("{name} capability")),
                    parameters: json!({ "type": "object", "properties": {} }),
                };
                (name.to_string(), descriptor)
            })
            .collect();
        Self { known }
    }
}

#[async_trait]
impl CapabilityRegistry for FakeRegistry {
    async fn get_definition(&self, name: &str) -> Result<CapabilityDescriptor> {
        self.known
            .get(name)
            .cloned()
            .ok_or_else(|| OrchestratorError::CapabilityNotFound(name.to_string()))
    }
}

/// Scripted model: a fixed selection outcome and a fixed completion text.
pub struct FakeModel {
    selection: Option<ToolCall>,
    completion: Option<String>,
    pub select_calls: AtomicUsize,
    pub complete_calls: AtomicUsize,
    pub intents: Mutex<Vec<String>>,
}

impl FakeModel {
    pub fn selecting(call: ToolCall) -> Self {
        Self::new(Some(call), Some("generated body".to_string()))
    }

    pub fn selecting_nothing() -> Self {
        Self::new(None, Some("generated body".to_string()))
    }

    pub fn new(selection: Option<ToolCall>, completion: Option<String>) -> Self {
        Self {
            selection,
            completion,
            select_calls: AtomicUsize::new(0),
            complete_calls: AtomicUsize::new(0),
            intents: Mutex::new(Vec::new()),
        }
    }

    pub fn selections(&self) -> usize {
        self.select_calls.load(Ordering::SeqCst)
    }

    pub fn completions(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatModel for FakeModel {
    async fn select_call(
        &self,
        _system: &str,
        intent: &str,
        _capabilities: &[CapabilityDescriptor],
    ) -> Result<ToolCall> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);
        self.intents.lock().unwrap().push(intent.to_string());
        self.selection
            .clone()
            .ok_or_else(|| OrchestratorError::SelectionFailed("no tool call generated".to_string()))
    }

    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        self.completion
            .clone()
            .ok_or_else(|| OrchestratorError::Completion("model unavailable".to_string()))
    }
}

pub struct FakeExecutor {
    outcome: std::result::Result<Value, String>,
    seen: Mutex<Vec<(String, Value, String)>>,
}

impl FakeExecutor {
    pub fn returning(result: Value) -> Self {
        Self {
            outcome: Ok(result),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Value, String)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl CapabilityExecutor for FakeExecutor {
    async fn execute(&self, name: &str, arguments: Value, account: &LinkedAccount) -> Result<Value> {
        self.seen
            .lock()
            .unwrap()
            .push((name.to_string(), arguments, account.as_str().to_string()));
        self.outcome.clone().map_err(OrchestratorError::Execution)
    }
}
