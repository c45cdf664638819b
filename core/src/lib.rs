//! Tool-call orchestration for GitHub capabilities.
//!
//! A language model picks exactly one capability call, the ACI service runs it
//! under a linked account, and the result is normalized for the caller.

pub mod aci;
pub mod augment;
pub mod catalog;
pub mod config;
pub mod dependencies;
pub mod error;
pub mod llm;
pub mod normalize;
pub mod orchestrator;
pub mod registry;
pub mod runtime;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::Capability;
pub use config::Settings;
pub use error::{OrchestratorError, Result};
pub use orchestrator::{IssueOutcome, Orchestrator};
