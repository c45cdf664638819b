//! Orchestrator error types.

/// Errors that abort a pipeline run.
///
/// Decoding problems inside an execution result are not represented here; the
/// normalizer records them inline on the result instead.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("capability not found: {0}")]
    CapabilityNotFound(String),

    #[error("tool selection failed: {0}")]
    SelectionFailed(String),

    #[error("malformed tool call arguments: {0}")]
    MalformedArguments(#[source] serde_json::Error),

    #[error("execution failed: {0}")]
    Execution(String),

    #[error("unusable package manifest: {0}")]
    Manifest(String),

    #[error("completion service error: {0}")]
    Completion(String),

    #[error("config error: {0}")]
    Config(String),
}

impl From<async_openai::error::OpenAIError> for OrchestratorError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        OrchestratorError::Completion(err.to_string())
    }
}

impl From<reqwest::Error> for OrchestratorError {
    fn from(err: reqwest::Error) -> Self {
        OrchestratorError::Execution(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
