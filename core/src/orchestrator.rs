use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

use crate::aci::AciClient;
use crate::augment::{self, IssueAnalysisRequest};
use crate::catalog::{self, Capability};
use crate::config::Settings;
use crate::dependencies::{self, CombinedAnalysis};
use crate::error::{OrchestratorError, Result};
use crate::llm::{Brain, ChatModel};
use crate::normalize;
use crate::registry::CapabilityRegistry;
use crate::runtime::{self, CapabilityExecutor, LinkedAccount};

/// Result of filing an issue. Always well-formed; failures land in `error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssueOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_url: Option<String>,
    /// Issue number, or `"unknown"` when the service did not report one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_number: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl IssueOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            issue_url: None,
            issue_number: None,
            generated_body: None,
            error: Some(message.into()),
            result: None,
        }
    }

    fn from_result(repository: &str, result: Value) -> Self {
        let field = |key: &str| {
            result
                .get("data")
                .and_then(|d| d.get(key))
                .or_else(|| result.get(key))
                .filter(|v| !v.is_null())
                .cloned()
        };

        let issue_url = field("html_url")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| format!("https://github.com/{repository}/issues"));
        let issue_number = field("number").unwrap_or_else(|| Value::String("unknown".to_string()));
        let success = result.get("success").and_then(Value::as_bool).unwrap_or(true);
        let error = if success {
            None
        } else {
            Some(
                result
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("issue creation reported failure")
                    .to_string(),
            )
        };

        Self {
            success,
            issue_url: Some(issue_url),
            issue_number: Some(issue_number),
            generated_body: None,
            error,
            result: Some(result),
        }
    }
}

/// Runs schema -> selection -> execution for one capability per request.
///
/// Holds no mutable state; one instance is shared by every request.
#[derive(Clone)]
pub struct Orchestrator {
    registry: Arc<dyn CapabilityRegistry>,
    model: Arc<dyn ChatModel>,
    executor: Arc<dyn CapabilityExecutor>,
    account: LinkedAccount,
}

impl Orchestrator {
    pub fn new(
        registry: Arc<dyn CapabilityRegistry>,
        model: Arc<dyn ChatModel>,
        executor: Arc<dyn CapabilityExecutor>,
        account: LinkedAccount,
    ) -> Self {
        Self {
            registry,
            model,
            executor,
            account,
        }
    }

    /// Wire the real OpenAI and ACI clients.
    pub fn from_settings(settings: &Settings) -> Self {
        let aci = Arc::new(AciClient::new(settings));
        Self::new(
            aci.clone(),
            Arc::new(Brain::new(settings)),
            aci,
            settings.linked_account.clone(),
        )
    }

    /// Resolve the capability, let the model fill in one call, execute it.
    pub async fn run(&self, capability: Capability, intent: &str) -> Result<Value> {
        let descriptor = self.registry.get_definition(capability.name()).await?;

        let call = self
            .model
            .select_call(
                capability.system_instruction(),
                intent,
                std::slice::from_ref(&descriptor),
            )
            .await?;

        if call.name != descriptor.name {
            error!("Model selected '{}' which was never offered", call.name);
            return Err(OrchestratorError::SelectionFailed(format!(
                "model selected unknown capability {}",
                call.name
            )));
        }

        runtime::execute_call(self.executor.as_ref(), &call, &self.account).await
    }

    /// The `data` field of the result when present, the whole result otherwise.
    pub async fn list_repositories(&self) -> Result<Value> {
        let mut result = self
            .run(Capability::ListRepositories, &catalog::list_repositories_intent())
            .await?;

        Ok(match result.get_mut("data") {
            Some(data) => data.take(),
            None => result,
        })
    }

    pub async fn star_repository(&self, repository: &str) -> Result<Value> {
        self.run(
            Capability::StarRepository,
            &catalog::star_repository_intent(repository),
        )
        .await
    }

    /// Fetch a file and decode its base64 payload.
    pub async fn get_file_content(&self, repository: &str, path: &str) -> Result<Value> {
        let result = self
            .run(
                Capability::GetFileContent,
                &catalog::file_content_intent(repository, path),
            )
            .await?;
        Ok(normalize::normalized(result))
    }

    /// Fetch a `package.json` from the repository and analyze its dependencies.
    pub async fn analyze_dependencies(
        &self,
        repository: &str,
        path: &str,
    ) -> Result<CombinedAnalysis> {
        let result = self.get_file_content(repository, path).await?;
        let manifest = result
            .pointer("/data/parsed_json")
            .filter(|m| m.is_object())
            .ok_or_else(|| {
                let reason = result
                    .pointer("/data/json_parse_error")
                    .and_then(Value::as_str)
                    .unwrap_or("no JSON object in file content");
                OrchestratorError::Manifest(format!("{repository}/{path}: {reason}"))
            })?;

        info!("Analyzing dependencies of {}/{}", repository, path);
        Ok(dependencies::combine(vec![dependencies::analyze_manifest(
            manifest, repository,
        )]))
    }

    pub async fn create_issue(
        &self,
        repository: &str,
        title: &str,
        description: &str,
    ) -> Result<IssueOutcome> {
        let result = self
            .run(
                Capability::CreateIssue,
                &catalog::create_issue_intent(repository, title, description),
            )
            .await?;
        Ok(IssueOutcome::from_result(repository, result))
    }

    /// Elaborate the report with the model, then file it. Never fails: any
    /// error becomes an outcome with `success: false`.
    pub async fn create_issue_with_analysis(&self, request: &IssueAnalysisRequest) -> IssueOutcome {
        let body = match augment::elaborate(self.model.as_ref(), request).await {
            Ok(body) => body,
            Err(e) => {
                error!("Issue elaboration failed: {}", e);
                return IssueOutcome::failure(e.to_string());
            }
        };

        match self
            .create_issue(&request.repository, &request.title, &body)
            .await
        {
            Ok(mut outcome) => {
                info!("Filed analyzed issue on {}", request.repository);
                outcome.generated_body = Some(body);
                outcome
            }
            Err(e) => {
                error!("Issue creation failed: {}", e);
                let mut outcome = IssueOutcome::failure(e.to_string());
                outcome.generated_body = Some(body);
                outcome
            }
        }
    }
}
