//! Expands a short issue report into a full issue body before filing it.

use serde::Deserialize;
use tracing::info;

use crate::error::Result;
use crate::llm::ChatModel;

pub const ELABORATION_SYSTEM: &str = "You are a senior software engineer who writes clear, \
actionable GitHub issues. Answer with the issue body only, formatted in GitHub Markdown.";

#[derive(Debug, Clone, Deserialize)]
pub struct IssueAnalysisRequest {
    /// `owner/name` of the target repository.
    pub repository: String,
    pub title: String,
    pub description: String,
    /// What the issue is about, e.g. a dependency name.
    #[serde(default)]
    pub subject: Option<String>,
}

pub fn elaboration_prompt(request: &IssueAnalysisRequest) -> String {
    let mut prompt = format!(
        "Write a detailed GitHub issue for the repository {}.\n\nTitle: {}\nReported description: {}\n",
        request.repository, request.title, request.description
    );
    if let Some(subject) = request.subject.as_deref().filter(|s| !s.trim().is_empty()) {
        prompt.push_str(&format!("Affected dependency: {subject}\n"));
    }
    prompt.push_str(
        "\nInclude these sections: Summary, Impact, Steps to Reproduce or Evidence, \
         Suggested Fix, and Acceptance Criteria.",
    );
    prompt
}

/// Ask the model for the expanded body. No tools are offered.
pub async fn elaborate(model: &dyn ChatModel, request: &IssueAnalysisRequest) -> Result<String> {
    info!("Generating issue body for {}", request.repository);
    model
        .complete(ELABORATION_SYSTEM, &elaboration_prompt(request))
        .await
}
