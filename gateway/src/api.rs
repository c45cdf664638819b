use serde::{Deserialize, Serialize};
use serde_json::Value;

use pilot_core::dependencies::ManifestInput;

// Query for GET /file-content
#[derive(Debug, Deserialize)]
pub struct FileContentQuery {
    pub repository: String, // owner/name
    pub path: String,
}

// Query for GET /dependencies
#[derive(Debug, Deserialize)]
pub struct DependenciesQuery {
    pub repository: String,
    #[serde(default = "default_manifest_path")]
    pub path: String,
}

fn default_manifest_path() -> String {
    "package.json".to_string()
}

// Body for POST /dependencies/analyze
#[derive(Debug, Deserialize)]
pub struct AnalyzeDependenciesRequest {
    pub packages: Vec<ManifestInput>,
}

#[derive(Debug, Deserialize)]
pub struct StarRequest {
    pub repository: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateIssueRequest {
    pub repository: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RepositoriesResponse {
    pub repositories: Value,
}

#[derive(Debug, Serialize)]
pub struct FileContentResponse {
    pub repository: String,
    pub path: String,
    pub result: Value,
}

#[derive(Debug, Serialize)]
pub struct StarResponse {
    pub repository: String,
    pub result: Value,
}

// Every failure surfaces as { "detail": "..." }
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
