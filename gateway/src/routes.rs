use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use pilot_core::augment::IssueAnalysisRequest;
use pilot_core::dependencies::{self, CombinedAnalysis};
use pilot_core::{IssueOutcome, Orchestrator, OrchestratorError};
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::api::{
    AnalyzeDependenciesRequest, CreateIssueRequest, DependenciesQuery, ErrorResponse,
    FileContentQuery, FileContentResponse, MessageResponse, RepositoriesResponse, StarRequest,
    StarResponse,
};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

/// Every pipeline failure maps to a 500 with a `detail` message.
pub struct ApiError(OrchestratorError);

impl From<OrchestratorError> for ApiError {
    fn from(err: OrchestratorError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self.0);
        let body = ErrorResponse {
            detail: self.0.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

pub fn cors(allowed_origin: &str) -> anyhow::Result<CorsLayer> {
    let origin = HeaderValue::from_str(allowed_origin)?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/repositories", get(list_repositories))
        .route("/file-content", get(file_content))
        .route("/dependencies", get(repository_dependencies))
        .route("/dependencies/analyze", post(analyze_dependencies))
        .route("/stars", post(star_repository))
        .route("/issues", post(create_issue))
        .route("/issues/analyze", post(analyze_issue))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// --- HANDLERS ---

async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "GitHub Repository Lister API",
    })
}

async fn health_check() -> &'static str {
    "Repo Pilot Gateway: Operational"
}

async fn list_repositories(
    State(state): State<AppState>,
) -> Result<Json<RepositoriesResponse>, ApiError> {
    let repositories = state.orchestrator.list_repositories().await?;
    Ok(Json(RepositoriesResponse { repositories }))
}

async fn file_content(
    State(state): State<AppState>,
    Query(query): Query<FileContentQuery>,
) -> Result<Json<FileContentResponse>, ApiError> {
    info!("Fetching {} from {}", query.path, query.repository);
    let result = state
        .orchestrator
        .get_file_content(&query.repository, &query.path)
        .await?;
    Ok(Json(FileContentResponse {
        repository: query.repository,
        path: query.path,
        result,
    }))
}

async fn repository_dependencies(
    State(state): State<AppState>,
    Query(query): Query<DependenciesQuery>,
) -> Result<Json<CombinedAnalysis>, ApiError> {
    let analysis = state
        .orchestrator
        .analyze_dependencies(&query.repository, &query.path)
        .await?;
    Ok(Json(analysis))
}

// Pure analysis of caller-supplied manifests; no external calls.
async fn analyze_dependencies(
    Json(payload): Json<AnalyzeDependenciesRequest>,
) -> Json<CombinedAnalysis> {
    info!("Analyzing {} package manifests", payload.packages.len());
    Json(dependencies::analyze_all(&payload.packages))
}

async fn star_repository(
    State(state): State<AppState>,
    Json(payload): Json<StarRequest>,
) -> Result<Json<StarResponse>, ApiError> {
    let result = state.orchestrator.star_repository(&payload.repository).await?;
    Ok(Json(StarResponse {
        repository: payload.repository,
        result,
    }))
}

async fn create_issue(
    State(state): State<AppState>,
    Json(payload): Json<CreateIssueRequest>,
) -> Result<Json<IssueOutcome>, ApiError> {
    info!("Creating issue '{}' on {}", payload.title, payload.repository);
    let outcome = state
        .orchestrator
        .create_issue(&payload.repository, &payload.title, &payload.description)
        .await?;
    Ok(Json(outcome))
}

// Failures are reported inside the outcome, so this always answers 200.
async fn analyze_issue(
    State(state): State<AppState>,
    Json(payload): Json<IssueAnalysisRequest>,
) -> Json<IssueOutcome> {
    info!("Analyzing issue '{}' on {}", payload.title, payload.repository);
    Json(state.orchestrator.create_issue_with_analysis(&payload).await)
}
