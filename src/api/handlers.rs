//! Request handlers for the HTTP API.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::OptimizerError;
use crate::llm::TextGenerator;
use crate::optimizer::{
    check_key, generate_examples, test_prompt, Example, KeyCheck, OptimizationLoop,
    OptimizationResult, PromptTestResult, SyntheticGeneration, DEFAULT_MAX_ITERATIONS,
    DEFAULT_NUM_TO_GENERATE,
};

/// Shared state for the HTTP API.
pub struct AppState {
    pub generator: TextGenerator,
}

pub type SharedState = Arc<AppState>;

/// Body of `POST /api/optimize`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRequest {
    #[serde(default)]
    pub initial_prompt: Option<String>,
    #[serde(default)]
    pub examples: Option<Vec<Example>>,
    #[serde(default)]
    pub max_iterations: Option<usize>,
}

/// Body of `POST /api/generate-examples`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateExamplesRequest {
    #[serde(default)]
    pub examples: Option<Vec<Example>>,
    #[serde(default)]
    pub num_to_generate: Option<usize>,
}

/// Body of `POST /api/test-prompt`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPromptRequest {
    #[serde(default)]
    pub initial_prompt: Option<String>,
    #[serde(default)]
    pub examples: Option<Vec<Example>>,
}

/// Response of `POST /api/test-prompt`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestPromptResponse {
    pub test_results: Vec<PromptTestResult>,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// An error ready to be sent to the client.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<OptimizerError> for ApiError {
    fn from(err: OptimizerError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!(status = %self.status, error = %self.message, "Request failed");
        }
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn test_key(State(state): State<SharedState>) -> (StatusCode, Json<KeyCheck>) {
    let check = check_key(&state.generator).await;
    let status = if check.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(check))
}

pub async fn optimize(
    State(state): State<SharedState>,
    body: Result<Json<OptimizeRequest>, JsonRejection>,
) -> Result<Json<OptimizationResult>, ApiError> {
    let Json(req) = body?;
    let examples = req.examples.unwrap_or_default();
    let initial_prompt = req.initial_prompt.unwrap_or_default();
    let max_iterations = req.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS);

    let result = OptimizationLoop::new(&state.generator)
        .run(&initial_prompt, &examples, max_iterations)
        .await?;
    Ok(Json(result))
}

pub async fn generate(
    State(state): State<SharedState>,
    body: Result<Json<GenerateExamplesRequest>, JsonRejection>,
) -> Result<Json<SyntheticGeneration>, ApiError> {
    let Json(req) = body?;
    let examples = req.examples.unwrap_or_default();
    let count = req.num_to_generate.unwrap_or(DEFAULT_NUM_TO_GENERATE);

    let generation = generate_examples(&state.generator, &examples, count).await?;
    Ok(Json(generation))
}

pub async fn run_prompt_test(
    State(state): State<SharedState>,
    body: Result<Json<TestPromptRequest>, JsonRejection>,
) -> Result<Json<TestPromptResponse>, ApiError> {
    let Json(req) = body?;
    let examples = req.examples.unwrap_or_default();
    let prompt = req.initial_prompt.unwrap_or_default();

    let test_results = test_prompt(&state.generator, &prompt, &examples).await?;
    Ok(Json(TestPromptResponse { test_results }))
}
