//! HTTP API.
//!
//! | Route | Method | Operation |
//! |-------|--------|-----------|
//! | `/api/test-key` | GET | credential probe |
//! | `/api/optimize` | POST | optimization loop |
//! | `/api/generate-examples` | POST | synthetic examples |
//! | `/api/test-prompt` | POST | prompt test run |
//! | `/health` | GET | liveness |
//! | `/metrics` | GET | Prometheus text |
//!
//! Failures are returned as `{"error": "<message>"}` with status 400 for
//! invalid requests and 500 otherwise.

pub mod handlers;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::llm::TextGenerator;
use crate::metrics::metrics_handler;

pub use handlers::{ApiError, AppState, ErrorResponse, SharedState};

/// Build the API router over a shared generator.
pub fn build_router(generator: TextGenerator, enable_cors: bool) -> Router {
    let state: SharedState = Arc::new(AppState { generator });

    let app = Router::new()
        .route("/api/test-key", get(handlers::test_key))
        .route("/api/optimize", post(handlers::optimize))
        .route("/api/generate-examples", post(handlers::generate))
        .route("/api/test-prompt", post(handlers::run_prompt_test))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(metrics_handler))
        .with_state(state);

    if enable_cors {
        app.layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
            .layer(TraceLayer::new_for_http())
    } else {
        app.layer(TraceLayer::new_for_http())
    }
}

/// Bind the configured address. Hostnames such as `localhost` are resolved.
pub async fn bind(config: &ServerConfig) -> std::io::Result<TcpListener> {
    TcpListener::bind((config.host.as_str(), config.port)).await
}

/// Serve the API until the process is stopped.
pub async fn serve(config: &ServerConfig, generator: TextGenerator) -> anyhow::Result<()> {
    let configured = generator.is_configured();
    let router = build_router(generator, config.enable_cors);

    let listener = bind(config)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;
    let addr = listener.local_addr()?;
    tracing::info!(%addr, api_key_configured = configured, "prompt-forge API listening");
    if !configured {
        tracing::warn!("No OpenAI API key configured; generation endpoints will fail");
    }

    axum::serve(listener, router).await?;
    Ok(())
}
