//! HTTP surface.
//!
//! `POST /generate-outfit` runs one workflow and returns the final state;
//! `GET /health` reports liveness. Browser access is limited to the
//! configured CORS origins.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::ai::TextGenerator;
use crate::core::ServerConfig;
use crate::workflow::{CycleController, OutfitState};

/// API error types.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid CORS origin: {0}")]
    InvalidOrigin(String),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Workflow failed: {0}")]
    WorkflowFailed(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::WorkflowFailed(_) => StatusCode::BAD_GATEWAY,
            Self::InvalidOrigin(_) | Self::Bind { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// State shared across handlers.
#[derive(Clone)]
pub struct ApiState {
    /// Loop settings applied to every request.
    pub controller: CycleController,

    /// Model used by every run.
    pub llm: Arc<dyn TextGenerator>,
}

impl ApiState {
    /// Create new API state.
    pub fn new(controller: CycleController, llm: Arc<dyn TextGenerator>) -> Self {
        Self { controller, llm }
    }
}

/// Bind the configured host and port. Hostnames are resolved.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, ApiError> {
    TcpListener::bind((config.host.as_str(), config.port)).await.map_err(|source| ApiError::Bind {
        addr: format!("{}:{}", config.host, config.port),
        source,
    })
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer, ApiError> {
    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o).map_err(|_| ApiError::InvalidOrigin(o.clone())))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

/// Build the API router.
pub fn router(state: ApiState, config: &ServerConfig) -> Result<Router, ApiError> {
    Ok(Router::new()
        .route("/health", get(health))
        .route("/generate-outfit", post(generate_outfit))
        .layer(cors_layer(&config.cors_origins)?)
        .with_state(state))
}

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// POST /generate-outfit - run the workflow once and return the final state.
async fn generate_outfit(State(state): State<ApiState>) -> Result<Json<OutfitState>, ApiError> {
    let outcome = state.controller.run(state.llm.as_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Outfit workflow failed");
        ApiError::WorkflowFailed(e.to_string())
    })?;

    tracing::info!(run_id = %outcome.run_id, status = %outcome.status, "Served outfit");
    Ok(Json(outcome.state))
}

/// Serve `app` on an already bound listener until Ctrl-C.
pub async fn serve_on(listener: TcpListener, app: Router) -> anyhow::Result<()> {
    tracing::info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;
    Ok(())
}

/// Bind the configured address and serve the API.
pub async fn serve(config: &ServerConfig, state: ApiState) -> anyhow::Result<()> {
    let app = router(state, config)?;
    let listener = bind(config).await?;
    serve_on(listener, app).await
}
