//! REST API server for the portfolio analyzer
//!
//! Exposes the analyzer via HTTP endpoints for the upload UI.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::analyzer::PortfolioAnalyzer;
use crate::error::AnalysisError;
use crate::flows::registered_prompts;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub portfolio_image_data_uri: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingsRequest {
    pub portfolio_holdings: String,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub analyzer: Arc<PortfolioAnalyzer>,
}

fn status_for(err: &AnalysisError) -> StatusCode {
    match err {
        AnalysisError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
        AnalysisError::ExtractionFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AnalysisError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn respond<T: Serialize>(
    result: crate::Result<T>,
) -> (StatusCode, Json<ApiResponse>) {
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::success(data))),
        Err(e) => (status_for(&e), Json(ApiResponse::error(e.to_string()))),
    }
}

/// Unparseable bodies get the same envelope as every other failure
fn reject(rejection: JsonRejection) -> (StatusCode, Json<ApiResponse>) {
    warn!(error = %rejection.body_text(), "Rejected request body");
    respond::<()>(Err(AnalysisError::InvalidInput(rejection.body_text())))
}

/// =============================
/// Endpoints
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn flows() -> Json<ApiResponse> {
    Json(ApiResponse::success(registered_prompts()))
}

async fn analyze(
    State(state): State<ApiState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> (StatusCode, Json<ApiResponse>) {
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return reject(rejection),
    };

    info!(
        payload_bytes = req.portfolio_image_data_uri.len(),
        "Received portfolio analysis request"
    );

    respond(
        state
            .analyzer
            .analyze_and_summarize(&req.portfolio_image_data_uri)
            .await,
    )
}

async fn recommendations(
    State(state): State<ApiState>,
    payload: Result<Json<HoldingsRequest>, JsonRejection>,
) -> (StatusCode, Json<ApiResponse>) {
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return reject(rejection),
    };

    respond(state.analyzer.recommend(&req.portfolio_holdings).await)
}

async fn missing_sectors(
    State(state): State<ApiState>,
    payload: Result<Json<HoldingsRequest>, JsonRejection>,
) -> (StatusCode, Json<ApiResponse>) {
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return reject(rejection),
    };

    respond(
        state
            .analyzer
            .identify_missing_sectors(&req.portfolio_holdings)
            .await,
    )
}

/// =============================
/// Router
/// =============================

pub fn create_router(analyzer: Arc<PortfolioAnalyzer>) -> Router {
    let state = ApiState { analyzer };

    Router::new()
        .route("/health", get(health))
        .route("/api/flows", get(flows))
        .route("/api/analyze", post(analyze))
        .route("/api/recommendations", post(recommendations))
        .route("/api/missing-sectors", post(missing_sectors))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    analyzer: Arc<PortfolioAnalyzer>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(analyzer);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
