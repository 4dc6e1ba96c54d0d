//! HTTP API for the sovereign judge
//!
//! Endpoints:
//! - GET /health - Health check
//! - POST /score - Score prose against a scene packet
//! - POST /physics - Law compliance report for prose
//! - POST /oracle - Delta report, candidate strategies and selection

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::delta::build_delta_report;
use crate::core::oracle::{select_best_strategy, PitchOracle};
use crate::core::providers::{with_timeout, JudgeProvider};
use crate::types::{
    DeltaReport, EmotionPhysicsTable, LawComplianceReport, OracleSelection, PitchStrategy,
    SScoreResult, ScenePacket, SovereignConfig, SovereignError,
};

/// App state, built once and shared read-only across requests
pub struct AppState {
    pub config: Arc<SovereignConfig>,
    pub physics: Arc<EmotionPhysicsTable>,
    pub judge: JudgeProvider,
}

impl AppState {
    pub fn new(
        config: Arc<SovereignConfig>,
        physics: Arc<EmotionPhysicsTable>,
        judge: JudgeProvider,
    ) -> Self {
        Self {
            config,
            physics,
            judge,
        }
    }
}

/// Packet + prose request body shared by every POST route
#[derive(Debug, Deserialize)]
pub struct ProseRequest {
    pub packet: ScenePacket,
    pub prose: String,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub judge: String,
    pub emotions: usize,
}

/// Oracle response
#[derive(Debug, Serialize)]
pub struct OracleResponse {
    pub delta: DeltaReport,
    pub candidates: Vec<PitchStrategy>,
    pub selection: Option<OracleSelection>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error mapped onto a status code
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<SovereignError> for ApiError {
    fn from(err: SovereignError) -> Self {
        let status = match err {
            SovereignError::Validation(_)
            | SovereignError::MissingPhysics { .. }
            | SovereignError::Json(_) => StatusCode::BAD_REQUEST,
            SovereignError::Provider(_) => StatusCode::BAD_GATEWAY,
            SovereignError::Config(_) | SovereignError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!(status = %self.status, error = %self.message, "request failed");
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

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/score", post(score))
        .route("/physics", post(physics))
        .route("/oracle", post(oracle))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        judge: format!("{:?}", state.judge),
        emotions: state.physics.len(),
    })
}

async fn scored(state: &AppState, req: &ProseRequest) -> Result<SScoreResult, ApiError> {
    req.packet.validate(&state.physics)?;
    let result = with_timeout(
        state.config.provider_timeout_ms,
        state.judge.score(&req.packet, &req.prose),
    )
    .await
    .map_err(SovereignError::from)?;
    Ok(result)
}

/// Score prose
async fn score(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProseRequest>,
) -> Result<Json<SScoreResult>, ApiError> {
    Ok(Json(scored(&state, &req).await?))
}

/// Law compliance report
async fn physics(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProseRequest>,
) -> Result<Json<LawComplianceReport>, ApiError> {
    req.packet.validate(&state.physics)?;
    Ok(Json(
        state.judge.calc_judge().physics_report(&req.packet, &req.prose),
    ))
}

/// Delta report and ranked correction strategies
async fn oracle(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProseRequest>,
) -> Result<Json<OracleResponse>, ApiError> {
    let result = scored(&state, &req).await?;
    let delta = build_delta_report(&result);
    let candidates = PitchOracle::new().candidates(&delta);
    let selection = select_best_strategy(&candidates, &delta);
    Ok(Json(OracleResponse {
        delta,
        candidates,
        selection,
    }))
}

/// Run the API server
pub async fn run_server(addr: &str, state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "sovereign API listening");
    info!("GET /health, POST /score, POST /physics, POST /oracle");
    axum::serve(listener, router).await?;
    Ok(())
}
