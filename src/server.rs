//! HTTP transport for the intake engine.
//!
//! Routes:
//! - `POST /api/chat/start`
//! - `POST /api/chat/message`
//! - `POST /api/chat/report`
//! - `GET /health`

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::intake::{IntakeEngine, IntakeError, ProcessResult};
use crate::report::IntakeReport;

/// Detail returned when a report is requested too early.
pub const NO_REPORT_DETAIL: &str = "No report available. Complete the intake first.";

const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

/// State shared by every handler.
pub struct AppState {
    /// Engine the routes delegate to.
    pub engine: IntakeEngine,
}

type AppStateArc = Arc<AppState>;

/// Reply to `POST /api/chat/start`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StartResponse {
    /// New session id.
    pub session_id: String,
    /// Greeting to show the caller.
    pub message: String,
}

/// Body of `POST /api/chat/message`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageRequest {
    /// Target session.
    pub session_id: String,
    /// Caller text.
    pub message: String,
}

/// Body of `POST /api/chat/report`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReportRequest {
    /// Target session.
    pub session_id: String,
}

/// Error body, `{"detail": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason.
    pub detail: String,
}

/// Reply to `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok` while serving.
    pub status: String,
    /// Registered sessions.
    pub sessions: usize,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn not_found(detail: impl Into<String>) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            detail: detail.into(),
        }),
    )
}

/// Build the application router.
pub fn router(state: AppStateArc) -> Router {
    Router::new()
        .route("/api/chat/start", post(start_chat))
        .route("/api/chat/message", post(send_message))
        .route("/api/chat/report", post(get_report))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn start_chat(State(state): State<AppStateArc>) -> Json<StartResponse> {
    let (session_id, message) = state.engine.start().await;
    Json(StartResponse {
        session_id,
        message,
    })
}

async fn send_message(
    State(state): State<AppStateArc>,
    Json(req): Json<MessageRequest>,
) -> Result<Json<ProcessResult>, ApiError> {
    state
        .engine
        .process_message(&req.session_id, &req.message)
        .await
        .map(Json)
        .map_err(|e| {
            warn!(session_id = %req.session_id, error = %e, "message rejected");
            not_found(e.to_string())
        })
}

async fn get_report(
    State(state): State<AppStateArc>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<IntakeReport>, ApiError> {
    match state.engine.report(&req.session_id).await {
        Ok(Some(report)) => Ok(Json(report)),
        Ok(None) | Err(IntakeError::SessionNotFound(_)) => Err(not_found(NO_REPORT_DETAIL)),
        Err(e) => Err(not_found(e.to_string())),
    }
}

async fn health(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
        sessions: state.engine.store().len().await,
    })
}

/// Serve the API on `bind` until the process is stopped.
///
/// When `idle_minutes` is non-zero a background task evicts sessions that
/// have been untouched for that long.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(engine: IntakeEngine, bind: &str, idle_minutes: u64) -> anyhow::Result<()> {
    if idle_minutes > 0 {
        spawn_eviction(&engine, idle_minutes);
    }

    let app = router(Arc::new(AppState { engine }));

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {bind}: {e}"))?;
    info!(addr = %bind, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}

fn spawn_eviction(engine: &IntakeEngine, idle_minutes: u64) {
    let store = Arc::clone(engine.store());
    let max_idle = i64::try_from(idle_minutes)
        .ok()
        .and_then(chrono::Duration::try_minutes)
        .unwrap_or_else(chrono::Duration::max_value);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(EVICTION_INTERVAL);
        loop {
            ticker.tick().await;
            let removed = store.remove_idle(max_idle).await;
            if removed > 0 {
                info!(removed, "evicted idle sessions");
            }
        }
    });
}
