//! Read-only admin observability: worker health, recent worker call logs,
//! learning feature flags and table counts, and the recent learning event
//! log. Every route in this module sits behind the shared admin bearer.

use axum::extract::{Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::Row;

use crate::headers::no_store_headers;
use crate::state::AppState;

/// Rejects any request to an admin route that doesn't carry
/// `Authorization: Bearer <ADMIN_PASSWORD>`. If no password is configured
/// the admin surface is refused entirely rather than left open.
pub async fn require_admin_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.config.admin_password.as_deref() else {
        return (StatusCode::SERVICE_UNAVAILABLE, "admin surface not configured").into_response();
    };
    let presented = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if presented != Some(expected) {
        return (StatusCode::UNAUTHORIZED, "invalid or missing admin bearer token").into_response();
    }
    next.run(request).await
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkerHealthResponse {
    success: bool,
    db_status: &'static str,
    worker_binding_configured: bool,
    consecutive_fallbacks: u32,
}

pub async fn worker_health(State(state): State<AppState>) -> (HeaderMap, Json<WorkerHealthResponse>) {
    let db_status = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => "ok",
        Err(_) => "unavailable",
    };
    let consecutive_fallbacks = state
        .fallback
        .lock()
        .map(|tracker| tracker.consecutive_fallbacks())
        .unwrap_or(0);

    (
        no_store_headers(),
        Json(WorkerHealthResponse {
            success: true,
            db_status,
            worker_binding_configured: state.config.worker_binding,
            consecutive_fallbacks,
        }),
    )
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    #[serde(default = "default_call_limit")]
    pub limit: i64,
}

fn default_call_limit() -> i64 {
    50
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkerCallView {
    request_id: String,
    created_at: chrono::DateTime<chrono::Utc>,
    outcome: String,
    detail: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkerCallsResponse {
    success: bool,
    calls: Vec<WorkerCallView>,
}

pub async fn worker_calls(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<(HeaderMap, Json<WorkerCallsResponse>), crate::error::GatewayError> {
    let repo = wall_e_storage::WorkerCallRepository::new(&state.db);
    let rows = repo
        .recent(query.limit)
        .await
        .map_err(|e| crate::error::GatewayError::new(
            wall_e_types::ErrorCode::DatabaseUnavailable,
            e.to_string(),
            wall_e_types::RequestId::new(),
        ))?;

    let calls = rows
        .into_iter()
        .map(|(request_id, created_at, outcome, detail)| WorkerCallView {
            request_id: request_id.to_string(),
            created_at,
            outcome,
            detail,
        })
        .collect();

    Ok((no_store_headers(), Json(WorkerCallsResponse { success: true, calls })))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LearningHealthResponse {
    success: bool,
    enabled: bool,
    readonly: bool,
    shadow_mode: bool,
    canary_percentage: u8,
    signature_count: i64,
    training_game_count: i64,
    event_count: i64,
    status: &'static str,
}

pub async fn learning_health(State(state): State<AppState>) -> (HeaderMap, Json<LearningHealthResponse>) {
    let signature_count = count_rows(&state, "mistake_signatures").await;
    let training_game_count = count_rows(&state, "training_games").await;
    let event_count = count_rows(&state, "learning_events").await;

    (
        no_store_headers(),
        Json(LearningHealthResponse {
            success: true,
            enabled: state.config.stockfish_game_analysis_enabled,
            readonly: false,
            shadow_mode: false,
            canary_percentage: state.config.canary_percentage,
            signature_count,
            training_game_count,
            event_count,
            status: "ok",
        }),
    )
}

async fn count_rows(state: &AppState, table: &str) -> i64 {
    let query = format!("SELECT COUNT(*) AS n FROM {table}");
    sqlx::query(&query)
        .fetch_one(&state.db)
        .await
        .map(|row| row.get::<i64, _>("n"))
        .unwrap_or(0)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LearningEventView {
    timestamp: chrono::DateTime<chrono::Utc>,
    user_id: String,
    event_type: String,
    partial: bool,
    concepts_updated: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LearningRecentResponse {
    success: bool,
    events: Vec<LearningEventView>,
}

pub async fn learning_recent(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<(HeaderMap, Json<LearningRecentResponse>), crate::error::GatewayError> {
    let events = wall_e_storage::EventRepository::new(&state.db)
        .recent(query.limit)
        .await
        .map_err(|e| crate::error::GatewayError::new(
            wall_e_types::ErrorCode::DatabaseUnavailable,
            e.to_string(),
            wall_e_types::RequestId::new(),
        ))?
        .into_iter()
        .map(|event| LearningEventView {
            timestamp: event.timestamp,
            user_id: event.user_id.to_string(),
            event_type: format!("{:?}", event.event_type),
            partial: event.payload.partial,
            concepts_updated: event.payload.concepts_updated,
        })
        .collect();

    Ok((no_store_headers(), Json(LearningRecentResponse { success: true, events })))
}
