//! POST /api/chess-move — the single user-facing move endpoint. Validates
//! input, enforces the worker-only invariant, forwards to the edge compute
//! worker under a wall-clock ceiling, and always records a worker call log.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use wall_e_engine::{filter_tactically_safe_moves, get_best_tactical_move};
use wall_e_rules::Position;
use wall_e_storage::{WorkerCallRecord, WorkerCallRepository};
use wall_e_types::{ErrorCode, GameId, Level, RequestId};

use crate::error::GatewayError;
use crate::headers::no_store_headers;
use crate::state::AppState;

/// Overall ceiling for a single move request, racing against the edge
/// worker's own internal hard CPU budget.
const GATEWAY_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChessMoveRequest {
    pub fen: String,
    pub pgn: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    pub cpu_level: u8,
    pub game_id: Option<GameId>,
    pub time_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveDiagnostics {
    pub depth_reached: u32,
    pub nodes: u64,
    pub engine_ms: u64,
    pub opening_book: bool,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChessMoveResponse {
    pub success: bool,
    #[serde(rename = "move")]
    pub mv: String,
    pub mode: &'static str,
    pub engine: &'static str,
    pub diagnostics: MoveDiagnostics,
    pub worker_call_log: WorkerCallLogView,
    pub request_id: RequestId,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorkerCallLogView {
    pub timestamp: chrono::DateTime<Utc>,
    pub success: bool,
    pub latency_ms: u64,
    pub error: Option<String>,
}

pub async fn chess_move(
    State(state): State<AppState>,
    Json(request): Json<ChessMoveRequest>,
) -> Result<(HeaderMap, Json<ChessMoveResponse>), GatewayError> {
    let request_id = RequestId::new();
    let started = std::time::Instant::now();

    let level = Level::new(request.cpu_level)
        .map_err(|_| GatewayError::new(ErrorCode::InvalidRequest, "cpuLevel out of range", request_id))?;

    let position = Position::from_fen(&request.fen)
        .map_err(|e| GatewayError::new(ErrorCode::InvalidFen, e.to_string(), request_id))?;

    if !state.config.worker_binding {
        persist_call_log(&state, request_id, level, false, started.elapsed(), Some("no worker binding")).await;
        return Err(GatewayError::new(
            ErrorCode::NoWorkerBinding,
            "no worker binding configured",
            request_id,
        ));
    }

    let job = wall_e_edge::EdgeRequest {
        fen: request.fen.clone(),
        pgn: request.pgn.clone(),
        cpu_level: level,
        game_id: request.game_id,
        time_ms: request.time_ms.unwrap_or(180),
    };

    let outcome = tokio::time::timeout(GATEWAY_TIMEOUT, wall_e_edge::handle(job)).await;

    let (response, log_view, error_code) = match outcome {
        Err(_) => (
            None,
            worker_log(started.elapsed(), false, Some("gateway timeout".to_string())),
            Some(ErrorCode::WorkerFetchFailed),
        ),
        Ok(Err(e)) => {
            let code = edge_error_to_code(&e);
            (None, worker_log(started.elapsed(), false, Some(e.to_string())), Some(code))
        }
        Ok(Ok(edge_response)) => (
            Some(edge_response),
            worker_log(started.elapsed(), true, None),
            None,
        ),
    };

    persist_call_log(&state, request_id, level, log_view.success, started.elapsed(), log_view.error.as_deref()).await;

    if let Some(edge_response) = response {
        if let Ok(mut tracker) = state.fallback.lock() {
            tracker.record_worker_success();
        }
        return Ok((
            no_store_headers(),
            Json(ChessMoveResponse {
                success: true,
                mv: edge_response.mv.to_string(),
                mode: "service-binding",
                engine: edge_response.engine,
                diagnostics: MoveDiagnostics {
                    depth_reached: edge_response.diagnostics.depth_reached,
                    nodes: edge_response.diagnostics.nodes,
                    engine_ms: edge_response.diagnostics.engine_ms,
                    opening_book: edge_response.diagnostics.opening_book,
                    reason: edge_response.diagnostics.reason.clone(),
                },
                worker_call_log: log_view,
                request_id,
            }),
        ));
    }

    // Invariant A: worker-only. The edge worker failed, so the only path
    // left is the explicit emergency escape hatch — and even then every use
    // is logged and subject to the sticky-fallback guard below.
    if state.config.allow_fallback_main_thread {
        if let Some(mv) = emergency_fallback_move(&position) {
            let sticky = state
                .fallback
                .lock()
                .map(|mut tracker| tracker.record_fallback(&request.fen))
                .unwrap_or(Ok(()));

            tracing::warn!(
                request_id = %request_id,
                fen = %request.fen,
                "emergency-fallback: worker unavailable, serving a main-thread tactical move",
            );

            if sticky.is_err() {
                return Err(GatewayError::new(
                    ErrorCode::StickyFallbackDetected,
                    "STICKY FALLBACK DETECTED: two consecutive fallbacks at the same position",
                    request_id,
                ));
            }

            persist_call_log(
                &state,
                request_id,
                level,
                false,
                started.elapsed(),
                Some("emergency-fallback"),
            )
            .await;

            return Ok((
                no_store_headers(),
                Json(ChessMoveResponse {
                    success: true,
                    mv: mv.to_string(),
                    mode: "emergency-fallback",
                    engine: "wall-e-fallback",
                    diagnostics: MoveDiagnostics {
                        depth_reached: 0,
                        nodes: 0,
                        engine_ms: started.elapsed().as_millis() as u64,
                        opening_book: false,
                        reason: Some("emergency-fallback".to_string()),
                    },
                    worker_call_log: WorkerCallLogView {
                        timestamp: Utc::now(),
                        success: false,
                        latency_ms: started.elapsed().as_millis() as u64,
                        error: Some("emergency-fallback".to_string()),
                    },
                    request_id,
                }),
            ));
        }
    }

    Err(GatewayError::new(
        error_code.unwrap_or(ErrorCode::WorkerFetchFailed),
        "edge compute worker did not return a move",
        request_id,
    ))
}

/// Only reachable when `ALLOW_FALLBACK_MAIN_THREAD=true`. Picks a tactically
/// safe move in-process so the game can continue; never calls out to the
/// worker it was just told is unavailable.
fn emergency_fallback_move(position: &Position) -> Option<wall_e_types::UciMove> {
    if let Some(mate) = get_best_tactical_move(position) {
        return Some(mate);
    }
    let legal = position.legal_moves();
    let report = filter_tactically_safe_moves(position, &legal);
    report.safe.into_iter().next().or_else(|| legal.into_iter().next())
}

fn worker_log(latency: Duration, success: bool, error: Option<String>) -> WorkerCallLogView {
    WorkerCallLogView {
        timestamp: Utc::now(),
        success,
        latency_ms: latency.as_millis() as u64,
        error,
    }
}

async fn persist_call_log(
    state: &AppState,
    request_id: RequestId,
    level: Level,
    success: bool,
    latency: Duration,
    error: Option<&str>,
) {
    let repo = WorkerCallRepository::new(&state.db);
    let record = WorkerCallRecord {
        request_id,
        created_at: Utc::now(),
        level,
        outcome: if success { "success".to_string() } else { "failure".to_string() },
        detail: error.unwrap_or("").to_string(),
    };
    if let Err(e) = repo.record(&record).await {
        tracing::warn!(error = %e, "failed to persist worker call log");
    }
    if let Err(e) = repo.purge_expired().await {
        tracing::warn!(error = %e, "failed to purge expired worker call log entries");
    }
}

fn edge_error_to_code(error: &wall_e_edge::EdgeError) -> ErrorCode {
    use wall_e_edge::EdgeError::*;
    match error {
        InvalidFen(_) => ErrorCode::InvalidFen,
        WorkerCpuLimit => ErrorCode::WorkerCpuLimit,
        InvalidResponse => ErrorCode::WorkerInvalidJson,
        Internal(_) => ErrorCode::WorkerReturnedError,
    }
}
