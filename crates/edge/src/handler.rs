//! The edge compute worker's single entry point: given a position and a
//! level, return one move inside a hard CPU budget. Levels 3-6 route here
//! from the CPU gateway; this never runs the full browser-search depth.

use crate::error::EdgeError;
use crate::opening_book;
use std::time::Duration;
use tracing::{info, warn};
use wall_e_engine::{run_job, CancellationToken, MoveSource, SearchJob};
use wall_e_rules::Position;
use wall_e_types::{GameId, Level, UciMove};

/// Hard wall-clock ceiling the edge worker enforces regardless of what the
/// caller asked for. Mirrors the tight CPU budget a real edge isolate would
/// be metered under.
const HARD_CPU_BUDGET: Duration = Duration::from_millis(180);

#[derive(Debug, Clone)]
pub struct EdgeRequest {
    pub fen: String,
    pub pgn: Option<String>,
    pub cpu_level: Level,
    pub game_id: Option<GameId>,
    pub time_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeMode {
    OpeningBook,
    Tactical,
    Search,
}

#[derive(Debug, Clone)]
pub struct EdgeDiagnostics {
    pub depth_reached: u32,
    pub nodes: u64,
    pub engine_ms: u64,
    pub opening_book: bool,
    pub mode: EdgeMode,
    pub reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EdgeResponse {
    pub success: bool,
    pub mv: UciMove,
    pub engine: &'static str,
    pub diagnostics: EdgeDiagnostics,
    pub source: &'static str,
}

/// Handle one edge move request. The requested `time_ms` is clamped to
/// `HARD_CPU_BUDGET` — the worker never runs longer than its own budget
/// just because a caller asked for more.
pub async fn handle(request: EdgeRequest) -> Result<EdgeResponse, EdgeError> {
    let position =
        Position::from_fen(&request.fen).map_err(|e| EdgeError::InvalidFen(e.to_string()))?;

    if let Some((mv, line)) = opening_book::lookup(&position) {
        info!(line, "edge worker served an opening book move");
        return Ok(EdgeResponse {
            success: true,
            mv,
            engine: "wall-e-edge",
            diagnostics: EdgeDiagnostics {
                depth_reached: 0,
                nodes: 0,
                engine_ms: 0,
                opening_book: true,
                mode: EdgeMode::OpeningBook,
                reason: Some(line.to_string()),
            },
            source: "edge",
        });
    }

    let time_budget_ms = request.time_ms.min(HARD_CPU_BUDGET.as_millis() as u64);
    let job = SearchJob {
        fen: request.fen.clone(),
        level: request.cpu_level,
        time_budget_ms,
        min_depth: None,
        max_depth: Some(2),
    };

    let outcome = tokio::time::timeout(HARD_CPU_BUDGET, run_job(job, CancellationToken::new()))
        .await
        .map_err(|_| EdgeError::WorkerCpuLimit)?
        .map_err(|e| match e {
            wall_e_engine::EngineError::InvalidFen(reason) => EdgeError::InvalidFen(reason),
            wall_e_engine::EngineError::Cancelled => EdgeError::Internal("search cancelled".into()),
            wall_e_engine::EngineError::Timeout => EdgeError::WorkerCpuLimit,
        })?;

    if !position.legal_moves().contains(&outcome.mv) {
        warn!(mv = %outcome.mv, "edge worker produced an illegal move, rejecting");
        return Err(EdgeError::InvalidResponse);
    }

    let mode = match outcome.source {
        MoveSource::Tactical => EdgeMode::Tactical,
        MoveSource::Search => EdgeMode::Search,
    };

    Ok(EdgeResponse {
        success: true,
        mv: outcome.mv,
        engine: "wall-e-edge",
        diagnostics: EdgeDiagnostics {
            depth_reached: outcome.depth_reached,
            nodes: 0,
            engine_ms: outcome.time_ms,
            opening_book: false,
            mode,
            reason: None,
        },
        source: "edge",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn starting_position_gets_a_book_move() {
        let request = EdgeRequest {
            fen: Position::start().to_fen(),
            pgn: None,
            cpu_level: Level::new(4).unwrap(),
            game_id: None,
            time_ms: 500,
        };
        let response = handle(request).await.unwrap();
        assert!(response.diagnostics.opening_book);
        assert_eq!(response.mv.as_str(), "e2e4");
    }

    #[tokio::test]
    async fn malformed_fen_is_rejected_before_search() {
        let request = EdgeRequest {
            fen: "garbage".to_string(),
            pgn: None,
            cpu_level: Level::new(4).unwrap(),
            game_id: None,
            time_ms: 500,
        };
        let result = handle(request).await;
        assert!(matches!(result, Err(EdgeError::InvalidFen(_))));
    }

    #[tokio::test]
    async fn off_book_position_falls_through_to_search() {
        let mut position = Position::start();
        for mv in ["e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "a7a6"] {
            position = position.apply_uci_str(mv).unwrap();
        }
        let request = EdgeRequest {
            fen: position.to_fen(),
            pgn: None,
            cpu_level: Level::new(5).unwrap(),
            game_id: None,
            time_ms: 500,
        };
        let response = handle(request).await.unwrap();
        assert!(!response.diagnostics.opening_book);
        assert!(position.legal_moves().contains(&response.mv));
    }
}
