//! The browser search worker: runs one search job under a time budget,
//! checking the tactical micro-engine first so obvious mates and free
//! captures never wait on a full iterative-deepening pass.

use crate::error::EngineError;
use crate::level::config_for;
use crate::search::{iterative_deepening, SearchBudget, SearchResult};
use crate::tactical::{filter_tactically_safe_moves, get_best_tactical_move};
use instant::Instant;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wall_e_rules::Position;
use wall_e_types::{Level, Side, UciMove};

#[derive(Debug, Clone)]
pub struct SearchJob {
    pub fen: String,
    pub level: Level,
    pub time_budget_ms: u64,
    pub min_depth: Option<u32>,
    pub max_depth: Option<u32>,
}

/// Cooperative cancel flag shared between the caller and a running search.
/// Cloning shares the same underlying flag.
#[derive(Clone)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        CancellationToken::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSource {
    Tactical,
    Search,
}

#[derive(Debug, Clone)]
pub struct WorkerOutcome {
    pub mv: UciMove,
    pub depth_reached: u32,
    pub time_ms: u64,
    pub slice_count: u32,
    pub complete: bool,
    pub source: MoveSource,
    pub evaluation_cp: i32,
}

/// Run one search job to completion or budget exhaustion. A cancelled job
/// returns `EngineError::Cancelled` rather than a stale move, checked both
/// before the tactical pass and after the full search returns.
pub async fn run_job(
    job: SearchJob,
    cancel: CancellationToken,
) -> Result<WorkerOutcome, EngineError> {
    let start = Instant::now();
    let position =
        Position::from_fen(&job.fen).map_err(|e| EngineError::InvalidFen(e.to_string()))?;

    if cancel.is_cancelled() {
        return Err(EngineError::Cancelled);
    }

    let mut config = config_for(job.level);
    if let Some(min_depth) = job.min_depth {
        config.min_depth = config.min_depth.max(min_depth);
    }
    if let Some(max_depth) = job.max_depth {
        config.hard_cap = config.hard_cap.min(max_depth).max(config.min_depth);
        config.target_depth = config.target_depth.min(config.hard_cap);
    }

    if let Some(tactical_move) = get_best_tactical_move(&position) {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        return Ok(WorkerOutcome {
            mv: tactical_move,
            depth_reached: 0,
            time_ms: start.elapsed().as_millis() as u64,
            slice_count: 1,
            complete: true,
            source: MoveSource::Tactical,
            evaluation_cp: relative_material(&position),
        });
    }

    let budget = SearchBudget::new(Duration::from_millis(job.time_budget_ms), 5_000_000);
    let SearchResult {
        best_move,
        score_cp,
        depth_reached,
        complete,
        ..
    } = iterative_deepening(&position, &config, budget).await;

    if cancel.is_cancelled() {
        return Err(EngineError::Cancelled);
    }

    let mv = best_move.ok_or(EngineError::Timeout)?;

    let candidates = position.legal_moves();
    let report = filter_tactically_safe_moves(&position, &candidates);
    let mv = if report.safe.contains(&mv) {
        mv
    } else {
        // The best-scoring line from search turned out tactically unsound;
        // fall back to whatever cleared the safety filter rather than play it.
        report.safe.into_iter().next().unwrap_or(mv)
    };

    Ok(WorkerOutcome {
        mv,
        depth_reached,
        time_ms: start.elapsed().as_millis() as u64,
        slice_count: depth_reached.max(1),
        complete,
        source: MoveSource::Search,
        evaluation_cp: score_cp,
    })
}

fn relative_material(position: &Position) -> i32 {
    let white_relative = position.material_balance();
    match position.side_to_move() {
        Side::White => white_relative,
        Side::Black => -white_relative,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_a_legal_move_for_the_starting_position() {
        let job = SearchJob {
            fen: Position::start().to_fen(),
            level: Level::new(3).unwrap(),
            time_budget_ms: 200,
            min_depth: None,
            max_depth: None,
        };
        let outcome = run_job(job, CancellationToken::new()).await.unwrap();
        let position = Position::start();
        assert!(position.legal_moves().contains(&outcome.mv));
    }

    #[tokio::test]
    async fn rejects_malformed_fen_before_searching() {
        let job = SearchJob {
            fen: "not a fen".to_string(),
            level: Level::new(1).unwrap(),
            time_budget_ms: 50,
            min_depth: None,
            max_depth: None,
        };
        let result = run_job(job, CancellationToken::new()).await;
        assert!(matches!(result, Err(EngineError::InvalidFen(_))));
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits_before_search() {
        let token = CancellationToken::new();
        token.cancel();
        let job = SearchJob {
            fen: Position::start().to_fen(),
            level: Level::new(1).unwrap(),
            time_budget_ms: 200,
            min_depth: None,
            max_depth: None,
        };
        let result = run_job(job, token).await;
        assert!(matches!(result, Err(EngineError::Cancelled)));
    }
}
