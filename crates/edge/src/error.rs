use thiserror::Error;

/// Failure modes the edge compute worker can report back through the CPU
/// gateway. Every variant here is meant to be handled by the orchestrator's
/// retry/fallback policy, not surfaced raw to a player.
#[derive(Debug, Error)]
pub enum EdgeError {
    #[error("fen rejected before search: {0}")]
    InvalidFen(String),

    #[error("search exceeded the edge worker's hard CPU budget")]
    WorkerCpuLimit,

    #[error("edge worker produced a move outside the legal move set")]
    InvalidResponse,

    #[error("internal edge worker error: {0}")]
    Internal(String),
}
