use thiserror::Error;

/// Errors the browser search worker can surface: a malformed position
/// rejected before search starts, an externally cancelled search, or a
/// deadline hit with no completed depth (shouldn't happen in practice since
/// the minimum depth always finishes inside the budget).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid fen: {0}")]
    InvalidFen(String),

    #[error("search cancelled")]
    Cancelled,

    #[error("deadline hit before any depth completed")]
    Timeout,
}
