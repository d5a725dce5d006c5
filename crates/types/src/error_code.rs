use serde::{Deserialize, Serialize};

/// The complete error taxonomy, kept as one enum so every crate maps into
/// the same wire vocabulary rather than inventing its own strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // User-input (4xx)
    InvalidRequest,
    InvalidFen,
    Legality,

    // Turn-integrity
    OffTurn,
    WrongColor,
    GameNotPlaying,

    // Worker (5xx, retryable)
    WorkerTimeout,
    WorkerCpuLimit,
    WorkerFetchFailed,
    WorkerErrorStatus,
    WorkerInvalidJson,
    WorkerReturnedError,
    NetworkError,
    InvalidResponse,

    // Architectural (fatal to request)
    NoWorkerBinding,
    StickyFallbackDetected,

    // Persistence (degraded)
    DatabaseUnavailable,

    // Coaching-side integrity signal, not a hard failure
    InsufficientHistory,
}

impl ErrorCode {
    /// The HTTP status this error code maps to at the gateway boundary.
    pub fn status_code(self) -> u16 {
        use ErrorCode::*;
        match self {
            InvalidRequest | InvalidFen | Legality => 400,
            OffTurn | WrongColor | GameNotPlaying => 409,
            WorkerTimeout | WorkerCpuLimit | WorkerFetchFailed | WorkerErrorStatus
            | WorkerInvalidJson | WorkerReturnedError | NetworkError | InvalidResponse => 502,
            NoWorkerBinding => 503,
            StickyFallbackDetected => 500,
            DatabaseUnavailable => 503,
            InsufficientHistory => 200,
        }
    }

    /// Whether the CPU orchestrator's retry policy (at most two retries)
    /// applies to this error.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorCode::WorkerTimeout
                | ErrorCode::WorkerFetchFailed
                | ErrorCode::NetworkError
                | ErrorCode::InvalidResponse
        )
    }
}
