//! CPU orchestrator support: tier selection, the move guard, the turn
//! integrity validator, the retry policy, and the architectural invariants
//! (worker-only, single-move fallback, no strength degradation) that per-move
//! telemetry is checked against.

mod game_store;
mod guard;
mod invariants;
mod orchestrator;
mod record;
mod retry;
mod turn_validator;

pub use game_store::{ChatMessage, GameStore};
pub use guard::MoveGuard;
pub use invariants::{
    check_no_strength_degradation, is_worker_error_taxonomy, FallbackTracker,
    StickyFallbackDetected,
};
pub use orchestrator::{tier_for_level, Tier};
pub use record::{CpuTelemetryRecord, MoveSource};
pub use retry::{with_retry, MAX_RETRIES};
pub use turn_validator::{TurnState, TurnValidator};
