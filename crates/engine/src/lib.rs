//! Tactical micro-engine and browser search worker: the in-process move
//! generator behind the lowest CPU tiers, and the search core the edge
//! compute worker and gateway fall back through at higher ones.

mod error;
mod evaluation;
mod level;
mod search;
mod tactical;
mod worker;

pub use error::EngineError;
pub use evaluation::evaluate;
pub use level::{config_for, EvalComplexity, LevelConfig, TacticalScan, LEVEL_CONFIGS};
pub use search::{iterative_deepening, SearchBudget, SearchResult};
pub use tactical::{
    filter_tactically_safe_moves, forcing_moves, get_best_tactical_move, hanging_pieces,
    mate_in_1_for_them, mate_in_1_for_us, RejectedMove, SafetyReport,
};
pub use worker::{run_job, CancellationToken, MoveSource, SearchJob, WorkerOutcome};
