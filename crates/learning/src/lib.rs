//! Mistake ingestion, confidence/mastery scoring, coaching strategy
//! selection, advice composition, optional move biasing, and progression
//! reporting for the adaptive coach.

mod advice;
mod biasing;
mod ingestion;
mod model;
mod progression;
mod scoring;
mod signature;
mod strategy;

pub use advice::{compose, insufficient_history, AdviceResponse, HistoryEvidence, PersonalizedReference};
pub use biasing::{bias_move, BiasOutcome};
pub use ingestion::{apply_key_moment, ingest_game, IngestionError, IngestionOutcome, KeyMoment, Severity};
pub use model::{
    AdviceRecord, CoachingMemory, DecisionContext, FeatureFlags, GamePhase, KingSafety,
    LearnerProfile, LearningEvent, LearningEventPayload, LearningEventType, LearningMetric,
    MistakeCategory, MistakeSignature, PositionType, TrainingGame, MAX_EXAMPLE_FENS,
};
pub use progression::{build_report, data_quality_for, ConceptStability, DataQuality, ProgressionReport};
pub use scoring::{
    classify_trend, decayed_mastery, raw_confidence, record_avoidance, update_confidence, Trend,
    MASTERY_TEACHING_CEILING,
};
pub use signature::signature_key;
pub use strategy::{rank_for_response, select_action, teaching_opportunity_score, CoachingAction};
