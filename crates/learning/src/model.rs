//! The persistent learning data model: mistake signatures, training games,
//! coaching memory, learning metrics, the aggregate learner profile, and the
//! append-only learning event log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wall_e_types::{GameId, SignatureId, TrainingGameId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MistakeCategory {
    Tactical,
    Positional,
    Opening,
    Endgame,
    Psychological,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Opening,
    Middlegame,
    Endgame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionType {
    Open,
    Closed,
    Tactical,
    Quiet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KingSafety {
    Safe,
    Caution,
    Exposed,
    Critical,
}

/// Derived per-position context a mistake was made in, used both to enrich
/// a signature and to decide whether a later position would have triggered it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionContext {
    pub game_phase: GamePhase,
    pub position_type: PositionType,
    pub king_safety: KingSafety,
    pub material_balance: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MistakeSignature {
    pub signature_id: SignatureId,
    pub user_id: UserId,
    pub category: MistakeCategory,
    pub title: String,
    pub description: String,
    pub pattern_details: Value,
    pub occurrence_count: u32,
    pub last_occurrence_time: DateTime<Utc>,
    pub example_fens: Vec<String>,
    pub related_concepts: Vec<String>,
    pub confidence_score: f64,
    pub mastery_score: f64,
    pub typical_decision_contexts: Vec<DecisionContext>,
}

/// Bound on `example_fens`: the ingestion pipeline keeps only the most
/// recent occurrences.
pub const MAX_EXAMPLE_FENS: usize = 5;

impl MistakeSignature {
    pub fn new(
        signature_id: SignatureId,
        user_id: UserId,
        category: MistakeCategory,
        title: impl Into<String>,
        description: impl Into<String>,
        pattern_details: Value,
        now: DateTime<Utc>,
    ) -> Self {
        MistakeSignature {
            signature_id,
            user_id,
            category,
            title: title.into(),
            description: description.into(),
            pattern_details,
            occurrence_count: 0,
            last_occurrence_time: now,
            example_fens: Vec::new(),
            related_concepts: Vec::new(),
            confidence_score: 0.0,
            mastery_score: 0.0,
            typical_decision_contexts: Vec::new(),
        }
    }

    /// Record one more occurrence, bumping the count and pushing the FEN
    /// into the bounded example list (oldest dropped first).
    pub fn record_occurrence(&mut self, fen: String, at: DateTime<Utc>, context: DecisionContext) {
        self.occurrence_count += 1;
        self.last_occurrence_time = at;
        self.example_fens.push(fen);
        if self.example_fens.len() > MAX_EXAMPLE_FENS {
            self.example_fens.remove(0);
        }
        self.typical_decision_contexts.push(context);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingGame {
    pub training_game_id: TrainingGameId,
    pub user_id: UserId,
    pub game_id: Option<GameId>,
    pub game_index: u32,
    pub timestamp: DateTime<Utc>,
    pub pgn: String,
    pub analysis: Value,
    pub metrics: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdviceRecord {
    pub pattern_key: String,
    pub advice: String,
    pub timestamp: DateTime<Utc>,
    pub times_repeated: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CoachingMemory {
    pub advice_issued: Vec<AdviceRecord>,
    pub advice_followed_count: u32,
    pub advice_ignored_count: u32,
    pub successful_interventions: u32,
    pub recent_takeaways: Vec<String>,
    pub accuracy_trend: Vec<f64>,
}

impl CoachingMemory {
    pub fn follow_through_rate(&self) -> f64 {
        let total = self.advice_followed_count + self.advice_ignored_count;
        if total == 0 {
            0.0
        } else {
            self.advice_followed_count as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningMetric {
    pub user_id: UserId,
    pub session_start: DateTime<Utc>,
    pub session_end: DateTime<Utc>,
    pub game_count: u32,
    pub mistakes_identified: u32,
    pub mistakes_corrected: u32,
    pub total_moves: u32,
    pub insights: Vec<String>,
    pub progress: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LearnerProfile {
    pub games_played: u32,
    pub tactical_rating: f64,
    pub positional_rating: f64,
    pub endgame_rating: f64,
    pub opening_rating: f64,
    pub improvement_rate: f64,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub play_style: String,
    pub milestones: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningEventType {
    GameIngested,
    SignatureUpdated,
    AdviceIssued,
    AdviceOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureFlags {
    pub enabled: bool,
    pub shadow: bool,
    pub readonly: bool,
    pub is_async: bool,
    pub max_ply: u32,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        FeatureFlags {
            enabled: true,
            shadow: false,
            readonly: false,
            is_async: true,
            max_ply: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningEventPayload {
    pub game_id: Option<GameId>,
    pub blunders: Option<u32>,
    pub accuracy: Option<f64>,
    pub concepts_updated: Vec<String>,
    pub partial: bool,
    pub error_code: Option<String>,
    pub flags: FeatureFlags,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningEvent {
    pub timestamp: DateTime<Utc>,
    pub user_id: UserId,
    pub event_type: LearningEventType,
    pub payload: LearningEventPayload,
}
