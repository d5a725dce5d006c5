//! Ingestion pipeline: walks a finished game's move list, detects key
//! moments with the tactical micro-engine, and upserts mistake signatures.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use thiserror::Error;
use wall_e_engine::{evaluate, hanging_pieces, mate_in_1_for_them, EvalComplexity};
use wall_e_rules::{Game, Position};
use wall_e_types::{GameId, Side, TrainingGameId, UciMove, UserId};

use crate::model::{
    DecisionContext, FeatureFlags, GamePhase, KingSafety, LearningEvent, LearningEventPayload,
    LearningEventType, MistakeCategory, MistakeSignature, PositionType, TrainingGame,
};
use crate::signature::signature_key;

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("game {0} already recorded for this user")]
    AlreadyIngested(GameId),
}

/// One ingested step: the signature it touched (new or existing key) plus
/// the context and FEN it occurred in, ready for the caller to upsert.
#[derive(Debug, Clone)]
pub struct KeyMoment {
    pub signature_key: String,
    pub category: MistakeCategory,
    pub title: String,
    pub description: String,
    pub pattern_details: Value,
    pub fen: String,
    pub context: DecisionContext,
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Minor,
    Moderate,
    Severe,
}

/// Centipawn swing, from the mover's perspective, below which a move is
/// treated as a blunder worth a key moment rather than noise.
const BLUNDER_THRESHOLD_CP: i32 = 200;
const MODERATE_THRESHOLD_CP: i32 = 400;

/// Result of a full ingestion pass over one game.
#[derive(Debug)]
pub struct IngestionOutcome {
    pub key_moments: Vec<KeyMoment>,
    pub training_game: TrainingGame,
    pub event: LearningEvent,
}

/// Walk `game`'s move list move-by-move, classifying each as a key moment or
/// not. Runs even under `flags.readonly`/`flags.shadow` — those only affect
/// whether the caller persists the resulting signature upserts, not whether
/// this function computes them, so the returned event can honestly say what
/// would have happened.
pub fn ingest_game(
    user_id: UserId,
    game_id: Option<GameId>,
    training_game_id: TrainingGameId,
    game_index: u32,
    game: &Game,
    flags: FeatureFlags,
    now: DateTime<Utc>,
) -> IngestionOutcome {
    let mut key_moments = Vec::new();
    let mut position = Position::start();
    let max_ply = flags.max_ply as usize;

    for mv in game.moves().iter().take(max_ply) {
        if let Some(moment) = classify_move(&position, mv, now) {
            key_moments.push(moment);
        }
        position = match position.apply(mv) {
            Ok(next) => next,
            Err(_) => break,
        };
    }

    let blunders = key_moments
        .iter()
        .filter(|m| m.severity >= Severity::Moderate)
        .count() as u32;

    let analysis = json!({
        "key_moments": key_moments.len(),
        "blunders": blunders,
    });
    let metrics = json!({
        "ply_analyzed": game.moves().len().min(max_ply),
        "result": format!("{:?}", game.result()),
    });

    let training_game = TrainingGame {
        training_game_id,
        user_id,
        game_id,
        game_index,
        timestamp: now,
        pgn: game.to_pgn(),
        analysis,
        metrics,
    };

    let concepts_updated: Vec<String> = key_moments
        .iter()
        .map(|m| m.title.clone())
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();

    let event = LearningEvent {
        timestamp: now,
        user_id,
        event_type: LearningEventType::GameIngested,
        payload: LearningEventPayload {
            game_id,
            blunders: Some(blunders),
            accuracy: None,
            concepts_updated,
            partial: flags.readonly || flags.shadow,
            error_code: None,
            flags,
        },
    };

    IngestionOutcome {
        key_moments,
        training_game,
        event,
    }
}

fn classify_move(before: &Position, mv: &UciMove, now: DateTime<Utc>) -> Option<KeyMoment> {
    let side = before.side_to_move();
    let after = before.apply(mv).ok()?;

    if mate_in_1_for_them(&after) {
        let context = decision_context(before, side);
        return Some(KeyMoment {
            signature_key: signature_key(
                MistakeCategory::Tactical,
                "walked into forced mate",
                &json!({"kind": "allowed_forced_mate"}),
            ),
            category: MistakeCategory::Tactical,
            title: "walked into forced mate".to_string(),
            description: "every reply left the opponent with a forced mate next move".to_string(),
            pattern_details: json!({"kind": "allowed_forced_mate", "fen": before.to_fen()}),
            fen: before.to_fen(),
            context,
            severity: Severity::Severe,
        });
    }

    let swing = relative_swing(before, &after, side);
    if swing <= -MODERATE_THRESHOLD_CP {
        let left_hanging = !hanging_pieces(&after).is_empty();
        let context = decision_context(before, side);
        let (title, details) = if left_hanging {
            (
                "left a piece hanging",
                json!({"kind": "hanging_piece", "swing_cp": swing}),
            )
        } else {
            (
                "material-losing move",
                json!({"kind": "material_loss", "swing_cp": swing}),
            )
        };
        return Some(KeyMoment {
            signature_key: signature_key(MistakeCategory::Tactical, title, &details),
            category: MistakeCategory::Tactical,
            title: title.to_string(),
            description: format!("gave up roughly {} centipawns", -swing),
            pattern_details: details,
            fen: before.to_fen(),
            context,
            severity: Severity::Severe,
        });
    }
    if swing <= -BLUNDER_THRESHOLD_CP {
        let context = decision_context(before, side);
        let details = json!({"kind": "inaccuracy", "swing_cp": swing});
        return Some(KeyMoment {
            signature_key: signature_key(MistakeCategory::Positional, "inaccuracy", &details),
            category: MistakeCategory::Positional,
            title: "inaccuracy".to_string(),
            description: format!("gave up roughly {} centipawns", -swing),
            pattern_details: details,
            fen: before.to_fen(),
            context,
            severity: Severity::Moderate,
        });
    }

    None
}

/// Static-eval swing from `side`'s perspective between `before` and `after`,
/// using the full evaluation (mobility included) so a quiet positional slip
/// can register even without a material change.
fn relative_swing(before: &Position, after: &Position, side: Side) -> i32 {
    let before_eval = evaluate(before, EvalComplexity::Full);
    let after_eval = evaluate(after, EvalComplexity::Full);
    let sign = match side {
        Side::White => 1,
        Side::Black => -1,
    };
    sign * (after_eval - before_eval)
}

fn decision_context(position: &Position, side: Side) -> DecisionContext {
    let material = position.material_balance();
    let signed_material = match side {
        Side::White => material,
        Side::Black => -material,
    };
    let legal = position.legal_moves().len();
    DecisionContext {
        game_phase: game_phase(position),
        position_type: if legal > 35 {
            PositionType::Open
        } else if position.is_check() {
            PositionType::Tactical
        } else if legal < 20 {
            PositionType::Closed
        } else {
            PositionType::Quiet
        },
        king_safety: if position.is_check() {
            KingSafety::Critical
        } else if legal < 10 {
            KingSafety::Exposed
        } else {
            KingSafety::Safe
        },
        material_balance: signed_material,
    }
}

fn game_phase(position: &Position) -> GamePhase {
    let placement = position.to_fen();
    let piece_count = placement
        .split(' ')
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .count();
    if piece_count >= 28 {
        GamePhase::Opening
    } else if piece_count >= 14 {
        GamePhase::Middlegame
    } else {
        GamePhase::Endgame
    }
}

/// Apply the upsert side effects of a single `KeyMoment` onto whatever
/// signature row the caller already loaded for `key.signature_key` (or a
/// freshly constructed one), returning the updated row.
pub fn apply_key_moment(mut signature: MistakeSignature, key: &KeyMoment, now: DateTime<Utc>) -> MistakeSignature {
    signature.record_occurrence(key.fen.clone(), now, key.context.clone());
    signature.confidence_score = crate::scoring::update_confidence(signature.confidence_score, signature.occurrence_count);
    signature
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn fools_mate_produces_a_forced_mate_key_moment() {
        let mut game = Game::new();
        for mv in ["f2f3", "e7e5", "g2g4"] {
            game.make_move(UciMove::parse(mv).unwrap()).unwrap();
        }
        let flags = FeatureFlags::default();
        let outcome = ingest_game(UserId::new(), None, TrainingGameId::new(), 1, &game, flags, now());
        assert!(outcome
            .key_moments
            .iter()
            .any(|m| m.title == "walked into forced mate"));
    }

    #[test]
    fn quiet_opening_produces_no_key_moments() {
        let mut game = Game::new();
        for mv in ["e2e4", "e7e5", "g1f3", "b8c6"] {
            game.make_move(UciMove::parse(mv).unwrap()).unwrap();
        }
        let flags = FeatureFlags::default();
        let outcome = ingest_game(UserId::new(), None, TrainingGameId::new(), 1, &game, flags, now());
        assert!(outcome.key_moments.is_empty());
    }

    #[test]
    fn readonly_ingestion_still_analyzes_but_marks_the_event_partial() {
        let game = Game::new();
        let mut flags = FeatureFlags::default();
        flags.readonly = true;
        let outcome = ingest_game(UserId::new(), None, TrainingGameId::new(), 1, &game, flags, now());
        assert!(outcome.event.payload.partial);
    }

    #[test]
    fn max_ply_bounds_how_much_of_the_game_is_analyzed() {
        let mut game = Game::new();
        for mv in ["f2f3", "e7e5", "g2g4"] {
            game.make_move(UciMove::parse(mv).unwrap()).unwrap();
        }
        let mut flags = FeatureFlags::default();
        flags.max_ply = 1;
        let outcome = ingest_game(UserId::new(), None, TrainingGameId::new(), 1, &game, flags, now());
        assert!(outcome.key_moments.is_empty());
    }
}
