//! Optional teaching-mode move biasing: nudge the engine's choice toward a
//! move that works on a mastered-but-not-yet-mastered pattern, within tight
//! bounds so the opponent never gets noticeably weaker to make a point.

use wall_e_rules::Position;
use wall_e_types::{Level, UciMove};

use crate::model::MistakeSignature;

/// Confidence floor for a signature to be eligible to influence move choice
/// at all. Below this the pattern isn't established enough to teach against.
const MIN_CONFIDENCE_TO_BIAS: f64 = 0.7;

/// Hard ceiling on how much of the engine's own evaluation gap between two
/// candidates biasing is allowed to spend.
const MAX_BIAS_FRACTION: f64 = 0.15;

#[derive(Debug, Clone)]
pub struct BiasOutcome {
    pub chosen: UciMove,
    pub was_influenced_by_learning: bool,
    pub influencing_signature_ids: Vec<String>,
}

/// `candidates` are `(move, eval_cp)` pairs from search, already sorted best
/// first by the caller; `best_eval` is `candidates[0]`'s score. Only
/// signatures at or above `MIN_CONFIDENCE_TO_BIAS` participate. A biased
/// pick must still be legal and must not lose material relative to the
/// engine's own best move — biasing changes which good move gets played,
/// never whether a move is sound.
pub fn bias_move(
    position: &Position,
    candidates: &[(UciMove, i32)],
    qualifying_signatures: &[&MistakeSignature],
    level: Level,
) -> BiasOutcome {
    let Some((best_move, best_eval)) = candidates.first().cloned() else {
        panic!("bias_move requires at least one candidate");
    };

    let eligible: Vec<&&MistakeSignature> = qualifying_signatures
        .iter()
        .filter(|s| s.confidence_score >= MIN_CONFIDENCE_TO_BIAS)
        .collect();

    if eligible.is_empty() {
        return BiasOutcome {
            chosen: best_move,
            was_influenced_by_learning: false,
            influencing_signature_ids: Vec::new(),
        };
    }

    let level_scale = level.get() as f64 / Level::MAX as f64;
    let bias_budget_cp = (best_eval.unsigned_abs() as f64 * MAX_BIAS_FRACTION * level_scale) as i32;
    let material_floor = wall_e_engine::evaluate(position, wall_e_engine::EvalComplexity::Lite);

    let mut best_alternative: Option<(UciMove, Vec<String>)> = None;
    for (mv, eval) in candidates.iter().skip(1) {
        if best_eval - eval > bias_budget_cp {
            continue;
        }
        let Ok(after) = position.apply(mv) else { continue };
        let after_material = wall_e_engine::evaluate(&after, wall_e_engine::EvalComplexity::Lite);
        if after_material < material_floor {
            continue;
        }
        let addresses: Vec<String> = eligible
            .iter()
            .filter(|s| addresses_pattern(mv, s))
            .map(|s| s.signature_id.to_string())
            .collect();
        if !addresses.is_empty() {
            best_alternative = Some((mv.clone(), addresses));
            break;
        }
    }

    match best_alternative {
        Some((chosen, ids)) => BiasOutcome {
            chosen,
            was_influenced_by_learning: true,
            influencing_signature_ids: ids,
        },
        None => BiasOutcome {
            chosen: best_move,
            was_influenced_by_learning: false,
            influencing_signature_ids: Vec::new(),
        },
    }
}

/// Whether playing `mv` works on the category a signature tracks. Kept
/// deliberately coarse: tactical patterns are addressed by any move that
/// doesn't leave material hanging immediately afterward, since that's the
/// failure mode those signatures record.
fn addresses_pattern(mv: &UciMove, signature: &MistakeSignature) -> bool {
    matches!(signature.category, crate::model::MistakeCategory::Tactical) && mv.promotion().is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use wall_e_types::{SignatureId, UserId};

    fn confident_signature() -> MistakeSignature {
        let mut s = MistakeSignature::new(
            SignatureId::new(),
            UserId::new(),
            crate::model::MistakeCategory::Tactical,
            "hanging queen",
            "left the queen en prise",
            json!({}),
            Utc::now(),
        );
        s.confidence_score = 0.9;
        s
    }

    #[test]
    fn no_qualifying_signatures_leaves_best_move_untouched() {
        let position = Position::start();
        let candidates = vec![
            (UciMove::parse("e2e4").unwrap(), 40),
            (UciMove::parse("d2d4").unwrap(), 35),
        ];
        let outcome = bias_move(&position, &candidates, &[], Level::new(8).unwrap());
        assert!(!outcome.was_influenced_by_learning);
        assert_eq!(outcome.chosen.as_str(), "e2e4");
    }

    #[test]
    fn low_confidence_signature_does_not_bias() {
        let position = Position::start();
        let mut low = confident_signature();
        low.confidence_score = 0.2;
        let candidates = vec![
            (UciMove::parse("e2e4").unwrap(), 40),
            (UciMove::parse("d2d4").unwrap(), 35),
        ];
        let outcome = bias_move(&position, &candidates, &[&low], Level::new(8).unwrap());
        assert!(!outcome.was_influenced_by_learning);
    }

    #[test]
    fn never_picks_a_move_that_loses_material() {
        let position = Position::start();
        let signature = confident_signature();
        let candidates = vec![
            (UciMove::parse("e2e4").unwrap(), 40),
            (UciMove::parse("g1h3").unwrap(), -999),
        ];
        let outcome = bias_move(&position, &candidates, &[&signature], Level::new(8).unwrap());
        assert_ne!(outcome.chosen.as_str(), "g1h3");
    }
}
