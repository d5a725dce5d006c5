//! Coaching strategy selection: given a loaded signature, decide whether
//! the right move is to reinforce, introduce, correct, celebrate, or
//! escalate, and compute how urgently it's worth bringing up at all.

use chrono::{DateTime, Utc};

use crate::model::MistakeSignature;
use crate::scoring::{decayed_mastery, MASTERY_TEACHING_CEILING};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoachingAction {
    /// Low confidence, not enough occurrences yet to commit to advice.
    Introduce,
    /// Established pattern, mastery still low: keep bringing it up.
    Reinforce,
    /// Just happened again after a period of apparent mastery.
    Correct,
    /// Mastery crossed the ceiling: acknowledge the improvement.
    Celebrate,
    /// Recurring at increasing severity despite repeated advice.
    Escalate,
}

/// Weights for the teaching opportunity score. Confidence and unmastered-ness
/// pull the score up; recency decay pulls it down as the pattern goes stale.
const CONFIDENCE_WEIGHT: f64 = 4.0;
const UNMASTERY_WEIGHT: f64 = 4.0;
const RECENCY_WEIGHT: f64 = 2.0;

/// How many most-recent games count as "recent" for recency weighting.
const RECENCY_HALF_LIFE_DAYS: f64 = 10.0;

pub fn select_action(signature: &MistakeSignature, was_recently_mastered: bool) -> CoachingAction {
    if signature.mastery_score >= MASTERY_TEACHING_CEILING {
        return CoachingAction::Celebrate;
    }
    if was_recently_mastered {
        return CoachingAction::Correct;
    }
    if signature.occurrence_count <= 1 || signature.confidence_score < 0.3 {
        return CoachingAction::Introduce;
    }
    if signature.occurrence_count >= 6 && signature.confidence_score >= 0.6 {
        return CoachingAction::Escalate;
    }
    CoachingAction::Reinforce
}

/// A bounded [0, 10] score ranking how worth bringing up a signature is
/// right now, combining confidence, how far from mastered it is, and how
/// recently it last came up. Mastered-above-ceiling patterns score zero —
/// they're excluded from active teaching regardless of confidence.
pub fn teaching_opportunity_score(signature: &MistakeSignature, now: DateTime<Utc>) -> f64 {
    let mastery_now = decayed_mastery(signature.mastery_score, signature.last_occurrence_time, now);
    if mastery_now >= MASTERY_TEACHING_CEILING {
        return 0.0;
    }
    let unmastery = 1.0 - mastery_now;
    let days_since = (now - signature.last_occurrence_time).num_seconds().max(0) as f64 / 86_400.0;
    let recency = 0.5_f64.powf(days_since / RECENCY_HALF_LIFE_DAYS);

    let raw = CONFIDENCE_WEIGHT * signature.confidence_score
        + UNMASTERY_WEIGHT * unmastery
        + RECENCY_WEIGHT * recency;
    raw.clamp(0.0, 10.0)
}

/// Pick up to 3 signatures to consider for this response, ranked by
/// opportunity score, with a rotation rule: don't repeat the same focus as
/// `previous_focus` two responses running unless its score dominates by a
/// wide enough margin that severity effectively demands it.
pub fn rank_for_response<'a>(
    candidates: &'a [MistakeSignature],
    previous_focus: Option<&str>,
    now: DateTime<Utc>,
) -> Vec<&'a MistakeSignature> {
    const TOP_N: usize = 3;
    const REPEAT_OVERRIDE_MARGIN: f64 = 2.0;

    let mut scored: Vec<(&MistakeSignature, f64)> = candidates
        .iter()
        .map(|s| (s, teaching_opportunity_score(s, now)))
        .filter(|(_, score)| *score > 0.0)
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    if let (Some(focus), Some((top, top_score))) = (previous_focus, scored.first().copied()) {
        if top.title == focus {
            let runner_up_score = scored.get(1).map(|(_, s)| *s).unwrap_or(0.0);
            if top_score - runner_up_score < REPEAT_OVERRIDE_MARGIN && scored.len() > 1 {
                scored.remove(0);
            }
        }
    }

    scored.into_iter().take(TOP_N).map(|(s, _)| s).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wall_e_types::{SignatureId, UserId};

    fn sample(occurrence_count: u32, confidence: f64, mastery: f64, now: DateTime<Utc>) -> MistakeSignature {
        let mut signature = MistakeSignature::new(
            SignatureId::new(),
            UserId::new(),
            crate::model::MistakeCategory::Tactical,
            "hanging queen",
            "left the queen en prise",
            json!({}),
            now,
        );
        signature.occurrence_count = occurrence_count;
        signature.confidence_score = confidence;
        signature.mastery_score = mastery;
        signature
    }

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn fresh_low_confidence_signature_is_introduced() {
        let signature = sample(1, 0.1, 0.0, now());
        assert_eq!(select_action(&signature, false), CoachingAction::Introduce);
    }

    #[test]
    fn mastered_signature_is_celebrated() {
        let signature = sample(10, 0.8, 0.9, now());
        assert_eq!(select_action(&signature, false), CoachingAction::Celebrate);
    }

    #[test]
    fn recurrence_after_mastery_is_a_correction() {
        let signature = sample(3, 0.5, 0.3, now());
        assert_eq!(select_action(&signature, true), CoachingAction::Correct);
    }

    #[test]
    fn frequent_confident_unresolved_pattern_escalates() {
        let signature = sample(8, 0.7, 0.2, now());
        assert_eq!(select_action(&signature, false), CoachingAction::Escalate);
    }

    #[test]
    fn mastered_pattern_scores_zero_opportunity() {
        let signature = sample(20, 0.9, 0.9, now());
        assert_eq!(teaching_opportunity_score(&signature, now()), 0.0);
    }

    #[test]
    fn unmastered_confident_pattern_scores_above_zero() {
        let signature = sample(10, 0.7, 0.1, now());
        assert!(teaching_opportunity_score(&signature, now()) > 0.0);
    }
}
