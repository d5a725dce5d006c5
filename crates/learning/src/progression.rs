//! Progression and signals reporting: the aggregate numbers a profile view
//! reads, derived from the signature set and coaching memory rather than
//! stored redundantly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{CoachingMemory, MistakeSignature};
use crate::scoring::{classify_trend, decayed_mastery, Trend};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataQuality {
    Insufficient,
    Limited,
    Sufficient,
    Excellent,
}

/// Below this many recorded games, progression reporting refuses to run at
/// all — there isn't enough signal to say anything honest.
const MIN_GAMES_FOR_REPORTING: u32 = 3;
const LIMITED_GAMES_CEILING: u32 = 10;
const EXCELLENT_GAMES_FLOOR: u32 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptStability {
    pub title: String,
    pub mastery: f64,
    pub trend: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionReport {
    pub data_quality: DataQuality,
    pub mistake_recurrence_rate: f64,
    pub advice_follow_through_rate: f64,
    pub improvement_velocity: f64,
    pub regression_risk_score: f64,
    pub concept_stability_scores: Vec<ConceptStability>,
    /// Occurrence-weighted mean of every signature's `confidence_score`.
    /// Monotone non-decreasing across remediation (spec §8 P5): each
    /// signature's own confidence only ever rises with N, and weighting by
    /// occurrence count means a signature can't lower the aggregate just by
    /// existing with low confidence at a small weight.
    pub confidence_score: f64,
}

pub fn data_quality_for(games_played: u32) -> DataQuality {
    if games_played < MIN_GAMES_FOR_REPORTING {
        DataQuality::Insufficient
    } else if games_played < LIMITED_GAMES_CEILING {
        DataQuality::Limited
    } else if games_played < EXCELLENT_GAMES_FLOOR {
        DataQuality::Sufficient
    } else {
        DataQuality::Excellent
    }
}

/// `None` when `data_quality_for(games_played)` is `Insufficient` — callers
/// must check that gate before trusting any number in the report.
pub fn build_report(
    signatures: &[MistakeSignature],
    memory: &CoachingMemory,
    games_played: u32,
    recent_games: u32,
    now: DateTime<Utc>,
) -> Option<ProgressionReport> {
    let data_quality = data_quality_for(games_played);
    if data_quality == DataQuality::Insufficient {
        return None;
    }

    let total_occurrences: u32 = signatures.iter().map(|s| s.occurrence_count).sum();
    let mistake_recurrence_rate = if games_played == 0 {
        0.0
    } else {
        total_occurrences as f64 / games_played as f64
    };

    let advice_follow_through_rate = memory.follow_through_rate();

    let improvement_velocity = average_accuracy_delta(&memory.accuracy_trend);

    let regression_risk_score = compute_regression_risk(signatures, now);

    let concept_stability_scores = signatures
        .iter()
        .map(|s| {
            let mastery_now = decayed_mastery(s.mastery_score, s.last_occurrence_time, now);
            let recent = s.occurrence_count.min(recent_games);
            let prior = s.occurrence_count.saturating_sub(recent);
            let trend = classify_trend(recent, recent_games.max(1), prior, recent_games.max(1));
            ConceptStability {
                title: s.title.clone(),
                mastery: mastery_now,
                trend: trend_label(trend),
            }
        })
        .collect();

    let confidence_score = aggregate_confidence(signatures);

    Some(ProgressionReport {
        data_quality,
        mistake_recurrence_rate,
        advice_follow_through_rate,
        improvement_velocity,
        regression_risk_score,
        concept_stability_scores,
        confidence_score,
    })
}

/// Occurrence-weighted mean confidence across every tracked signature. Used
/// over a plain mean so a single freshly-seen, low-confidence signature
/// can't drag the aggregate down as hard as a long-observed one pulls it up.
fn aggregate_confidence(signatures: &[MistakeSignature]) -> f64 {
    let total_weight: u32 = signatures.iter().map(|s| s.occurrence_count.max(1)).sum();
    if total_weight == 0 {
        return 0.0;
    }
    let weighted: f64 = signatures
        .iter()
        .map(|s| s.confidence_score * s.occurrence_count.max(1) as f64)
        .sum();
    weighted / total_weight as f64
}

fn trend_label(trend: Trend) -> String {
    match trend {
        Trend::Improving => "improving",
        Trend::Worsening => "worsening",
        Trend::Stable => "stable",
    }
    .to_string()
}

/// Signed average change in accuracy across the recorded trend, positive
/// meaning accuracy has been climbing game over game.
fn average_accuracy_delta(accuracy_trend: &[f64]) -> f64 {
    if accuracy_trend.len() < 2 {
        return 0.0;
    }
    let deltas: Vec<f64> = accuracy_trend.windows(2).map(|w| w[1] - w[0]).collect();
    deltas.iter().sum::<f64>() / deltas.len() as f64
}

/// 0..100 score: high confidence signatures that are both unmastered and
/// recently active drive the score up, since they're the patterns most
/// likely to recur in the next game.
fn compute_regression_risk(signatures: &[MistakeSignature], now: DateTime<Utc>) -> f64 {
    if signatures.is_empty() {
        return 0.0;
    }
    let total: f64 = signatures
        .iter()
        .map(|s| {
            let mastery_now = decayed_mastery(s.mastery_score, s.last_occurrence_time, now);
            s.confidence_score * (1.0 - mastery_now)
        })
        .sum();
    let average = total / signatures.len() as f64;
    (average * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wall_e_types::{SignatureId, UserId};

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn insufficient_games_refuses_to_report() {
        assert_eq!(build_report(&[], &CoachingMemory::default(), 1, 1, now()), None);
    }

    #[test]
    fn data_quality_bands_are_ordered() {
        assert_eq!(data_quality_for(0), DataQuality::Insufficient);
        assert_eq!(data_quality_for(5), DataQuality::Limited);
        assert_eq!(data_quality_for(15), DataQuality::Sufficient);
        assert_eq!(data_quality_for(35), DataQuality::Excellent);
    }

    #[test]
    fn enough_games_produces_a_report() {
        let signature = MistakeSignature::new(
            SignatureId::new(),
            UserId::new(),
            crate::model::MistakeCategory::Tactical,
            "hanging queen",
            "desc",
            json!({}),
            now(),
        );
        let report = build_report(&[signature], &CoachingMemory::default(), 10, 5, now()).unwrap();
        assert_eq!(report.data_quality, DataQuality::Sufficient);
        assert!(report.mistake_recurrence_rate >= 0.0);
    }

    /// P5: as a signature's mastery only improves across remediation (never
    /// regresses, occurrence count only grows as recurrences are observed
    /// and confidence is updated), the report's aggregate `confidence_score`
    /// must never decrease.
    #[test]
    fn aggregate_confidence_is_non_decreasing_as_signatures_are_remediated() {
        let mut signature = MistakeSignature::new(
            SignatureId::new(),
            UserId::new(),
            crate::model::MistakeCategory::Tactical,
            "hanging queen",
            "desc",
            json!({}),
            now(),
        );

        let mut previous_confidence = 0.0;
        for occurrence_count in [1_u32, 4, 10, 18, 40] {
            signature.occurrence_count = occurrence_count;
            signature.confidence_score =
                crate::scoring::update_confidence(signature.confidence_score, occurrence_count);

            let report =
                build_report(std::slice::from_ref(&signature), &CoachingMemory::default(), 10, 5, now()).unwrap();

            assert!(
                report.confidence_score >= previous_confidence,
                "aggregate confidence regressed: {} -> {}",
                previous_confidence,
                report.confidence_score
            );
            previous_confidence = report.confidence_score;
        }
    }
}
