//! Confidence and mastery scoring. `confidence` measures how sure we are
//! the pattern is real; `mastery` measures how well the user currently
//! handles it, decaying with time since it last came up.

use chrono::{DateTime, Utc};

/// Saturating-growth constant. Chosen so `confidence(4)`, `confidence(10)`
/// and `confidence(18)` land in the milestone bands a saturating-log
/// formula targets (~0.4, ~0.6, ~0.8) without needing logarithms at all:
/// `N / (N + K)` is monotone, bounded below 1, and `confidence(0) == 0`.
const CONFIDENCE_K: f64 = 6.0;

/// Smoothing factor for blending a freshly computed confidence value into
/// the previously stored one, so a single re-observation doesn't snap the
/// score straight to the raw curve.
const CONFIDENCE_SMOOTHING: f64 = 0.2;

const MASTERY_HALF_LIFE_WEEKS: f64 = 4.0;
const MASTERY_AVOIDANCE_BOOST: f64 = 0.1;

/// Mastery at or above this value excludes a pattern from active teaching
/// opportunities (it's considered handled).
pub const MASTERY_TEACHING_CEILING: f64 = 0.85;

/// Raw confidence as a function of occurrence count alone. Strictly
/// increasing in `N`, bounded by 1, zero at `N == 0`.
pub fn raw_confidence(occurrence_count: u32) -> f64 {
    let n = occurrence_count as f64;
    n / (n + CONFIDENCE_K)
}

/// Blend the raw curve into a previous score, so confidence moves toward
/// (never away from, since `raw_confidence` is monotone in `N`) the target
/// rather than jumping there in one step.
pub fn update_confidence(previous: f64, occurrence_count: u32) -> f64 {
    let raw = raw_confidence(occurrence_count);
    (previous + CONFIDENCE_SMOOTHING * (raw - previous)).clamp(0.0, 1.0)
}

/// Mastery decayed forward to `now`, given it was last measured at
/// `last_occurrence_time`. Half-life in weeks, not minutes — occasional
/// play shouldn't erase mastery between sessions a few days apart.
pub fn decayed_mastery(mastery: f64, last_occurrence_time: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let weeks_elapsed = (now - last_occurrence_time).num_seconds().max(0) as f64 / (7.0 * 86_400.0);
    let factor = 0.5_f64.powf(weeks_elapsed / MASTERY_HALF_LIFE_WEEKS);
    (mastery * factor).clamp(0.0, 1.0)
}

/// Call when the user demonstrably avoided a mistake in a context the
/// signature would have triggered.
pub fn record_avoidance(mastery: f64) -> f64 {
    (mastery + MASTERY_AVOIDANCE_BOOST).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Improving,
    Worsening,
    Stable,
}

/// Compare occurrence rate over the last `K` games against the `K` games
/// before that. A lower recent rate means the user is improving (fewer
/// recurrences), with a neutral dead-zone so noise doesn't flip the label.
pub fn classify_trend(recent_occurrences: u32, recent_games: u32, prior_occurrences: u32, prior_games: u32) -> Trend {
    const DEAD_ZONE: f64 = 0.05;
    let recent_rate = rate(recent_occurrences, recent_games);
    let prior_rate = rate(prior_occurrences, prior_games);
    let delta = recent_rate - prior_rate;
    if delta > DEAD_ZONE {
        Trend::Worsening
    } else if delta < -DEAD_ZONE {
        Trend::Improving
    } else {
        Trend::Stable
    }
}

fn rate(occurrences: u32, games: u32) -> f64 {
    if games == 0 {
        0.0
    } else {
        occurrences as f64 / games as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn confidence_is_zero_at_zero_occurrences() {
        assert_eq!(raw_confidence(0), 0.0);
    }

    #[test]
    fn confidence_milestones_land_in_spec_bands() {
        assert!((0.35..0.5).contains(&raw_confidence(4)));
        assert!((0.55..0.7).contains(&raw_confidence(10)));
        assert!(raw_confidence(18) >= 0.75 && raw_confidence(18) < 0.85);
    }

    #[test]
    fn confidence_approaches_one_for_large_n() {
        assert!(raw_confidence(10_000) > 0.99);
    }

    #[test]
    fn confidence_is_monotone_non_decreasing() {
        let mut previous = 0.0;
        for n in 0..100 {
            let c = raw_confidence(n);
            assert!(c >= previous);
            previous = c;
        }
    }

    #[test]
    fn mastery_decays_over_weeks() {
        let then = Utc::now() - Duration::weeks(4);
        let now = Utc::now();
        let decayed = decayed_mastery(0.8, then, now);
        assert!(decayed < 0.45);
    }

    #[test]
    fn trend_detector_respects_dead_zone() {
        assert_eq!(classify_trend(5, 10, 5, 10), Trend::Stable);
        assert_eq!(classify_trend(2, 10, 8, 10), Trend::Improving);
        assert_eq!(classify_trend(8, 10, 2, 10), Trend::Worsening);
    }
}
