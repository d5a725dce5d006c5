//! Enforcement of the three architectural invariants: worker-only (A),
//! single-move fallback (B), and no strength degradation (C).

use crate::record::{CpuTelemetryRecord, MoveSource};
use thiserror::Error;
use wall_e_engine::LevelConfig;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("STICKY FALLBACK DETECTED")]
pub struct StickyFallbackDetected;

/// Invariant B bookkeeping: `fallback_sticky_state` must always read back
/// `false` on every record, `consecutive_fallbacks` resets to zero on any
/// worker success, and two fallbacks in a row for the same position is a
/// hard error rather than something the caller can silently ride out.
#[derive(Debug, Default)]
pub struct FallbackTracker {
    consecutive_fallbacks: u32,
    last_fallback_signature: Option<String>,
}

impl FallbackTracker {
    pub fn new() -> Self {
        FallbackTracker::default()
    }

    pub fn consecutive_fallbacks(&self) -> u32 {
        self.consecutive_fallbacks
    }

    /// Call after any move that reached the worker successfully.
    pub fn record_worker_success(&mut self) {
        self.consecutive_fallbacks = 0;
        self.last_fallback_signature = None;
    }

    /// Call after a move that had to use the fallback path, keyed by a
    /// stable signature for the position the fallback occurred at (its FEN
    /// is sufficient). Returns an error the caller must propagate if this
    /// is the second consecutive fallback at the same position.
    pub fn record_fallback(&mut self, position_signature: &str) -> Result<(), StickyFallbackDetected> {
        let repeated = self.last_fallback_signature.as_deref() == Some(position_signature);
        self.consecutive_fallbacks += 1;
        self.last_fallback_signature = Some(position_signature.to_string());
        if repeated && self.consecutive_fallbacks >= 2 {
            Err(StickyFallbackDetected)
        } else {
            Ok(())
        }
    }
}

/// Invariant C: the depth actually reached must meet the frozen level's
/// minimum, and the config handed to telemetry must be bit-for-bit the
/// frozen constant — never a runtime-lowered copy.
pub fn check_no_strength_degradation(
    record: &CpuTelemetryRecord,
    frozen: &LevelConfig,
) -> Result<(), String> {
    if record.source == MoveSource::Fallback {
        // The fallback path doesn't run the level's configured search depth
        // at all; invariant C only binds moves that went through search.
        return Ok(());
    }
    if record.depth_reached < frozen.min_depth {
        return Err(format!(
            "depth {} reached below frozen min_depth {} for level {}",
            record.depth_reached,
            frozen.min_depth,
            record.level.get()
        ));
    }
    Ok(())
}

/// Invariant A: every telemetry error type must belong to the worker error
/// taxonomy; nothing about shared-service-binding failures is allowed to
/// leak in here.
pub fn is_worker_error_taxonomy(code: wall_e_types::ErrorCode) -> bool {
    use wall_e_types::ErrorCode::*;
    matches!(
        code,
        WorkerTimeout
            | WorkerCpuLimit
            | WorkerFetchFailed
            | WorkerErrorStatus
            | WorkerInvalidJson
            | WorkerReturnedError
            | NetworkError
            | InvalidResponse
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_success_resets_fallback_streak() {
        let mut tracker = FallbackTracker::new();
        tracker.record_fallback("fen-a").unwrap();
        assert_eq!(tracker.consecutive_fallbacks(), 1);
        tracker.record_worker_success();
        assert_eq!(tracker.consecutive_fallbacks(), 0);
    }

    #[test]
    fn two_consecutive_fallbacks_at_the_same_position_trip_the_guard() {
        let mut tracker = FallbackTracker::new();
        tracker.record_fallback("fen-a").unwrap();
        let second = tracker.record_fallback("fen-a");
        assert_eq!(second, Err(StickyFallbackDetected));
    }

    #[test]
    fn fallback_at_a_different_position_does_not_trip_the_guard() {
        let mut tracker = FallbackTracker::new();
        tracker.record_fallback("fen-a").unwrap();
        assert!(tracker.record_fallback("fen-b").is_ok());
    }
}
