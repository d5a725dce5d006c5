//! `CPUTelemetryRecord`: one row per CPU move, the source of truth the
//! architectural invariants below are checked against.

use serde::{Deserialize, Serialize};
use wall_e_types::{ErrorCode, Level, RequestId, UciMove};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveSource {
    TacticalSafe,
    Search,
    Worker,
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpuTelemetryRecord {
    pub move_number: u32,
    pub level: Level,
    pub request_id: RequestId,
    pub move_from: String,
    pub move_to: String,
    pub depth_reached: u32,
    pub worker_time_ms: u64,
    pub fallback_time_ms: u64,
    pub total_time_ms: u64,
    pub source: MoveSource,
    pub error_type: Option<ErrorCode>,
    pub consecutive_fallbacks: u32,
    pub fallback_sticky_state: bool,
}

impl CpuTelemetryRecord {
    pub fn for_move(
        move_number: u32,
        level: Level,
        request_id: RequestId,
        mv: &UciMove,
        source: MoveSource,
    ) -> Self {
        CpuTelemetryRecord {
            move_number,
            level,
            request_id,
            move_from: mv.from_square().to_string(),
            move_to: mv.to_square().to_string(),
            depth_reached: 0,
            worker_time_ms: 0,
            fallback_time_ms: 0,
            total_time_ms: 0,
            source,
            error_type: None,
            consecutive_fallbacks: 0,
            // Invariant B: no telemetry record is ever written with this set.
            fallback_sticky_state: false,
        }
    }
}
