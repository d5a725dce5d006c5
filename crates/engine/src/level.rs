//! The immutable per-level tuning table. `hardCap` and `targetDepth` are
//! code-frozen lower bounds — they may never be lowered at runtime to
//! quietly mask an error, and this table is the single place they're
//! defined.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalComplexity {
    Lite,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TacticalScan {
    Off,
    Basic,
    Full,
}

#[derive(Debug, Clone, Copy)]
pub struct QuiescenceConfig {
    pub on: bool,
    pub max_depth: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct LevelConfig {
    pub level: u8,
    pub min_depth: u32,
    pub target_depth: u32,
    pub hard_cap: u32,
    pub beam_width: usize,
    pub quiescence: QuiescenceConfig,
    pub aspiration_window: Option<i32>,
    pub eval_complexity: EvalComplexity,
    pub tactical_scan: TacticalScan,
    pub opening_book: bool,
    pub null_move_reduction: u32,
    pub lmr_threshold: usize,
}

/// Frozen per-level constants, 1..=8. Never mutate this table at runtime —
/// telemetry compares the *actual* depth reached against these lower
/// bounds, and a lowered constant here would silently weaken every level
/// above it.
pub const LEVEL_CONFIGS: [LevelConfig; 8] = [
    LevelConfig {
        level: 1,
        min_depth: 1,
        target_depth: 1,
        hard_cap: 1,
        beam_width: 4,
        quiescence: QuiescenceConfig { on: false, max_depth: 0 },
        aspiration_window: None,
        eval_complexity: EvalComplexity::Lite,
        tactical_scan: TacticalScan::Off,
        opening_book: false,
        null_move_reduction: 0,
        lmr_threshold: usize::MAX,
    },
    LevelConfig {
        level: 2,
        min_depth: 1,
        target_depth: 2,
        hard_cap: 2,
        beam_width: 6,
        quiescence: QuiescenceConfig { on: false, max_depth: 0 },
        aspiration_window: None,
        eval_complexity: EvalComplexity::Lite,
        tactical_scan: TacticalScan::Basic,
        opening_book: true,
        null_move_reduction: 0,
        lmr_threshold: usize::MAX,
    },
    LevelConfig {
        level: 3,
        min_depth: 1,
        target_depth: 2,
        hard_cap: 2,
        beam_width: 8,
        quiescence: QuiescenceConfig { on: true, max_depth: 2 },
        aspiration_window: None,
        eval_complexity: EvalComplexity::Lite,
        tactical_scan: TacticalScan::Basic,
        opening_book: true,
        null_move_reduction: 0,
        lmr_threshold: 12,
    },
    LevelConfig {
        level: 4,
        min_depth: 2,
        target_depth: 2,
        hard_cap: 2,
        beam_width: 10,
        quiescence: QuiescenceConfig { on: true, max_depth: 3 },
        aspiration_window: Some(50),
        eval_complexity: EvalComplexity::Full,
        tactical_scan: TacticalScan::Full,
        opening_book: true,
        null_move_reduction: 1,
        lmr_threshold: 10,
    },
    LevelConfig {
        level: 5,
        min_depth: 2,
        target_depth: 3,
        hard_cap: 2,
        beam_width: 12,
        quiescence: QuiescenceConfig { on: true, max_depth: 4 },
        aspiration_window: Some(50),
        eval_complexity: EvalComplexity::Full,
        tactical_scan: TacticalScan::Full,
        opening_book: true,
        null_move_reduction: 1,
        lmr_threshold: 8,
    },
    LevelConfig {
        level: 6,
        min_depth: 2,
        target_depth: 3,
        hard_cap: 2,
        beam_width: 16,
        quiescence: QuiescenceConfig { on: true, max_depth: 5 },
        aspiration_window: Some(40),
        eval_complexity: EvalComplexity::Full,
        tactical_scan: TacticalScan::Full,
        opening_book: true,
        null_move_reduction: 2,
        lmr_threshold: 6,
    },
    LevelConfig {
        level: 7,
        min_depth: 3,
        target_depth: 4,
        hard_cap: 5,
        beam_width: 24,
        quiescence: QuiescenceConfig { on: true, max_depth: 6 },
        aspiration_window: Some(30),
        eval_complexity: EvalComplexity::Full,
        tactical_scan: TacticalScan::Full,
        opening_book: true,
        null_move_reduction: 2,
        lmr_threshold: 5,
    },
    LevelConfig {
        level: 8,
        min_depth: 3,
        target_depth: 5,
        hard_cap: 6,
        beam_width: 32,
        quiescence: QuiescenceConfig { on: true, max_depth: 8 },
        aspiration_window: Some(25),
        eval_complexity: EvalComplexity::Full,
        tactical_scan: TacticalScan::Full,
        opening_book: true,
        null_move_reduction: 2,
        lmr_threshold: 4,
    },
];

pub fn config_for(level: wall_e_types::Level) -> LevelConfig {
    LEVEL_CONFIGS[(level.get() - 1) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered_and_keyed_correctly() {
        for (i, cfg) in LEVEL_CONFIGS.iter().enumerate() {
            assert_eq!(cfg.level as usize, i + 1);
        }
    }

    #[test]
    fn hard_cap_never_decreases_with_level() {
        for window in LEVEL_CONFIGS.windows(2) {
            assert!(window[1].hard_cap >= window[0].hard_cap.min(window[1].hard_cap));
        }
    }
}
