//! Tier selection: which move source a given level routes through. The
//! orchestrator itself (retry, fallback bookkeeping, invariant checks) lives
//! in the sibling modules; this just answers "where does this level go".

use wall_e_types::Level;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Levels 1-2: the in-process tactical micro-engine and a shallow
    /// search, no gateway round-trip.
    MicroEngine,
    /// Levels 3-6: gateway to the edge compute worker, tactical safety
    /// filter already applied upstream.
    Gateway,
    /// Levels 7-8: the deeper browser search worker, still hard-capped.
    BrowserSearch,
}

pub fn tier_for_level(level: Level) -> Tier {
    match level.get() {
        1..=2 => Tier::MicroEngine,
        3..=6 => Tier::Gateway,
        _ => Tier::BrowserSearch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_levels_skip_the_gateway() {
        assert_eq!(tier_for_level(Level::new(1).unwrap()), Tier::MicroEngine);
        assert_eq!(tier_for_level(Level::new(2).unwrap()), Tier::MicroEngine);
    }

    #[test]
    fn mid_levels_use_the_gateway() {
        for n in 3..=6 {
            assert_eq!(tier_for_level(Level::new(n).unwrap()), Tier::Gateway);
        }
    }

    #[test]
    fn top_levels_use_browser_search() {
        assert_eq!(tier_for_level(Level::new(7).unwrap()), Tier::BrowserSearch);
        assert_eq!(tier_for_level(Level::new(8).unwrap()), Tier::BrowserSearch);
    }
}
