//! Static evaluation: material plus a light mobility term. Centipawns,
//! always from White's perspective — callers negate for the side to move
//! when they need a search-relative score.

use crate::level::EvalComplexity;
use wall_e_rules::Position;

const MOBILITY_WEIGHT: i32 = 2;

/// Evaluate a position in centipawns (White-positive). `Lite` complexity
/// skips the mobility term so level 1-2 play feels closer to pure material
/// counting; `Full` adds it back.
pub fn evaluate(position: &Position, complexity: EvalComplexity) -> i32 {
    let material = position.material_balance();
    match complexity {
        EvalComplexity::Lite => material,
        EvalComplexity::Full => material + mobility_term(position),
    }
}

fn mobility_term(position: &Position) -> i32 {
    let moves = position.legal_moves().len() as i32;
    let sign = match position.side_to_move() {
        wall_e_types::Side::White => 1,
        wall_e_types::Side::Black => -1,
    };
    sign * moves * MOBILITY_WEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_position_is_balanced() {
        let pos = Position::start();
        assert_eq!(evaluate(&pos, EvalComplexity::Lite), 0);
    }

    #[test]
    fn full_complexity_rewards_side_to_move_mobility() {
        let pos = Position::start();
        let lite = evaluate(&pos, EvalComplexity::Lite);
        let full = evaluate(&pos, EvalComplexity::Full);
        // White to move with 20 legal moves at the start, so full complexity
        // should score strictly above lite (pure material, which is 0).
        assert!(full > lite);
    }
}
