//! Quiescence search: extends the main search along capture sequences only,
//! so alpha-beta doesn't stop mid-exchange and misreport a position as
//! quiet when a queen is hanging one ply past the horizon.

use crate::evaluation::evaluate;
use crate::level::EvalComplexity;
use wall_e_rules::Position;
use wall_e_types::Side;

fn captures_only(position: &Position) -> Vec<wall_e_types::UciMove> {
    let before = position.material_balance();
    position
        .legal_moves()
        .into_iter()
        .filter(|mv| match position.apply(mv) {
            Ok(after) => after.material_balance() != before,
            Err(_) => false,
        })
        .collect()
}

/// Search captures only, down to `max_depth` plies, returning a score in
/// centipawns relative to the side to move at `position`.
pub fn quiescence(
    position: &Position,
    mut alpha: i32,
    beta: i32,
    max_depth: u32,
    complexity: EvalComplexity,
) -> i32 {
    let stand_pat = relative_eval(position, complexity);
    if stand_pat >= beta {
        return beta;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }
    if max_depth == 0 {
        return alpha;
    }

    for mv in captures_only(position) {
        let Ok(next) = position.apply(&mv) else {
            continue;
        };
        let score = -quiescence(&next, -beta, -alpha, max_depth - 1, complexity);
        if score >= beta {
            return beta;
        }
        if score > alpha {
            alpha = score;
        }
    }
    alpha
}

fn relative_eval(position: &Position, complexity: EvalComplexity) -> i32 {
    let white_relative = evaluate(position, complexity);
    match position.side_to_move() {
        Side::White => white_relative,
        Side::Black => -white_relative,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_position_returns_stand_pat_within_window() {
        let position = Position::start();
        let score = quiescence(&position, i32::MIN / 2, i32::MAX / 2, 4, EvalComplexity::Full);
        assert!(score.abs() < 1000);
    }
}
