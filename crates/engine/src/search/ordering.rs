//! Move ordering: cheap heuristics that let alpha-beta prune early without
//! paying for a real static-exchange evaluation.

use wall_e_rules::Position;
use wall_e_types::UciMove;

pub(crate) fn capture_gain(position: &Position, mv: &UciMove) -> i32 {
    match position.apply(mv) {
        Ok(after) => (position.material_balance() - after.material_balance()).abs(),
        Err(_) => 0,
    }
}

fn is_central(mv: &UciMove) -> bool {
    const CENTER_FILES: [u8; 4] = [b'c', b'd', b'e', b'f'];
    const CENTER_RANKS: [u8; 4] = [b'3', b'4', b'5', b'6'];
    let to = mv.to_square().as_bytes();
    CENTER_FILES.contains(&to[0]) && CENTER_RANKS.contains(&to[1])
}

/// Order moves most-promising-first: MVV-LVA-style capture value, then
/// promotions, then central pushes, then everything else in generation
/// order. Not a full static-exchange evaluator — good enough to prune early.
pub fn order_moves(position: &Position, moves: &mut [UciMove]) {
    moves.sort_by_key(|mv| {
        let capture_score = capture_gain(position, mv);
        let promo_score = if mv.promotion().is_some() { 50 } else { 0 };
        let center_score = if is_central(mv) { 5 } else { 0 };
        -(capture_score + promo_score + center_score)
    });
}

/// Move a previously-recorded hash move to the front of an already-ordered
/// list, so a transposition hit from a shallower iterative-deepening pass
/// gets probed first at the next depth. No-op if `preferred` isn't present
/// (it may belong to a position reached by a different move order).
pub(crate) fn bring_hash_move_to_front(moves: &mut Vec<UciMove>, preferred: &UciMove) {
    if let Some(pos) = moves.iter().position(|mv| mv == preferred) {
        if pos != 0 {
            let mv = moves.remove(pos);
            moves.insert(0, mv);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_sort_ahead_of_quiet_moves() {
        let position = Position::start();
        let mut moves = position.legal_moves();
        order_moves(&position, &mut moves);
        // No captures exist in the opening position; ordering should at
        // least not panic and should preserve the full move set.
        assert_eq!(moves.len(), 20);
    }

    #[test]
    fn hash_move_is_promoted_to_the_front() {
        let position = Position::start();
        let mut moves = position.legal_moves();
        order_moves(&position, &mut moves);
        let hash_move = moves[5].clone();
        bring_hash_move_to_front(&mut moves, &hash_move);
        assert_eq!(moves[0], hash_move);
        assert_eq!(moves.len(), 20);
    }
}
