//! The tactical micro-engine: a cheap, depth-1/2 lookahead layer that runs
//! ahead of full search to catch immediate mates and outright blunders.
//! Levels 1-2 lean on this alone; every level runs `filter_tactically_safe_moves`
//! before handing candidates to the full search so a deep but tactically
//! unsound line never gets played.

use wall_e_rules::Position;
use wall_e_types::{Side, UciMove};

/// A candidate move rejected by the safety filter, with why.
#[derive(Debug, Clone)]
pub struct RejectedMove {
    pub uci: UciMove,
    pub reason: String,
}

/// Result of running candidates through `filter_tactically_safe_moves`.
#[derive(Debug, Clone, Default)]
pub struct SafetyReport {
    pub safe: Vec<UciMove>,
    pub rejected: Vec<RejectedMove>,
}

/// Net material loss (in centipawns) a move is allowed to incur against the
/// best opposing reply before the safety filter calls it hanging. Set above
/// a pawn so the filter doesn't choke on ordinary pawn trades.
const HANGING_THRESHOLD_CP: i32 = 150;

fn signed_balance(balance_white: i32, side: Side) -> i32 {
    match side {
        Side::White => balance_white,
        Side::Black => -balance_white,
    }
}

/// Net centipawn swing, from the mover's perspective, of playing `mv` and
/// then letting the opponent reply with their single best response. Positive
/// means the mover comes out ahead even after the best reply.
fn net_swing(position: &Position, mv: &UciMove) -> i32 {
    let side = position.side_to_move();
    let before = signed_balance(position.material_balance(), side);

    let Ok(after_move) = position.apply(mv) else {
        return i32::MIN;
    };
    let mut worst_for_mover = signed_balance(after_move.material_balance(), side);

    for reply in after_move.legal_moves() {
        if let Ok(after_reply) = after_move.apply(&reply) {
            let value = signed_balance(after_reply.material_balance(), side);
            if value < worst_for_mover {
                worst_for_mover = value;
            }
        }
    }

    worst_for_mover - before
}

/// A move that delivers immediate checkmate, if one exists.
pub fn mate_in_1_for_us(position: &Position) -> Option<UciMove> {
    position
        .legal_moves()
        .into_iter()
        .find(|mv| matches!(position.apply(mv), Ok(next) if next.is_checkmate()))
}

/// True when every legal reply available right now still lets the opponent
/// deliver checkmate on their very next move — i.e. a forced mate against us
/// is already unavoidable, regardless of what we play.
pub fn mate_in_1_for_them(position: &Position) -> bool {
    let moves = position.legal_moves();
    if moves.is_empty() {
        return false;
    }
    moves.iter().all(|mv| match position.apply(mv) {
        Ok(next) => mate_in_1_for_us(&next).is_some(),
        Err(_) => true,
    })
}

/// Captures, promotions, and checks — the small set of moves worth scanning
/// first in any tactical pass, before quieter positional tries.
pub fn forcing_moves(position: &Position) -> Vec<UciMove> {
    let before_material = position.material_balance();
    position
        .legal_moves()
        .into_iter()
        .filter(|mv| {
            if mv.promotion().is_some() {
                return true;
            }
            match position.apply(mv) {
                Ok(next) => next.is_check() || next.material_balance() != before_material,
                Err(_) => false,
            }
        })
        .collect()
}

/// Captures available to the side to move that the opponent has no way to
/// recapture — free material sitting on the board.
pub fn hanging_pieces(position: &Position) -> Vec<UciMove> {
    let before_material = position.material_balance();
    position
        .legal_moves()
        .into_iter()
        .filter(|mv| {
            let Ok(after) = position.apply(mv) else {
                return false;
            };
            if after.material_balance() == before_material {
                return false; // not a capture
            }
            let target = mv.to_square();
            !after
                .legal_moves()
                .iter()
                .any(|reply| reply.to_square() == target)
        })
        .collect()
}

/// The single best move the tactical layer is confident about, or `None` to
/// defer to the full search. Mate always wins; otherwise the largest
/// uncontested material grab.
pub fn get_best_tactical_move(position: &Position) -> Option<UciMove> {
    if let Some(mate) = mate_in_1_for_us(position) {
        return Some(mate);
    }

    hanging_pieces(position)
        .into_iter()
        .max_by_key(|mv| net_swing(position, mv))
}

/// Split candidates into tactically safe and unsafe, using a one-ply
/// look-ahead at the opponent's best reply. Search should never hand the
/// rejected half to move selection even if they score well materially.
pub fn filter_tactically_safe_moves(position: &Position, candidates: &[UciMove]) -> SafetyReport {
    let mut report = SafetyReport::default();
    for mv in candidates {
        let swing = net_swing(position, mv);
        if swing < -HANGING_THRESHOLD_CP {
            report.rejected.push(RejectedMove {
                uci: mv.clone(),
                reason: format!("loses roughly {} centipawns to the best reply", -swing),
            });
        } else {
            report.safe.push(mv.clone());
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use wall_e_rules::Position;

    #[test]
    fn finds_fools_mate_in_one() {
        // 1.f3 e5 2.g4 and now Qh4# is on the board.
        let mut position = Position::start();
        for mv in ["f2f3", "e7e5", "g2g4"] {
            position = position.apply_uci_str(mv).unwrap();
        }
        let mate = mate_in_1_for_us(&position).expect("mate should be found");
        assert_eq!(mate.as_str(), "d8h4");
    }

    #[test]
    fn starting_position_has_no_hanging_pieces() {
        let position = Position::start();
        assert!(hanging_pieces(&position).is_empty());
    }

    #[test]
    fn starting_position_has_no_forced_mate_against_either_side() {
        let position = Position::start();
        assert!(!mate_in_1_for_them(&position));
    }

    #[test]
    fn safety_filter_passes_everything_from_the_opening() {
        let position = Position::start();
        let candidates = position.legal_moves();
        let report = filter_tactically_safe_moves(&position, &candidates);
        assert!(report.rejected.is_empty());
        assert_eq!(report.safe.len(), candidates.len());
    }
}
