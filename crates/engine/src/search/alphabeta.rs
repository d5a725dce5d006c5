//! Iterative-deepening negamax alpha-beta, run over an explicit stack of
//! frames instead of recursive calls. A deep search on a wasm browser
//! worker can't afford to grow the native call stack, and an explicit stack
//! is also the only place cooperative yielding can be inserted between
//! nodes without an `async fn` at every ply of recursion.
//!
//! Per `LevelConfig`, the main driver layers in: a transposition table for
//! hash-move ordering across iterative-deepening passes, a beam-width cap
//! at the root, null-move reduction, late-move reduction past
//! `lmr_threshold`, and an aspiration-window re-search between depths.

use crate::evaluation::evaluate;
use crate::level::{EvalComplexity, LevelConfig, QuiescenceConfig};
use crate::search::ordering::{bring_hash_move_to_front, capture_gain, order_moves};
use crate::search::quiescence::quiescence;
use futures_lite::future::yield_now;
use instant::Instant;
use std::collections::HashMap;
use std::time::Duration;
use wall_e_rules::Position;
use wall_e_types::{Side, UciMove};

/// Time and node ceiling for one `iterative_deepening` call.
pub struct SearchBudget {
    pub deadline: Instant,
    pub max_nodes: u64,
}

impl SearchBudget {
    pub fn new(time_budget: Duration, max_nodes: u64) -> Self {
        SearchBudget {
            deadline: Instant::now() + time_budget,
            max_nodes,
        }
    }

    fn expired(&self, nodes: u64) -> bool {
        nodes >= self.max_nodes || Instant::now() >= self.deadline
    }
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub best_move: Option<UciMove>,
    pub score_cp: i32,
    pub depth_reached: u32,
    pub nodes: u64,
    pub complete: bool,
}

/// Best move found for a position at a given depth, keyed by FEN rather
/// than a Zobrist hash — simpler, and cheap enough at these depths/node
/// counts. Carried across iterative-deepening passes so a hash move found
/// at depth N-1 reorders the move list at depth N.
type TranspositionTable = HashMap<String, (u32, UciMove)>;

struct Frame {
    position: Position,
    moves: Vec<UciMove>,
    move_index: usize,
    depth: u32,
    alpha: i32,
    beta: i32,
    best_score: i32,
    best_move_index: Option<usize>,
    /// Whether a null-move probe has already run for this frame; only
    /// attempted once, before the first real move is searched.
    null_move_tried: bool,
}

fn relative_eval(position: &Position, complexity: EvalComplexity) -> i32 {
    let white_relative = evaluate(position, complexity);
    match position.side_to_move() {
        Side::White => white_relative,
        Side::Black => -white_relative,
    }
}

fn terminal_score(position: &Position, complexity: EvalComplexity) -> i32 {
    if position.is_checkmate() {
        // Being mated with the board otherwise balanced is always worse than
        // any material count, but stays far from i32 overflow under negation.
        i32::MIN / 4
    } else {
        relative_eval(position, complexity)
    }
}

fn leaf_score(position: &Position, config: &LevelConfig) -> i32 {
    let QuiescenceConfig { on, max_depth } = config.quiescence;
    if on {
        quiescence(
            position,
            i32::MIN / 2,
            i32::MAX / 2,
            max_depth,
            config.eval_complexity,
        )
    } else {
        relative_eval(position, config.eval_complexity)
    }
}

/// A small non-yielding negamax used only to verify a null-move probe or to
/// resolve a reduced-depth re-search. Depths here are always shallow
/// (`frame.depth` minus the level's own reduction), so plain recursion is
/// safe and doesn't need the explicit stack the main driver uses for deep,
/// cooperatively-yielding search.
fn quick_negamax(
    position: &Position,
    depth: u32,
    mut alpha: i32,
    beta: i32,
    config: &LevelConfig,
    budget: &SearchBudget,
    nodes: &mut u64,
) -> i32 {
    if depth == 0 || budget.expired(*nodes) {
        return leaf_score(position, config);
    }
    let mut moves = position.legal_moves();
    if moves.is_empty() {
        return terminal_score(position, config.eval_complexity);
    }
    order_moves(position, &mut moves);

    let mut best = i32::MIN / 2;
    for mv in moves {
        let Ok(child) = position.apply(&mv) else { continue };
        *nodes += 1;
        let score = -quick_negamax(&child, depth - 1, -beta, -alpha, config, budget, nodes);
        if score > best {
            best = score;
        }
        if best > alpha {
            alpha = best;
        }
        if alpha >= beta {
            break;
        }
    }
    best
}

/// A null-move probe position: the side to move passes, its opponent to
/// move next. Not a legal chess move — constructed directly from the FEN
/// fields rather than through `Position::apply` — so it's only ever used
/// internally to test "is this position so good the opponent can't recover
/// even with a free tempo", never surfaced as a played move.
fn null_move_position(position: &Position) -> Option<Position> {
    let fen = position.to_fen();
    let mut fields: Vec<&str> = fen.split(' ').collect();
    if fields.len() != 6 {
        return None;
    }
    fields[1] = if fields[1] == "w" { "b" } else { "w" };
    fields[3] = "-";
    Position::from_fen(&fields.join(" ")).ok()
}

fn push_child(
    stack: &mut Vec<Frame>,
    tt: &TranspositionTable,
    position: Position,
    alpha: i32,
    beta: i32,
    depth: u32,
) {
    let mut moves = position.legal_moves();
    order_moves(&position, &mut moves);
    if let Some((_, hash_move)) = tt.get(&position.to_fen()) {
        bring_hash_move_to_front(&mut moves, hash_move);
    }
    stack.push(Frame {
        position,
        moves,
        move_index: 0,
        depth,
        alpha,
        beta,
        best_score: i32::MIN / 2,
        best_move_index: None,
        null_move_tried: false,
    });
}

/// Search a fixed root `(alpha, beta)` window to a fixed `depth`, yielding
/// every 1024 expanded nodes so the caller's cooperative scheduler can run
/// other work. Returns `None` only when the budget expired mid-search with
/// no usable result yet.
#[allow(clippy::too_many_arguments)]
async fn negamax(
    root: &Position,
    depth: u32,
    root_alpha: i32,
    root_beta: i32,
    config: &LevelConfig,
    budget: &SearchBudget,
    nodes: &mut u64,
    tt: &mut TranspositionTable,
) -> Option<(i32, Option<UciMove>)> {
    let mut stack = Vec::new();
    push_child(&mut stack, tt, root.clone(), root_alpha, root_beta, depth);
    if let Some(frame) = stack.first_mut() {
        if config.beam_width > 0 && frame.moves.len() > config.beam_width {
            frame.moves.truncate(config.beam_width);
        }
    }

    let mut pending: Option<i32> = None;

    loop {
        let Some(frame_index) = stack.len().checked_sub(1) else {
            return None;
        };

        if let Some(child_score) = pending.take() {
            let score = -child_score;
            let frame = &mut stack[frame_index];
            if score > frame.best_score {
                frame.best_score = score;
                frame.best_move_index = Some(frame.move_index);
            }
            if frame.best_score > frame.alpha {
                frame.alpha = frame.best_score;
            }
            if frame.alpha >= frame.beta {
                frame.move_index = frame.moves.len();
            } else {
                frame.move_index += 1;
            }
        }

        // Null-move reduction: before searching the first real move, ask
        // whether giving the opponent a free tempo still fails high. If so,
        // this frame is pruned outright rather than walking its move list.
        // Never applied at the root frame — pruning it outright would leave
        // `iterative_deepening` with a score but no move to report.
        {
            let frame = &stack[frame_index];
            let eligible = frame_index > 0
                && !frame.null_move_tried
                && config.null_move_reduction > 0
                && frame.move_index == 0
                && frame.depth > config.null_move_reduction + 1
                && !frame.moves.is_empty()
                && !frame.position.is_check();
            let probe_setup = if eligible {
                let reduced_depth = frame.depth - 1 - config.null_move_reduction;
                let beta = frame.beta;
                null_move_position(&frame.position).map(|null_pos| (null_pos, reduced_depth, beta))
            } else {
                None
            };
            if eligible {
                stack[frame_index].null_move_tried = true;
            }
            if let Some((null_pos, reduced_depth, beta)) = probe_setup {
                let score = -quick_negamax(&null_pos, reduced_depth, -beta, -beta + 1, config, budget, nodes);
                if score >= beta {
                    pending = Some(beta);
                    let finished = stack.pop().expect("frame_index pointed at top of stack");
                    if stack.is_empty() {
                        return Some((beta, finished.best_move_index.map(|i| finished.moves[i].clone())));
                    }
                    continue;
                }
            }
        }

        let frame = &stack[frame_index];

        let resolved_score = if frame.moves.is_empty() {
            Some(terminal_score(&frame.position, config.eval_complexity))
        } else if frame.depth == 0 {
            Some(leaf_score(&frame.position, config))
        } else if frame.move_index >= frame.moves.len() {
            Some(frame.best_score)
        } else {
            None
        };

        if let Some(score) = resolved_score {
            let best_move_index = frame.best_move_index;
            let finished = stack.pop().expect("frame_index pointed at top of stack");
            if let Some(i) = best_move_index {
                tt.insert(finished.position.to_fen(), (finished.depth, finished.moves[i].clone()));
            }
            if stack.is_empty() {
                let best_move = best_move_index.map(|i| finished.moves[i].clone());
                return Some((score, best_move));
            }
            pending = Some(score);
            continue;
        }

        if budget.expired(*nodes) {
            return None;
        }

        let mv = frame.moves[frame.move_index].clone();
        let Ok(child_position) = frame.position.apply(&mv) else {
            stack[frame_index].move_index += 1;
            continue;
        };
        *nodes += 1;
        if *nodes % 1024 == 0 {
            yield_now().await;
        }

        let child_alpha = -frame.beta;
        let child_beta = -frame.alpha;

        // Late-move reduction: quiet moves ordered past the level's
        // threshold get searched one ply shallower first. Since this driver
        // doesn't re-search on fail-high (the shallow result is accepted as
        // the child's score), this trades a little accuracy on deep,
        // late-ordered quiet moves for pruning more of the tree — the level
        // table only turns it on past depth 3, where the tree is wide enough
        // for it to pay off.
        let is_capture = capture_gain(&frame.position, &mv) > 0;
        let child_depth = if frame.depth >= 3
            && frame.move_index >= config.lmr_threshold
            && !is_capture
            && !child_position.is_check()
        {
            frame.depth.saturating_sub(2)
        } else {
            frame.depth - 1
        };

        push_child(&mut stack, tt, child_position, child_alpha, child_beta, child_depth);
    }
}

/// Iterative deepening: search depth 1, 2, 3, ... keeping the result from
/// the deepest depth that finished inside budget. `config.min_depth` always
/// completes in practice because callers size the budget generously enough
/// for it; a `None` from `negamax` before that point only happens under
/// external cancellation.
///
/// From depth 2 on, if the level has an aspiration window configured, the
/// search first tries a narrow window around the previous depth's score;
/// a fail-low or fail-high re-searches that depth with the full window
/// rather than trusting a clipped result.
pub async fn iterative_deepening(
    position: &Position,
    config: &LevelConfig,
    budget: SearchBudget,
) -> SearchResult {
    let mut nodes = 0u64;
    let mut best: Option<(i32, Option<UciMove>)> = None;
    let mut depth_reached = 0u32;
    let mut tt: TranspositionTable = HashMap::new();

    let ceiling = config.hard_cap.max(config.target_depth).max(config.min_depth);
    for depth in 1..=ceiling {
        let full_window = (i32::MIN / 2, i32::MAX / 2);
        let window = match (config.aspiration_window, best.as_ref()) {
            (Some(w), Some((prev_score, _))) if depth >= 2 => {
                (prev_score.saturating_sub(w), prev_score.saturating_add(w))
            }
            _ => full_window,
        };

        let mut result = negamax(position, depth, window.0, window.1, config, &budget, &mut nodes, &mut tt).await;

        if let Some((score, _)) = result {
            if window != full_window && (score <= window.0 || score >= window.1) {
                // Aspiration window missed; re-search this depth with the
                // full window instead of reporting a clipped score.
                result = negamax(position, depth, full_window.0, full_window.1, config, &budget, &mut nodes, &mut tt).await;
            }
        }

        match result {
            Some(result) => {
                best = Some(result);
                depth_reached = depth;
            }
            None => break,
        }
        if budget.expired(nodes) {
            break;
        }
    }

    let (score_cp, best_move) = best.unwrap_or((0, None));
    SearchResult {
        best_move,
        score_cp,
        depth_reached,
        nodes,
        complete: depth_reached >= config.target_depth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LEVEL_CONFIGS;

    #[tokio::test]
    async fn finds_mate_in_one_at_shallow_depth() {
        let mut position = Position::start();
        for mv in ["f2f3", "e7e5", "g2g4"] {
            position = position.apply_uci_str(mv).unwrap();
        }
        let config = LEVEL_CONFIGS[2]; // level 3
        let budget = SearchBudget::new(Duration::from_secs(2), 200_000);
        let result = iterative_deepening(&position, &config, budget).await;
        let mv = result.best_move.expect("search must return a move");
        assert_eq!(mv.as_str(), "d8h4");
    }

    #[tokio::test]
    async fn always_returns_a_legal_move_from_the_opening() {
        let position = Position::start();
        let config = LEVEL_CONFIGS[0];
        let budget = SearchBudget::new(Duration::from_millis(200), 50_000);
        let result = iterative_deepening(&position, &config, budget).await;
        let mv = result.best_move.expect("search must return a move");
        assert!(position.legal_moves().contains(&mv));
    }

    #[tokio::test]
    async fn deeper_levels_still_return_a_legal_move_with_all_heuristics_enabled() {
        let position = Position::start();
        let config = LEVEL_CONFIGS[7]; // level 8: beam width, LMR, null move and aspiration all active
        let budget = SearchBudget::new(Duration::from_millis(500), 500_000);
        let result = iterative_deepening(&position, &config, budget).await;
        let mv = result.best_move.expect("search must return a move");
        assert!(position.legal_moves().contains(&mv));
        assert!(result.depth_reached >= config.min_depth);
    }

    #[test]
    fn null_move_position_flips_side_to_move() {
        let position = Position::start();
        let flipped = null_move_position(&position).expect("start position has a null-move probe");
        assert_eq!(flipped.side_to_move(), Side::Black);
    }
}
