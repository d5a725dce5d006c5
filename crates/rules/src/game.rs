//! `Game`: an ordered move list from a known start FEN, plus its derived PGN
//! and result.

use crate::error::RulesError;
use crate::position::Position;
use wall_e_types::{GameResult, UciMove};

const STANDARD_START_FEN: &str =
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Clone)]
pub struct Game {
    start_fen: String,
    moves: Vec<UciMove>,
    sans: Vec<String>,
    current: Position,
}

impl Game {
    pub fn new() -> Self {
        Game {
            start_fen: STANDARD_START_FEN.to_string(),
            moves: Vec::new(),
            sans: Vec::new(),
            current: Position::start(),
        }
    }

    pub fn from_start_fen(fen: &str) -> Result<Self, RulesError> {
        let current = Position::from_fen(fen)?;
        Ok(Game {
            start_fen: fen.to_string(),
            moves: Vec::new(),
            sans: Vec::new(),
            current,
        })
    }

    /// Make a move, updating the move list and current position together.
    /// The move list grows by exactly one entry per successful call.
    pub fn make_move(&mut self, uci: UciMove) -> Result<(), RulesError> {
        let san = self.current.to_san(&uci)?;
        let next = self.current.apply(&uci)?;
        self.moves.push(uci);
        self.sans.push(san);
        self.current = next;
        Ok(())
    }

    pub fn current(&self) -> &Position {
        &self.current
    }

    pub fn moves(&self) -> &[UciMove] {
        &self.moves
    }

    pub fn result(&self) -> GameResult {
        self.current.game_result()
    }

    pub fn final_fen(&self) -> String {
        self.current.to_fen()
    }

    /// Render the move list as PGN movetext. This is the derived,
    /// display-only form; the move list above is authoritative.
    pub fn to_pgn(&self) -> String {
        crate::pgn::render(&self.sans, self.result())
    }

    /// Best-effort PGN import. Tokens that fail to parse as SAN in the
    /// replayed position are skipped rather than aborting the whole import —
    /// the move list, not the PGN text, is what's authoritative once loaded.
    pub fn from_pgn_best_effort(pgn: &str) -> Self {
        let mut game = Game::new();
        for token in crate::pgn::move_tokens(pgn) {
            if let Some(uci) = crate::pgn::resolve_san(game.current(), token) {
                let _ = game.make_move(uci);
            }
        }
        game
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}
